use std::fs::File;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use crossbeam_channel::{select, unbounded, Receiver};
use hear2read_voices_lib::commands::{self, execute, parse_command, CommandOutcome, Selector};
use hear2read_voices_lib::diagnostics::run_startup_checks;
use hear2read_voices_lib::events::VoiceEvent;
use hear2read_voices_lib::reconcile::VoiceItem;
use hear2read_voices_lib::settings::{get_settings, save_settings, settings_path, Settings};
use hear2read_voices_lib::telemetry::reporter_from_settings;
use hear2read_voices_lib::transfer::{HttpTransferClient, TransferClient};
use hear2read_voices_lib::{AppError, VoiceEngine};

use crate::cli::{Cli, Command};
use crate::components::status::{render_error, render_progress, render_status};
use crate::components::voice_list::render_list;

/// Long enough for the largest voice on a slow line.
const SHUTDOWN_WAIT: Duration = Duration::from_secs(60 * 30);

pub fn run(cli: Cli) -> anyhow::Result<()> {
    init_logging(&cli)?;

    let settings = effective_settings(&cli);
    if let Some(Command::Settings { save }) = &cli.command {
        println!("{}", serde_json::to_string_pretty(&settings)?);
        if *save {
            save_settings(&settings)?;
            println!("Saved to {}", settings_path().display());
        }
        return Ok(());
    }

    let client: Arc<dyn TransferClient> =
        Arc::new(HttpTransferClient::new().context("failed to set up HTTP client")?);
    let reporter = reporter_from_settings(&settings, Arc::clone(&client));
    let mut engine = VoiceEngine::new(&settings, client, reporter);
    let mut view = View::new(cli.json, engine.subscribe());

    run_startup_checks(&settings, engine.inventory());

    // Failures leave a status banner and the tool keeps going.
    if let Err(err) = engine.bootstrap() {
        log::error!("Bootstrap failed: {err}");
    }
    if let Err(err) = engine.refresh_catalog() {
        log::error!("Catalog unavailable: {err}");
    }

    match cli.command.clone().unwrap_or(Command::Interactive) {
        Command::List => {
            view.drain();
        }
        Command::Add { voice } => {
            view.quiet_lists = true;
            view.drain();
            run_one(&mut engine, &mut view, commands::Command::Add(Selector::parse(&voice)));
            finish_transfers(&mut engine, &mut view);
            view.print_list(engine.items());
        }
        Command::Remove { voice } => {
            view.quiet_lists = true;
            view.drain();
            run_one(&mut engine, &mut view, commands::Command::Remove(Selector::parse(&voice)));
            view.print_list(engine.items());
        }
        Command::Interactive => interactive(&mut engine, &mut view)?,
        Command::Settings { .. } => {}
    }

    Ok(())
}

fn effective_settings(cli: &Cli) -> Settings {
    let mut settings = get_settings();
    if let Some(dir) = &cli.install_dir {
        settings.install_dir = Some(dir.to_string_lossy().to_string());
    }
    if cli.no_telemetry {
        settings.telemetry_enabled = false;
    }
    settings
}

fn init_logging(cli: &Cli) -> anyhow::Result<()> {
    let base = if cli.log_file.is_some() { 1 } else { 0 };
    let level = match base + cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level));
    builder.format_timestamp_millis();

    if let Some(path) = &cli.log_file {
        let file = File::options()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("failed to open log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    builder.init();
    Ok(())
}

fn interactive(engine: &mut VoiceEngine, view: &mut View) -> anyhow::Result<()> {
    let input = spawn_input_reader();
    let updates = engine.update_receiver();
    let mut running = true;

    view.drain();
    view.prompt();

    while running {
        select! {
            recv(updates) -> update => {
                if let Ok(update) = update {
                    engine.handle_update(update);
                }
            }
            recv(input) -> line => {
                match line {
                    Ok(line) => handle_line(engine, view, &line, &mut running),
                    Err(_) => {
                        running = false;
                    }
                }
            }
        }
        view.drain();
    }

    finish_transfers(engine, view);
    Ok(())
}

fn handle_line(engine: &mut VoiceEngine, view: &mut View, line: &str, running: &mut bool) {
    match parse_command(line) {
        Ok(commands::Command::Quit) => {
            *running = false;
            return;
        }
        Ok(command) => run_one(engine, view, command),
        Err(message) => view.message(&message),
    }
    view.prompt();
}

fn run_one(engine: &mut VoiceEngine, view: &mut View, command: commands::Command) {
    match execute(engine, command) {
        Ok(outcome) => {
            view.drain();
            view.outcome(outcome);
        }
        Err(err) => {
            view.drain();
            view.error(&err);
        }
    }
}

/// There is no cancel, so a running download is allowed to finish.
fn finish_transfers(engine: &mut VoiceEngine, view: &mut View) {
    if let Some(job) = engine.active_job() {
        view.message(&format!("Waiting for {} to finish...", job.target_filename));
    }
    while engine.active_job().is_some() {
        if !engine.wait_until_idle(SHUTDOWN_WAIT) {
            log::warn!("Gave up waiting for the running download");
            break;
        }
    }
    view.drain();
}

fn spawn_input_reader() -> Receiver<String> {
    let (tx, rx) = unbounded();
    let spawned = thread::Builder::new()
        .name("stdin".to_string())
        .spawn(move || {
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else {
                    break;
                };
                if tx.send(line).is_err() {
                    break;
                }
            }
        });

    if let Err(e) = spawned {
        log::error!("Failed to start input reader: {e}");
    }
    rx
}

/// A listing in the same shape as the `list_refreshed` event.
fn list_json(items: Vec<VoiceItem>) -> serde_json::Result<String> {
    serde_json::to_string(&VoiceEvent::ListRefreshed { items })
}

/// Writes engine events to stdout.
struct View {
    json: bool,
    quiet_lists: bool,
    events: Receiver<VoiceEvent>,
    progress_open: bool,
}

impl View {
    fn new(json: bool, events: Receiver<VoiceEvent>) -> Self {
        Self {
            json,
            quiet_lists: false,
            events,
            progress_open: false,
        }
    }

    fn drain(&mut self) {
        let pending: Vec<VoiceEvent> = self.events.try_iter().collect();
        for event in pending {
            self.show(&event);
        }
    }

    fn show(&mut self, event: &VoiceEvent) {
        if self.json {
            match serde_json::to_string(event) {
                Ok(line) => println!("{line}"),
                Err(e) => log::error!("Failed to encode event: {e}"),
            }
            return;
        }

        match event {
            VoiceEvent::ListRefreshed { items } => {
                if !self.quiet_lists {
                    self.print_list(items);
                }
            }
            VoiceEvent::TransferProgress { filename, percent } => {
                print!("\r{}", render_progress(filename, *percent));
                let _ = io::stdout().flush();
                self.progress_open = true;
            }
            VoiceEvent::TransferFinished { .. } | VoiceEvent::ItemUpdated { .. } => {
                self.close_progress();
            }
            VoiceEvent::Status { message, is_error } => {
                self.close_progress();
                println!("{}", render_status(message, *is_error));
            }
        }
    }

    fn outcome(&mut self, outcome: CommandOutcome) {
        match outcome {
            CommandOutcome::Listed(items) => {
                if self.json {
                    match list_json(items) {
                        Ok(line) => println!("{line}"),
                        Err(e) => log::error!("Failed to encode list: {e}"),
                    }
                } else {
                    self.print_list(&items);
                }
            }
            CommandOutcome::Help => self.message(commands::HELP),
            CommandOutcome::Status(Some(status)) => {
                self.message(&render_status(&status.message, status.is_error))
            }
            CommandOutcome::Status(None) => self.message("Nothing to report."),
            CommandOutcome::InstallStarted(filename) => {
                log::debug!("Install of {filename} started")
            }
            CommandOutcome::Refreshed | CommandOutcome::Removed(_) | CommandOutcome::Quit => {}
        }
    }

    fn print_list(&mut self, items: &[VoiceItem]) {
        if self.json {
            return;
        }
        self.close_progress();
        print!("{}", render_list(items));
    }

    fn error(&mut self, err: &AppError) {
        self.close_progress();
        log::debug!("Command failed: {err}");
        if self.json {
            match serde_json::to_string(err) {
                Ok(line) => println!("{{\"event\":\"error\",\"message\":{line}}}"),
                Err(e) => log::error!("Failed to encode error: {e}"),
            }
        } else {
            println!("{}", render_error(&err.user_message()));
        }
    }

    fn message(&mut self, text: &str) {
        if self.json {
            return;
        }
        self.close_progress();
        println!("{text}");
    }

    fn prompt(&mut self) {
        if self.json {
            return;
        }
        print!("> ");
        let _ = io::stdout().flush();
    }

    fn close_progress(&mut self) {
        if self.progress_open {
            println!();
            self.progress_open = false;
        }
    }
}
