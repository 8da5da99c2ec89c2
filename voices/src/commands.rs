//! Text commands understood by the front end.

use crate::reconcile::{ItemAction, VoiceItem, VoiceList};
use crate::{AppError, StatusLine, VoiceEngine};

pub const HELP: &str = "\
Commands:
  list                 show the voices
  refresh              reload the catalog from the server
  add <voice>          download a voice
  remove <voice>       delete a downloaded voice
  toggle <voice>       add or remove, whichever the voice offers
  status               show the last message
  help                 show this text
  quit                 leave
<voice> is the number shown in the list, the file name or the voice name.";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selector {
    Number(usize),
    Name(String),
}

impl Selector {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        match raw.parse::<usize>() {
            Ok(number) => Self::Number(number),
            Err(_) => Self::Name(raw.to_string()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    List,
    Refresh,
    Add(Selector),
    Remove(Selector),
    Toggle(Selector),
    Status,
    Help,
    Quit,
}

#[derive(Clone, Debug, PartialEq)]
pub enum CommandOutcome {
    Listed(Vec<VoiceItem>),
    Refreshed,
    InstallStarted(String),
    Removed(String),
    Status(Option<StatusLine>),
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let selector = || {
        if rest.is_empty() {
            Err(format!("\"{verb}\" needs a voice number or name"))
        } else {
            Ok(Selector::parse(rest))
        }
    };

    match verb.to_ascii_lowercase().as_str() {
        "" | "list" | "ls" => Ok(Command::List),
        "refresh" | "reload" => Ok(Command::Refresh),
        "add" | "install" | "include" => selector().map(Command::Add),
        "remove" | "rm" | "delete" => selector().map(Command::Remove),
        "toggle" => selector().map(Command::Toggle),
        "status" => Ok(Command::Status),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" | "q" => Ok(Command::Quit),
        other => Err(format!("Unknown command \"{other}\". Type help for a list.")),
    }
}

/// Finds the filename a selector points at.
pub fn resolve(list: &VoiceList, selector: &Selector) -> Result<String, AppError> {
    let found = match selector {
        Selector::Number(number) => list.by_number(*number),
        Selector::Name(name) => list
            .get(name)
            .or_else(|| list.find_by_display_name(name)),
    };

    found.map(|item| item.filename().to_string()).ok_or_else(|| {
        AppError::UnknownVoice(match selector {
            Selector::Number(number) => number.to_string(),
            Selector::Name(name) => name.clone(),
        })
    })
}

pub fn execute(engine: &mut VoiceEngine, command: Command) -> Result<CommandOutcome, AppError> {
    match command {
        Command::List => Ok(CommandOutcome::Listed(engine.items().to_vec())),
        Command::Refresh => {
            engine.refresh_catalog()?;
            Ok(CommandOutcome::Refreshed)
        }
        Command::Add(selector) => {
            let filename = resolve(engine.list(), &selector)?;
            if engine
                .list()
                .get(&filename)
                .is_some_and(|item| item.action == ItemAction::Remove)
            {
                return Err(AppError::AlreadyInstalled(filename));
            }
            engine.start_install(&filename)?;
            Ok(CommandOutcome::InstallStarted(filename))
        }
        Command::Remove(selector) => {
            let filename = resolve(engine.list(), &selector)?;
            engine.remove(&filename)?;
            Ok(CommandOutcome::Removed(filename))
        }
        Command::Toggle(selector) => {
            let filename = resolve(engine.list(), &selector)?;
            let action = engine.list().get(&filename).map(|item| item.action);
            engine.toggle(&filename)?;
            Ok(match action {
                Some(ItemAction::Remove) => CommandOutcome::Removed(filename),
                _ => CommandOutcome::InstallStarted(filename),
            })
        }
        Command::Status => Ok(CommandOutcome::Status(engine.status().cloned())),
        Command::Help => Ok(CommandOutcome::Help),
        Command::Quit => Ok(CommandOutcome::Quit),
    }
}
