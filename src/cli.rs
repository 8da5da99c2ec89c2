use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "h2r-voices",
    version,
    about = "Add and remove Hear2Read screen-reader voices"
)]
pub struct Cli {
    /// Folder holding the installed voices.
    #[arg(long, env = "H2R_VOICE_DIR", global = true)]
    pub install_dir: Option<PathBuf>,

    /// Do not send add/remove usage reports.
    #[arg(long, global = true)]
    pub no_telemetry: bool,

    /// Print events as JSON lines instead of text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Write logs to this file.
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Show every voice in the catalog.
    List,
    /// Download a voice by number, file name or voice name.
    Add { voice: String },
    /// Delete a downloaded voice.
    Remove { voice: String },
    /// Type commands at a prompt (the default).
    Interactive,
    /// Print the effective settings.
    Settings {
        /// Persist the effective settings, including flags given on this run.
        #[arg(long)]
        save: bool,
    },
}
