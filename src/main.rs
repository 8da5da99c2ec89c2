mod app;
mod cli;
mod components;
mod utils;

use clap::Parser;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    app::run(cli)
}
