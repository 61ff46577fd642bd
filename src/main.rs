mod calendar;
mod cli;
mod commands;
mod model;
mod storage;
mod ui;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    env_logger::init();
    let args = cli::Cli::parse();
    let command = args.command.unwrap_or(cli::Command::Tui);
    match command {
        cli::Command::Add { text, due } => commands::add(text, due),
        cli::Command::List { due } => commands::list(due),
        cli::Command::Toggle { id } => commands::toggle(id),
        cli::Command::Delete { id } => commands::delete(id),
        cli::Command::Tui => commands::tui(),
    }
}
