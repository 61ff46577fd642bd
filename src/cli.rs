use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "dayplan", version, about = "Terminal todo list with a month calendar")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a new todo
    Add {
        /// What needs to be done
        text: String,
        /// Due date in YYYY-MM-DD format
        #[arg(long)]
        due: Option<String>,
    },
    /// List todos, optionally only those due on a given day
    List {
        /// Only show todos due on this date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<String>,
    },
    /// Toggle a todo between done and pending
    Toggle {
        /// Id of the todo to toggle
        id: i64,
    },
    /// Delete a todo
    Delete {
        /// Id of the todo to delete
        id: i64,
    },
    /// Launch the interactive TUI
    Tui,
}
