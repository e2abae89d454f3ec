//! Question CLI commands.

use clap::{Parser, Subcommand};

/// Question management commands.
#[derive(Debug, Parser)]
pub struct QuestionsCommand {
    #[command(subcommand)]
    pub action: QuestionsAction,
}

/// Available question actions.
#[derive(Debug, Subcommand)]
pub enum QuestionsAction {
    /// Add a question to an event.
    Add {
        /// Event ID.
        event_id: String,
        /// Question text.
        text: String,
    },
    /// Show a question with its options and event.
    Show {
        /// Question ID.
        id: String,
    },
    /// Change a question's text.
    Edit {
        /// Question ID.
        id: String,
        /// New text.
        text: String,
    },
    /// Delete a question with all of its options.
    Delete {
        /// Question ID.
        id: String,
    },
    /// Show the options tied for the most votes.
    Winners {
        /// Question ID.
        id: String,
    },
}
