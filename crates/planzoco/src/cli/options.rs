//! Option CLI commands.

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
pub struct OptionsCommand {
    #[command(subcommand)]
    pub action: OptionsAction,
}

#[derive(Debug, Subcommand)]
pub enum OptionsAction {
    /// Add an option to a question.
    Add {
        /// Question ID.
        question_id: String,
        /// Option text.
        text: String,
    },
    /// Change an option's text. Votes are kept.
    Edit {
        /// Option ID.
        id: String,
        /// New text.
        text: String,
    },
    /// Delete an option.
    Delete {
        /// Option ID.
        id: String,
    },
    /// Cast one vote for an option.
    Vote {
        /// Option ID.
        id: String,
    },
}
