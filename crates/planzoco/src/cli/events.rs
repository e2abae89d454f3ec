//! Event CLI commands.

use clap::{Parser, Subcommand};

/// Event management commands.
#[derive(Debug, Parser)]
pub struct EventsCommand {
    #[command(subcommand)]
    pub action: EventsAction,
}

/// Available event actions.
#[derive(Debug, Subcommand)]
pub enum EventsAction {
    /// List all events with their questions.
    List,
    /// Create a new event.
    Create {
        /// Event name.
        name: String,
    },
    /// Show an event with its questions and options.
    Show {
        /// Event ID.
        id: String,
    },
    /// Rename an event.
    Rename {
        /// Event ID.
        id: String,
        /// New name.
        name: String,
    },
    /// Delete an event with all of its questions and options.
    Delete {
        /// Event ID.
        id: String,
    },
}
