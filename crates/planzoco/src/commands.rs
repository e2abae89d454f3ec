//! Command execution against the shared repositories.
//!
//! Every command returns its rendered output so the binary only prints it.

use anyhow::{bail, Result};
use serde::Serialize;
use serde_json::json;

use planzoco_core::poll::{
    validate_event_name, validate_option_text, validate_question_text, Event, PollOption,
    Question,
};
use planzoco_core::storage::{repository_error_to_status_code, RepositoryError};

use crate::cli::events::EventsAction;
use crate::cli::options::OptionsAction;
use crate::cli::questions::QuestionsAction;
use crate::cli::recovery::RecoveryAction;
use crate::cli::{Commands, OutputFormat};
use crate::id::generate_id;
use crate::output::{format_json, pretty};
use crate::state::AppState;

/// Runs a repository-backed command and renders its result.
///
/// `table` commands talk to DynamoDB directly and are handled by the binary.
pub async fn execute(command: Commands, state: &AppState, format: OutputFormat) -> Result<String> {
    match command {
        Commands::Events(cmd) => events(cmd.action, state, format).await,
        Commands::Questions(cmd) => questions(cmd.action, state, format).await,
        Commands::Options(cmd) => options(cmd.action, state, format).await,
        Commands::Recovery(cmd) => recovery(cmd.action, state, format).await,
        Commands::Table(_) => bail!("Table commands need the DynamoDB store"),
    }
}

/// Process exit code for a failed command.
///
/// Missing records exit with 2 and an unreachable store with 3.
pub fn exit_code(error: &anyhow::Error) -> i32 {
    match error.downcast_ref::<RepositoryError>() {
        Some(e) => match repository_error_to_status_code(e) {
            404 => 2,
            503 => 3,
            _ => 1,
        },
        None => 1,
    }
}

fn render<T: Serialize>(
    value: &T,
    format: OutputFormat,
    pretty: impl FnOnce(&T) -> String,
) -> Result<String> {
    match format {
        OutputFormat::Json => format_json(value),
        OutputFormat::Pretty => Ok(pretty(value)),
    }
}

fn deleted(entity: &str, id: &str, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => format_json(&json!({ "deleted": id })),
        OutputFormat::Pretty => Ok(format!("Deleted {} {}", entity, id)),
    }
}

fn not_found(entity_type: &'static str, id: &str) -> anyhow::Error {
    RepositoryError::NotFound {
        entity_type,
        id: id.to_string(),
    }
    .into()
}

async fn events(action: EventsAction, state: &AppState, format: OutputFormat) -> Result<String> {
    let repo = &state.event_repo;
    match action {
        EventsAction::List => {
            let events = repo.list_events().await?;
            render(&events, format, |e| pretty::format_events(e))
        }
        EventsAction::Create { name } => {
            validate_event_name(&name)?;
            let event = repo.create_event(&Event::draft(generate_id(), name)).await?;
            render(&event, format, |e| {
                format!("Created:\n{}", pretty::format_event(e))
            })
        }
        EventsAction::Show { id } => {
            let event = repo
                .get_event(&id)
                .await?
                .ok_or_else(|| not_found("Event", &id))?;
            render(&event, format, pretty::format_event)
        }
        EventsAction::Rename { id, name } => {
            validate_event_name(&name)?;
            // update_event is an upsert; never create through a rename.
            let existing = repo
                .get_event(&id)
                .await?
                .ok_or_else(|| not_found("Event", &id))?;
            let event = repo.update_event(&Event { name, ..existing }).await?;
            render(&event, format, |e| {
                format!("Updated:\n{}", pretty::format_event(e))
            })
        }
        EventsAction::Delete { id } => {
            repo.delete_event(&id).await?;
            deleted("event", &id, format)
        }
    }
}

async fn questions(
    action: QuestionsAction,
    state: &AppState,
    format: OutputFormat,
) -> Result<String> {
    let repo = &state.question_repo;
    match action {
        QuestionsAction::Add { event_id, text } => {
            validate_question_text(&text)?;
            let event = state
                .event_repo
                .get_event(&event_id)
                .await?
                .ok_or_else(|| not_found("Event", &event_id))?;
            let question = repo
                .add_question(&event.id, &Question::draft(generate_id(), text))
                .await?;
            render(&question, format, |q| {
                format!("Added:\n{}", pretty::format_question(q, Some(&event)))
            })
        }
        QuestionsAction::Show { id } => {
            let (question, event) = repo
                .get_question_with_event(&id)
                .await?
                .ok_or_else(|| not_found("Question", &id))?;
            match format {
                OutputFormat::Json => format_json(&json!({ "question": question, "event": event })),
                OutputFormat::Pretty => Ok(pretty::format_question(&question, event.as_ref())),
            }
        }
        QuestionsAction::Edit { id, text } => {
            validate_question_text(&text)?;
            let question = repo.update_question(&Question::draft(id, text)).await?;
            render(&question, format, |q| {
                format!("Updated:\n{}", pretty::format_question(q, None))
            })
        }
        QuestionsAction::Delete { id } => {
            repo.delete_question(&id).await?;
            deleted("question", &id, format)
        }
        QuestionsAction::Winners { id } => {
            let question = repo
                .get_question(&id)
                .await?
                .ok_or_else(|| not_found("Question", &id))?;
            let winners = question.winning_options();
            match format {
                OutputFormat::Json => format_json(&winners),
                OutputFormat::Pretty => Ok(pretty::format_winners(&question, &winners)),
            }
        }
    }
}

async fn options(action: OptionsAction, state: &AppState, format: OutputFormat) -> Result<String> {
    let repo = &state.option_repo;
    match action {
        OptionsAction::Add { question_id, text } => {
            validate_option_text(&text)?;
            if state.question_repo.get_question(&question_id).await?.is_none() {
                return Err(not_found("Question", &question_id));
            }
            let option = repo
                .add_option(&question_id, &PollOption::draft(generate_id(), text))
                .await?;
            render(&option, format, |o| {
                format!("Added:\n{}", pretty::format_option(o))
            })
        }
        OptionsAction::Edit { id, text } => {
            validate_option_text(&text)?;
            let option = repo.update_option(&PollOption::draft(id, text)).await?;
            render(&option, format, |o| {
                format!("Updated:\n{}", pretty::format_option(o))
            })
        }
        OptionsAction::Delete { id } => {
            repo.delete_option(&id).await?;
            deleted("option", &id, format)
        }
        OptionsAction::Vote { id } => {
            let option = repo.vote_option(&id).await?;
            render(&option, format, |o| {
                format!("Voted:\n{}", pretty::format_option(o))
            })
        }
    }
}

async fn recovery(action: RecoveryAction, state: &AppState, format: OutputFormat) -> Result<String> {
    match action {
        RecoveryAction::List => {
            let pending = state.recovery.pending_deletions().await?;
            render(&pending, format, |p| pretty::format_pending(p))
        }
        RecoveryAction::Resume => {
            let resumed = state.recovery.resume_deletions().await?;
            match format {
                OutputFormat::Json => format_json(&json!({ "resumed": resumed })),
                OutputFormat::Pretty => Ok(format!("Resumed {} interrupted deletions", resumed)),
            }
        }
    }
}
