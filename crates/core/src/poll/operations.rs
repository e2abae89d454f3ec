use super::error::ValidationError;
use super::types::PollOption;

const MAX_TEXT_LEN: usize = 200;

/// Returns every option sharing the highest vote count.
///
/// Empty when there are no options or when nobody has voted yet.
pub fn winning_options(options: &[PollOption]) -> Vec<&PollOption> {
    let Some(max_votes) = options.iter().map(|o| o.votes).max() else {
        return Vec::new();
    };

    if max_votes == 0 {
        return Vec::new();
    }

    options.iter().filter(|o| o.votes == max_votes).collect()
}

/// Validates an event name before it reaches storage.
pub fn validate_event_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if name.chars().count() > MAX_TEXT_LEN {
        return Err(ValidationError::NameTooLong);
    }
    Ok(())
}

/// Validates question text before it reaches storage.
pub fn validate_question_text(text: &str) -> Result<(), ValidationError> {
    validate_text("Question", text)
}

/// Validates option text before it reaches storage.
pub fn validate_option_text(text: &str) -> Result<(), ValidationError> {
    validate_text("Option", text)
}

fn validate_text(kind: &'static str, text: &str) -> Result<(), ValidationError> {
    if text.trim().is_empty() {
        return Err(ValidationError::EmptyText(kind));
    }
    if text.chars().count() > MAX_TEXT_LEN {
        return Err(ValidationError::TextTooLong(kind));
    }
    Ok(())
}
