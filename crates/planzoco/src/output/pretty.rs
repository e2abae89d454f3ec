//! Pretty output formatting.

use planzoco_core::poll::{Event, PollOption, Question};
use planzoco_core::storage::PendingDeletion;

fn votes_label(votes: u64) -> String {
    match votes {
        1 => "1 vote".to_string(),
        n => format!("{n} votes"),
    }
}

fn option_line(option: &PollOption) -> String {
    format!(
        "* {} [{}] {}",
        option.text,
        option.id,
        votes_label(option.votes)
    )
}

/// Format an option for display.
pub fn format_option(option: &PollOption) -> String {
    format!(
        "{}\n  ID: {}\n  Question: {}\n  Votes: {}",
        option.text, option.id, option.question_id, option.votes
    )
}

/// Format a question with its options and, when known, its event.
pub fn format_question(question: &Question, event: Option<&Event>) -> String {
    let mut output = format!("{}\n  ID: {}", question.text, question.id);
    match event {
        Some(event) => output.push_str(&format!("\n  Event: {} ({})", event.name, event.id)),
        None => output.push_str(&format!("\n  Event: {} (missing)", question.event_id)),
    }
    if question.options.is_empty() {
        output.push_str("\n  No options yet.");
    }
    for option in &question.options {
        output.push_str(&format!("\n    {}", option_line(option)));
    }
    output
}

/// Format an event as a tree of questions and options.
pub fn format_event(event: &Event) -> String {
    let mut output = format!("{}\n  ID: {}", event.name, event.id);
    if event.questions.is_empty() {
        output.push_str("\n  No questions yet.");
    }
    for question in &event.questions {
        output.push_str(&format!("\n  - {} [{}]", question.text, question.id));
        for option in &question.options {
            output.push_str(&format!("\n      {}", option_line(option)));
        }
    }
    output
}

/// Format events for display.
pub fn format_events(events: &[Event]) -> String {
    if events.is_empty() {
        return "No events found.".to_string();
    }
    let mut output = format!("EVENTS ({})\n", events.len());
    output.push_str(&"-".repeat(40));
    for event in events {
        output.push_str(&format!("\n{}", format_event(event)));
        output.push('\n');
    }
    output
}

/// Format the leading options of a question.
pub fn format_winners(question: &Question, winners: &[&PollOption]) -> String {
    if winners.is_empty() {
        return format!("{}\n  No votes yet.", question.text);
    }
    let label = if winners.len() == 1 { "Winner" } else { "Tied" };
    let mut output = format!("{}\n  {}:", question.text, label);
    for option in winners {
        output.push_str(&format!("\n    {}", option_line(option)));
    }
    output
}

/// Format interrupted deletions for display.
pub fn format_pending(pending: &[PendingDeletion]) -> String {
    if pending.is_empty() {
        return "No interrupted deletions.".to_string();
    }
    let mut output = format!("PENDING DELETIONS ({})\n", pending.len());
    output.push_str(&"-".repeat(40));
    for deletion in pending {
        output.push_str(&format!("\n{} {}", deletion.entity_type.label(), deletion.id));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question() -> Question {
        let mut question = Question::new("q1", "ev1", "Where?");
        question.options = vec![
            PollOption::new("o1", "q1", "Lisbon").with_votes(1),
            PollOption::new("o2", "q1", "Porto").with_votes(3),
        ];
        question
    }

    #[test]
    fn test_format_event_tree() {
        let mut event = Event::new("ev1", "Team offsite");
        event.questions.push(question());

        assert_eq!(
            format_event(&event),
            "Team offsite\n  ID: ev1\n  - Where? [q1]\n      * Lisbon [o1] 1 vote\n      * Porto [o2] 3 votes"
        );
    }

    #[test]
    fn test_format_question_without_event() {
        let output = format_question(&question(), None);
        assert!(output.contains("Event: ev1 (missing)"));
    }

    #[test]
    fn test_format_winners() {
        let question = question();
        let winners = question.winning_options();
        assert_eq!(
            format_winners(&question, &winners),
            "Where?\n  Winner:\n    * Porto [o2] 3 votes"
        );
        assert_eq!(format_winners(&question, &[]), "Where?\n  No votes yet.");
    }

    #[test]
    fn test_format_empty_lists() {
        assert_eq!(format_events(&[]), "No events found.");
        assert_eq!(format_pending(&[]), "No interrupted deletions.");
    }
}
