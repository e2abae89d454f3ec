mod error;
mod operations;
mod types;

pub use error::ValidationError;
pub use operations::{
    validate_event_name, validate_option_text, validate_question_text, winning_options,
};
pub use types::{EntityType, Event, PollOption, Question};
