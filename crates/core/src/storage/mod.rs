mod codec;
mod error;
mod http_mapping;
mod item;
mod keys;
mod traits;

pub use codec::{
    decode, encode, event_to_item, item_to_event, item_to_option, item_to_question,
    option_to_item, question_to_item, Record,
};
pub use error::{RepositoryError, Result};
pub use http_mapping::repository_error_to_status_code;
pub use item::{AttrValue, IndexQuery, Item};
pub use keys::{attr, make_key, Index, ItemKey};
pub use traits::{
    DeletionRecovery, EventRepository, KeyValueStore, OptionRepository, PendingDeletion,
    QuestionRepository,
};
