//! Output formatting functions.

pub mod pretty;

/// Format a value as compact JSON.
pub fn format_json<T: serde::Serialize>(value: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string(value)?)
}
