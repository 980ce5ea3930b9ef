//! Delimiter-separated list helpers.
//!
//! Option values in a configuration tree are plain strings. Multi-valued
//! options are stored delimiter-joined and split back into items when they
//! are rendered or read as lists:
//! - Items are trimmed of surrounding whitespace
//! - Empty items are dropped
//! - Joining uses the delimiter followed by a single space

/// Default list delimiter.
pub const DEFAULT_DELIMITER: char = ',';

/// Canonical separator produced by [`join`] with the default delimiter.
pub const SEPARATOR: &str = ", ";

/// Split `text` on `delimiter` into trimmed, non-empty items.
pub fn from_char(text: &str, delimiter: char) -> Vec<String> {
    text.split(delimiter)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}

/// Join items with `delimiter` followed by a space.
pub fn join<I, S>(items: I, delimiter: char) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let separator = format!("{} ", delimiter);
    items
        .into_iter()
        .map(|item| item.as_ref().trim().to_string())
        .filter(|item| !item.is_empty())
        .collect::<Vec<_>>()
        .join(&separator)
}
