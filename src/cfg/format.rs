//! Text format settings shared by the serializer and the parser.

/// Indentation added per nesting level.
pub const INDENT_STEP: &str = "  ";

/// Path separator for addressing nested entries (`System/Service/Option`).
pub const PATH_SEPARATOR: char = '/';

/// Deepest section nesting the parser accepts. Deeper input is rejected as
/// malformed so that every parsed tree can be serialized, cloned and dropped
/// on a default-sized thread stack.
pub const MAX_DEPTH: usize = 256;

/// Format settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Format {
    /// Delimiter between the items of a multi-valued option.
    /// The serializer splits on it to emit `+=` lines and the parser
    /// joins `+=` lines with it.
    pub delimiter: char,
}

impl Default for Format {
    fn default() -> Self {
        Self {
            delimiter: cfgtree_list::DEFAULT_DELIMITER,
        }
    }
}

impl Format {
    /// Format with a custom list delimiter.
    pub fn with_delimiter(delimiter: char) -> Self {
        Self { delimiter }
    }

    /// Split an option value into its list items.
    pub fn split(&self, value: &str) -> Vec<String> {
        cfgtree_list::from_char(value, self.delimiter)
    }

    /// Suffix to concatenate onto an existing value to append `item`.
    pub(crate) fn continuation(&self, item: &str) -> String {
        format!("{} {}", self.delimiter, item)
    }
}
