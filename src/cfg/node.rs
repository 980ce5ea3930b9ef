//! Configuration tree node
//!
//! A node is one level of the tree: an ordered list of entry names, a
//! comment per entry (optional) and the entry values themselves. An entry
//! is either an option (string value) or a section (nested node).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::error::{CfgError, Result};
use super::format::{Format, PATH_SEPARATOR};

/// Value bound to an entry name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// Option with its raw (possibly delimiter-joined) value.
    Option(String),
    /// Nested section.
    Section(CfgNode),
}

impl Entry {
    pub fn as_option(&self) -> Option<&str> {
        match self {
            Entry::Option(value) => Some(value),
            Entry::Section(_) => None,
        }
    }

    pub fn as_section(&self) -> Option<&CfgNode> {
        match self {
            Entry::Option(_) => None,
            Entry::Section(node) => Some(node),
        }
    }

    pub fn is_option(&self) -> bool {
        matches!(self, Entry::Option(_))
    }

    pub fn is_section(&self) -> bool {
        matches!(self, Entry::Section(_))
    }

    /// Human-readable kind, used in error messages.
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Entry::Option(_) => "an option",
            Entry::Section(_) => "a section",
        }
    }
}

/// Where an entry sits among its siblings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    /// After every other entry.
    #[default]
    Last,
    /// Before every other entry.
    First,
    /// Directly after the named entry.
    After(String),
}

/// One level of a configuration tree.
///
/// Invariants:
/// - every name in `order` has exactly one value in `children`
/// - every name in `comments` is in `order`
/// - names pass `validate_name`
///
/// `Clone` is a deep copy: the clone shares nothing with the original.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CfgNode {
    pub(super) order: Vec<String>,
    pub(super) comments: HashMap<String, String>,
    pub(super) children: HashMap<String, Entry>,
}

/// Characters with a meaning in the text format, besides the path separator.
const RESERVED_CHARS: [char; 6] = ['=', '{', '}', '#', '\n', '\r'];

/// A name must survive a serialize/parse cycle: non-empty, no surrounding
/// whitespace, no path separator and no format syntax.
fn validate_name(name: &str) -> Result<()> {
    if name.is_empty()
        || name.trim() != name
        || name.contains(PATH_SEPARATOR)
        || name.contains(RESERVED_CHARS)
    {
        return Err(CfgError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Parse a boolean option value.
fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "yes" | "true" | "y" | "on" | "1" => Some(true),
        "no" | "false" | "n" | "off" | "0" => Some(false),
        _ => None,
    }
}

impl CfgNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every entry, leaving an empty node.
    pub fn reset(&mut self) {
        self.order.clear();
        self.comments.clear();
        self.children.clear();
    }

    /// Record `name` in the order (first declaration only) and update its
    /// comment when a non-empty one is given.
    fn register(&mut self, name: &str, comment: &str) {
        if !self.order.iter().any(|n| n == name) {
            self.order.push(name.to_string());
        }
        if !comment.is_empty() {
            self.comments.insert(name.to_string(), comment.to_string());
        }
    }

    /// Create a section, or reopen an existing one.
    ///
    /// With `existing = None` a new empty node is bound to `name`; if `name`
    /// is already a section only its comment is updated. With
    /// `existing = Some(node)` the node is moved in as the section, which is
    /// an error when the section already exists.
    ///
    /// Returns the section node.
    pub fn create_new_section(
        &mut self,
        name: &str,
        comment: &str,
        existing: Option<CfgNode>,
    ) -> Result<&mut CfgNode> {
        validate_name(name)?;

        let already_section = match self.children.get(name) {
            Some(Entry::Option(_)) => {
                return Err(CfgError::TypeConflict {
                    name: name.to_string(),
                    existing: "an option",
                })
            }
            Some(Entry::Section(_)) => true,
            None => false,
        };

        if already_section {
            if existing.is_some() {
                return Err(CfgError::DuplicateSection(name.to_string()));
            }
        } else {
            self.children
                .insert(name.to_string(), Entry::Section(existing.unwrap_or_default()));
        }
        self.register(name, comment);

        self.get_section_mut(name)
            .ok_or_else(|| CfgError::KeyNotFound(name.to_string()))
    }

    /// Set an option value. Re-setting keeps the original position.
    pub fn set_option(&mut self, name: &str, value: impl ToString, comment: &str) -> Result<()> {
        validate_name(name)?;
        if let Some(Entry::Section(_)) = self.children.get(name) {
            return Err(CfgError::TypeConflict {
                name: name.to_string(),
                existing: "a section",
            });
        }
        self.children
            .insert(name.to_string(), Entry::Option(value.to_string()));
        self.register(name, comment);
        Ok(())
    }

    /// Concatenate `value` onto an existing option. No separator is inserted.
    ///
    /// Fails with `UndeclaredOption` unless `name` is an option, including
    /// when it names a section.
    pub fn append_to_option(&mut self, name: &str, value: impl ToString) -> Result<()> {
        match self.children.get_mut(name) {
            Some(Entry::Option(current)) => {
                current.push_str(&value.to_string());
                Ok(())
            }
            _ => Err(CfgError::UndeclaredOption(name.to_string())),
        }
    }

    /// Remove an entry with its comment. Sections take their subtree along.
    pub fn delete_entry(&mut self, name: &str) -> bool {
        if self.children.remove(name).is_none() {
            return false;
        }
        self.order.retain(|n| n != name);
        self.comments.remove(name);
        true
    }

    /// Rename an entry in place, keeping its position and comment.
    ///
    /// Returns `Ok(false)` if `old` does not exist.
    pub fn rename_key(&mut self, old: &str, new: &str) -> Result<bool> {
        if !self.children.contains_key(old) {
            return Ok(false);
        }
        validate_name(new)?;
        if old == new {
            return Ok(true);
        }
        if self.children.contains_key(new) {
            return Err(CfgError::KeyExists(new.to_string()));
        }

        if let Some(entry) = self.children.remove(old) {
            self.children.insert(new.to_string(), entry);
        }
        if let Some(comment) = self.comments.remove(old) {
            self.comments.insert(new.to_string(), comment);
        }
        if let Some(slot) = self.order.iter_mut().find(|n| n.as_str() == old) {
            *slot = new.to_string();
        }
        Ok(true)
    }

    /// Move an existing entry to `position`, keeping its value and comment.
    pub fn move_entry(&mut self, name: &str, position: &Position) -> Result<()> {
        let from = self
            .order
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| CfgError::KeyNotFound(name.to_string()))?;
        if matches!(position, Position::After(anchor) if anchor == name) {
            return Ok(());
        }

        let entry = self.order.remove(from);
        let to = match position {
            Position::First => 0,
            Position::Last => self.order.len(),
            Position::After(anchor) => match self.order.iter().position(|n| n == anchor) {
                Some(idx) => idx + 1,
                None => {
                    self.order.insert(from, entry);
                    return Err(CfgError::KeyNotFound(anchor.clone()));
                }
            },
        };
        self.order.insert(to, entry);
        Ok(())
    }

    /// Names of all options, in declaration order.
    pub fn list_options(&self) -> Vec<&str> {
        self.iter()
            .filter(|(_, entry)| entry.is_option())
            .map(|(name, _)| name)
            .collect()
    }

    /// Names of all sections, in declaration order.
    pub fn list_sections(&self) -> Vec<&str> {
        self.iter()
            .filter(|(_, entry)| entry.is_section())
            .map(|(name, _)| name)
            .collect()
    }

    /// Names of all entries, in declaration order.
    pub fn list_all(&self) -> Vec<&str> {
        self.order.iter().map(String::as_str).collect()
    }

    /// Entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Entry)> {
        self.order
            .iter()
            .filter_map(move |name| self.children.get(name).map(|entry| (name.as_str(), entry)))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.children.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn get_comment(&self, name: &str) -> Result<&str> {
        self.comments
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| CfgError::CommentNotFound(name.to_string()))
    }

    /// Replace the comment of an existing entry. An empty comment clears it.
    ///
    /// Returns false if the entry does not exist.
    pub fn set_comment(&mut self, name: &str, comment: &str) -> bool {
        if !self.children.contains_key(name) {
            return false;
        }
        if comment.is_empty() {
            self.comments.remove(name);
        } else {
            self.comments.insert(name.to_string(), comment.to_string());
        }
        true
    }

    /// Look up a direct entry by name.
    pub fn get(&self, name: &str) -> Result<&Entry> {
        self.children
            .get(name)
            .ok_or_else(|| CfgError::KeyNotFound(name.to_string()))
    }

    /// Value of a direct option.
    pub fn option(&self, name: &str) -> Option<&str> {
        self.children.get(name).and_then(Entry::as_option)
    }

    /// A direct sub-section.
    pub fn section(&self, name: &str) -> Option<&CfgNode> {
        self.children.get(name).and_then(Entry::as_section)
    }

    pub fn get_section_mut(&mut self, name: &str) -> Option<&mut CfgNode> {
        match self.children.get_mut(name) {
            Some(Entry::Section(node)) => Some(node),
            _ => None,
        }
    }

    // Path addressing

    /// Resolve a `/`-separated path to an entry.
    pub fn get_path(&self, path: &str) -> Option<&Entry> {
        let mut segments = path.trim_matches(PATH_SEPARATOR).split(PATH_SEPARATOR);
        let mut entry = self.children.get(segments.next()?)?;
        for segment in segments {
            entry = entry.as_section()?.children.get(segment)?;
        }
        Some(entry)
    }

    /// Resolve a path to a section. The empty path is this node.
    pub fn section_at(&self, path: &str) -> Option<&CfgNode> {
        if path.trim_matches(PATH_SEPARATOR).is_empty() {
            return Some(self);
        }
        self.get_path(path).and_then(Entry::as_section)
    }

    pub fn is_section(&self, path: &str) -> bool {
        self.get_path(path).is_some_and(Entry::is_section)
    }

    pub fn is_option(&self, path: &str) -> bool {
        self.get_path(path).is_some_and(Entry::is_option)
    }

    /// Get an option value as string
    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get_path(path).and_then(Entry::as_option)
    }

    /// Get an option value split into list items
    pub fn get_list(&self, path: &str) -> Option<Vec<String>> {
        self.get_str(path).map(|value| Format::default().split(value))
    }

    /// Get an option value as bool (yes/no, true/false, on/off, 1/0)
    pub fn get_bool(&self, path: &str) -> Option<bool> {
        self.get_str(path).and_then(parse_bool)
    }

    /// Get an option value as u64
    pub fn get_u64(&self, path: &str) -> Option<u64> {
        self.get_str(path).and_then(|v| v.trim().parse().ok())
    }

    /// Set an option by path, creating missing intermediate sections.
    pub fn set_option_path(&mut self, path: &str, value: impl ToString, comment: &str) -> Result<()> {
        let path = path.trim_matches(PATH_SEPARATOR);
        let (parents, name) = match path.rsplit_once(PATH_SEPARATOR) {
            Some((parents, name)) => (Some(parents), name),
            None => (None, path),
        };

        let mut level = self;
        if let Some(parents) = parents {
            for segment in parents.split(PATH_SEPARATOR) {
                level = level.create_new_section(segment, "", None)?;
            }
        }
        level.set_option(name, value, comment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CfgNode {
        let mut cfg = CfgNode::new();
        cfg.set_option("A", "1", "first").unwrap();
        let sec = cfg.create_new_section("S", "a section", None).unwrap();
        sec.set_option("Inner", "x", "").unwrap();
        cfg.set_option("B", "2", "").unwrap();
        cfg
    }

    #[test]
    fn test_new_is_empty() {
        let cfg = CfgNode::new();
        assert!(cfg.is_empty());
        assert!(cfg.list_all().is_empty());
    }

    #[test]
    fn test_order_preserved_across_kinds() {
        let cfg = sample();
        assert_eq!(cfg.list_all(), vec!["A", "S", "B"]);
        assert_eq!(cfg.list_options(), vec!["A", "B"]);
        assert_eq!(cfg.list_sections(), vec!["S"]);
    }

    #[test]
    fn test_duplicate_option_overwrites_in_place() {
        let mut cfg = sample();
        cfg.set_option("A", "changed", "").unwrap();

        assert_eq!(cfg.list_all(), vec!["A", "S", "B"]);
        assert_eq!(cfg.option("A"), Some("changed"));
        // Empty comment keeps the previous one
        assert_eq!(cfg.get_comment("A").unwrap(), "first");

        cfg.set_option("A", 3, "updated").unwrap();
        assert_eq!(cfg.option("A"), Some("3"));
        assert_eq!(cfg.get_comment("A").unwrap(), "updated");
        assert_eq!(cfg.len(), 3);
    }

    #[test]
    fn test_comment_update_does_not_reorder() {
        let mut cfg = sample();
        assert!(cfg.set_comment("A", "new"));
        cfg.create_new_section("S", "reopened", None).unwrap();

        assert_eq!(cfg.list_all(), vec!["A", "S", "B"]);
        assert_eq!(cfg.get_comment("S").unwrap(), "reopened");
    }

    #[test]
    fn test_reopen_section_keeps_contents() {
        let mut cfg = sample();
        let sec = cfg.create_new_section("S", "", None).unwrap();
        sec.set_option("Other", "y", "").unwrap();

        let sec = cfg.section("S").unwrap();
        assert_eq!(sec.list_options(), vec!["Inner", "Other"]);
    }

    #[test]
    fn test_existing_node_absorbed() {
        let mut child = CfgNode::new();
        child.set_option("K", "v", "").unwrap();

        let mut cfg = CfgNode::new();
        cfg.create_new_section("Child", "", Some(child)).unwrap();
        assert_eq!(cfg.get_str("Child/K"), Some("v"));
    }

    #[test]
    fn test_duplicate_section_with_node_fails() {
        let mut cfg = sample();
        let err = cfg
            .create_new_section("S", "", Some(CfgNode::new()))
            .unwrap_err();
        assert!(matches!(err, CfgError::DuplicateSection(name) if name == "S"));
        // Original section untouched
        assert_eq!(cfg.get_str("S/Inner"), Some("x"));
    }

    #[test]
    fn test_invalid_names() {
        let mut cfg = CfgNode::new();
        assert!(matches!(cfg.set_option("", "v", ""), Err(CfgError::InvalidName(_))));
        assert!(matches!(cfg.set_option("a/b", "v", ""), Err(CfgError::InvalidName(_))));
        assert!(matches!(
            cfg.create_new_section("", "", None),
            Err(CfgError::InvalidName(_))
        ));
        assert!(matches!(
            cfg.create_new_section("x/y", "", None),
            Err(CfgError::InvalidName(_))
        ));
        for name in ["a=b", "a{", "}", "a#b", " lead", "trail ", "two\nlines"] {
            assert!(
                matches!(cfg.set_option(name, "v", ""), Err(CfgError::InvalidName(_))),
                "{name:?} accepted"
            );
            assert!(matches!(
                cfg.create_new_section(name, "", None),
                Err(CfgError::InvalidName(_))
            ));
        }
        assert!(cfg.is_empty());

        // Inner spaces and other punctuation survive the text format
        cfg.set_option("Max Jobs", "4", "").unwrap();
        cfg.create_new_section("LCG.CERN.ch", "", None).unwrap();
        assert_eq!(cfg.list_all(), vec!["Max Jobs", "LCG.CERN.ch"]);
    }

    #[test]
    fn test_type_conflicts() {
        let mut cfg = sample();
        assert!(matches!(
            cfg.set_option("S", "v", ""),
            Err(CfgError::TypeConflict { existing: "a section", .. })
        ));
        assert!(matches!(
            cfg.create_new_section("A", "", None),
            Err(CfgError::TypeConflict { existing: "an option", .. })
        ));
    }

    #[test]
    fn test_append_to_option() {
        let mut cfg = CfgNode::new();
        cfg.set_option("X", "a", "").unwrap();
        cfg.append_to_option("X", ",b").unwrap();
        assert_eq!(cfg.option("X"), Some("a,b"));

        let err = cfg.append_to_option("Missing", "v").unwrap_err();
        assert!(matches!(err, CfgError::UndeclaredOption(name) if name == "Missing"));

        cfg.create_new_section("Sec", "", None).unwrap();
        let err = cfg.append_to_option("Sec", "v").unwrap_err();
        assert!(matches!(err, CfgError::UndeclaredOption(name) if name == "Sec"));
        assert!(cfg.section("Sec").unwrap().is_empty());
    }

    #[test]
    fn test_delete_entry() {
        let mut cfg = sample();
        assert!(cfg.delete_entry("S"));
        assert!(cfg.list_sections().is_empty());
        assert_eq!(cfg.list_all(), vec!["A", "B"]);
        assert!(cfg.get_comment("S").is_err());
        assert!(cfg.get_path("S/Inner").is_none());

        let before = cfg.clone();
        assert!(!cfg.delete_entry("Nope"));
        assert_eq!(cfg, before);
    }

    #[test]
    fn test_comments() {
        let mut cfg = sample();
        assert_eq!(cfg.get_comment("A").unwrap(), "first");
        assert!(matches!(
            cfg.get_comment("B"),
            Err(CfgError::CommentNotFound(name)) if name == "B"
        ));
        assert!(!cfg.set_comment("Missing", "x"));
        assert!(cfg.set_comment("B", "line1\nline2"));
        assert_eq!(cfg.get_comment("B").unwrap(), "line1\nline2");
        assert!(cfg.set_comment("B", ""));
        assert!(cfg.get_comment("B").is_err());
    }

    #[test]
    fn test_get_lookup() {
        let cfg = sample();
        assert_eq!(cfg.get("A").unwrap(), &Entry::Option("1".to_string()));
        assert!(cfg.get("S").unwrap().is_section());
        assert!(matches!(cfg.get("Z"), Err(CfgError::KeyNotFound(name)) if name == "Z"));
    }

    #[test]
    fn test_clone_is_independent() {
        let original = sample();
        let mut cloned = original.clone();

        cloned.set_option("A", "mutated", "").unwrap();
        cloned
            .get_section_mut("S")
            .unwrap()
            .set_option("Inner", "deep", "")
            .unwrap();

        assert_eq!(original.option("A"), Some("1"));
        assert_eq!(original.get_str("S/Inner"), Some("x"));
        assert_eq!(cloned.get_str("S/Inner"), Some("deep"));
    }

    #[test]
    fn test_original_mutation_leaves_clone_alone() {
        let mut original = CfgNode::new();
        original.set_option_path("L1/L2/L3/Leaf", "x", "").unwrap();
        let cloned = original.clone();

        let l2 = original
            .get_section_mut("L1")
            .and_then(|l1| l1.get_section_mut("L2"))
            .unwrap();
        l2.get_section_mut("L3")
            .unwrap()
            .set_option("Leaf", "changed", "")
            .unwrap();
        l2.create_new_section("Added", "", None).unwrap();
        assert!(l2.set_comment("L3", "noted"));
        original.delete_entry("L1");

        assert_eq!(cloned.get_str("L1/L2/L3/Leaf"), Some("x"));
        assert!(!cloned.is_section("L1/L2/Added"));
        assert!(cloned.section_at("L1/L2").unwrap().get_comment("L3").is_err());
        assert!(original.is_empty());
    }

    #[test]
    fn test_move_entry() {
        let mut cfg = sample();
        cfg.move_entry("B", &Position::First).unwrap();
        assert_eq!(cfg.list_all(), vec!["B", "A", "S"]);

        cfg.move_entry("B", &Position::After("S".to_string())).unwrap();
        assert_eq!(cfg.list_all(), vec!["A", "S", "B"]);

        cfg.move_entry("A", &Position::Last).unwrap();
        assert_eq!(cfg.list_all(), vec!["S", "B", "A"]);
        assert_eq!(cfg.get_comment("A").unwrap(), "first");

        assert!(matches!(
            cfg.move_entry("Nope", &Position::First),
            Err(CfgError::KeyNotFound(name)) if name == "Nope"
        ));
        assert!(matches!(
            cfg.move_entry("A", &Position::After("Nope".to_string())),
            Err(CfgError::KeyNotFound(name)) if name == "Nope"
        ));
        assert_eq!(cfg.list_all(), vec!["S", "B", "A"]);
    }

    #[test]
    fn test_rename_key() {
        let mut cfg = sample();
        assert!(cfg.rename_key("S", "T").unwrap());
        assert_eq!(cfg.list_all(), vec!["A", "T", "B"]);
        assert_eq!(cfg.get_comment("T").unwrap(), "a section");
        assert_eq!(cfg.get_str("T/Inner"), Some("x"));

        assert!(!cfg.rename_key("S", "U").unwrap());
        assert!(matches!(cfg.rename_key("A", "B"), Err(CfgError::KeyExists(_))));
        assert!(matches!(cfg.rename_key("A", "a/b"), Err(CfgError::InvalidName(_))));
    }

    #[test]
    fn test_path_getters() {
        let mut cfg = CfgNode::new();
        cfg.set_option_path("System/Service/Port", 9130, "").unwrap();
        cfg.set_option_path("System/Service/Enabled", "Yes", "").unwrap();
        cfg.set_option_path("System/Hosts", "a, b,c", "").unwrap();

        assert!(cfg.is_section("System"));
        assert!(cfg.is_section("/System/Service/"));
        assert!(cfg.is_option("System/Service/Port"));
        assert!(!cfg.is_option("System/Service"));
        assert_eq!(cfg.get_u64("System/Service/Port"), Some(9130));
        assert_eq!(cfg.get_bool("System/Service/Enabled"), Some(true));
        assert_eq!(cfg.get_bool("System/Service/Port"), None);
        assert_eq!(
            cfg.get_list("System/Hosts"),
            Some(vec!["a".to_string(), "b".to_string(), "c".to_string()])
        );
        assert!(cfg.get_path("System/Missing/Port").is_none());
        assert!(cfg.get_path("").is_none());
        assert!(std::ptr::eq(cfg.section_at("").unwrap(), &cfg));
    }

    #[test]
    fn test_set_option_path_rejects_option_parent() {
        let mut cfg = CfgNode::new();
        cfg.set_option("Leaf", "v", "").unwrap();
        assert!(matches!(
            cfg.set_option_path("Leaf/Child", "v", ""),
            Err(CfgError::TypeConflict { .. })
        ));
    }

    #[test]
    fn test_reset() {
        let mut cfg = sample();
        cfg.reset();
        assert_eq!(cfg, CfgNode::new());
    }
}
