//! Tree modifications
//!
//! `get_modifications` describes how to turn one tree into another, entry
//! order included; `apply_modifications` replays such a description onto a
//! tree. Added and moved entries carry the [`Position`] they take.

use serde::{Deserialize, Serialize};

use super::error::{CfgError, Result};
use super::node::{CfgNode, Entry, Position};

/// A single change between two trees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Modification {
    AddOption {
        name: String,
        value: String,
        #[serde(default, skip_serializing_if = "String::is_empty")]
        comment: String,
        #[serde(default)]
        position: Position,
    },
    /// New value and comment. An empty comment removes the old one.
    ModifyOption {
        name: String,
        value: String,
        #[serde(default, skip_serializing_if = "String::is_empty")]
        comment: String,
    },
    DeleteOption {
        name: String,
    },
    AddSection {
        name: String,
        #[serde(default, skip_serializing_if = "String::is_empty")]
        comment: String,
        #[serde(default)]
        position: Position,
        contents: CfgNode,
    },
    /// Nested changes plus the section's new comment.
    ModifySection {
        name: String,
        #[serde(default, skip_serializing_if = "String::is_empty")]
        comment: String,
        changes: Vec<Modification>,
    },
    DeleteSection {
        name: String,
    },
    /// Same entry, new place among its siblings.
    MoveEntry {
        name: String,
        position: Position,
    },
}

impl Modification {
    /// Entry name this modification targets.
    pub fn name(&self) -> &str {
        match self {
            Modification::AddOption { name, .. }
            | Modification::ModifyOption { name, .. }
            | Modification::DeleteOption { name }
            | Modification::AddSection { name, .. }
            | Modification::ModifySection { name, .. }
            | Modification::DeleteSection { name }
            | Modification::MoveEntry { name, .. } => name,
        }
    }

    fn added(name: &str, entry: &Entry, comment: &str, position: Position) -> Self {
        match entry {
            Entry::Option(value) => Modification::AddOption {
                name: name.to_string(),
                value: value.clone(),
                comment: comment.to_string(),
                position,
            },
            Entry::Section(node) => Modification::AddSection {
                name: name.to_string(),
                comment: comment.to_string(),
                position,
                contents: node.clone(),
            },
        }
    }

    fn deleted(name: &str, entry: &Entry) -> Self {
        let name = name.to_string();
        match entry {
            Entry::Option(_) => Modification::DeleteOption { name },
            Entry::Section(_) => Modification::DeleteSection { name },
        }
    }
}

impl CfgNode {
    fn comment_or_empty(&self, name: &str) -> &str {
        self.comments.get(name).map(String::as_str).unwrap_or("")
    }

    /// Changes that turn `self` into `newer`.
    ///
    /// Deletions come first, then additions, modifications and moves in
    /// `newer`'s order. An entry that changes kind is deleted and re-added.
    /// Entries already in place relative to `newer` are not moved.
    pub fn get_modifications(&self, newer: &CfgNode) -> Vec<Modification> {
        let mut mods: Vec<Modification> = self
            .iter()
            .filter(|(name, _)| !newer.contains(name))
            .map(|(name, entry)| Modification::deleted(name, entry))
            .collect();

        // Order of the tree being patched; the first `idx` names always
        // match `newer` once entry `idx` is reached.
        let mut current: Vec<&str> = self
            .list_all()
            .into_iter()
            .filter(|name| newer.contains(name))
            .collect();
        let mut previous: Option<&str> = None;

        for (idx, (name, new_entry)) in newer.iter().enumerate() {
            let position = match previous {
                None => Position::First,
                Some(prev) => Position::After(prev.to_string()),
            };
            previous = Some(name);
            let in_place = current.get(idx) == Some(&name);

            let old_comment = self.comment_or_empty(name);
            let new_comment = newer.comment_or_empty(name);

            match (self.children.get(name), new_entry) {
                (None, _) => {
                    mods.push(Modification::added(name, new_entry, new_comment, position))
                }
                (Some(Entry::Option(old)), Entry::Option(new)) => {
                    if old != new || old_comment != new_comment {
                        mods.push(Modification::ModifyOption {
                            name: name.to_string(),
                            value: new.clone(),
                            comment: new_comment.to_string(),
                        });
                    }
                    if !in_place {
                        mods.push(Modification::MoveEntry {
                            name: name.to_string(),
                            position,
                        });
                    }
                }
                (Some(Entry::Section(old)), Entry::Section(new)) => {
                    let changes = old.get_modifications(new);
                    if !changes.is_empty() || old_comment != new_comment {
                        mods.push(Modification::ModifySection {
                            name: name.to_string(),
                            comment: new_comment.to_string(),
                            changes,
                        });
                    }
                    if !in_place {
                        mods.push(Modification::MoveEntry {
                            name: name.to_string(),
                            position,
                        });
                    }
                }
                (Some(old), _) => {
                    mods.push(Modification::deleted(name, old));
                    mods.push(Modification::added(name, new_entry, new_comment, position));
                }
            }

            if !in_place {
                current.retain(|n| *n != name);
                current.insert(idx, name);
            }
        }

        mods
    }

    /// Replay modifications onto this tree.
    ///
    /// Stops at the first modification that does not fit the tree; the ones
    /// before it stay applied.
    pub fn apply_modifications(&mut self, mods: &[Modification]) -> Result<()> {
        for modification in mods {
            match modification {
                Modification::AddOption {
                    name,
                    value,
                    comment,
                    position,
                } => {
                    if self.contains(name) {
                        return Err(CfgError::KeyExists(name.clone()));
                    }
                    self.set_option(name, value, comment)?;
                    self.move_entry(name, position)?;
                }
                Modification::ModifyOption { name, value, comment } => {
                    self.get(name)?;
                    self.set_option(name, value, comment)?;
                    self.set_comment(name, comment);
                }
                Modification::AddSection {
                    name,
                    comment,
                    position,
                    contents,
                } => {
                    self.create_new_section(name, comment, Some(contents.clone()))?;
                    self.move_entry(name, position)?;
                }
                Modification::MoveEntry { name, position } => self.move_entry(name, position)?,
                Modification::ModifySection { name, comment, changes } => {
                    let section = self.get_section_mut(name).ok_or_else(|| {
                        CfgError::KeyNotFound(name.clone())
                    })?;
                    section.apply_modifications(changes)?;
                    self.set_comment(name, comment);
                }
                Modification::DeleteOption { name } | Modification::DeleteSection { name } => {
                    let expect_section = matches!(modification, Modification::DeleteSection { .. });
                    let entry = self.get(name)?;
                    if entry.is_section() != expect_section {
                        return Err(CfgError::TypeConflict {
                            name: name.clone(),
                            existing: entry.kind(),
                        });
                    }
                    self.delete_entry(name);
                }
            }
        }
        Ok(())
    }
}
