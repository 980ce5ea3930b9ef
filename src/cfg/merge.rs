//! Tree merge logic
//!
//! Merge semantics (the second tree wins):
//! - Options: overridden by the second tree
//! - Sections present in both: merged recursively
//! - Sections present in one tree only: carried over whole
//! - Option vs section under one name: the second tree's entry replaces the first
//! - Comments: the second tree's comment wins when it has one
//!
//! The result keeps the first tree's order; names only the second tree
//! declares follow in the second tree's order.

use tracing::debug;

use super::node::{CfgNode, Entry};

impl CfgNode {
    /// Merge `other` over `self` into a new tree. Neither input is touched and
    /// the result shares nothing with them.
    pub fn merge_with(&self, other: &CfgNode) -> CfgNode {
        self.clone().merge_into(other.clone())
    }

    /// Merge `other` over `self`, consuming both.
    ///
    /// Sections that only `other` declares are moved into the result as-is.
    pub fn merge_into(self, other: CfgNode) -> CfgNode {
        let CfgNode {
            order,
            mut comments,
            mut children,
        } = other;
        let mut result = self;

        for name in order {
            let Some(overlay) = children.remove(&name) else {
                continue;
            };
            let merged = match (result.children.remove(&name), overlay) {
                (Some(Entry::Section(base)), Entry::Section(overlay)) => {
                    Entry::Section(base.merge_into(overlay))
                }
                // Options, new entries and kind changes: overlay wins
                (_, overlay) => overlay,
            };
            result.children.insert(name.clone(), merged);

            if let Some(comment) = comments.remove(&name) {
                result.comments.insert(name.clone(), comment);
            }
            if !result.order.contains(&name) {
                result.order.push(name);
            }
        }

        result
    }
}

/// Merge layers in order (first is base, last has highest precedence)
pub fn merge_layers(layers: Vec<CfgNode>) -> CfgNode {
    debug!(layers = layers.len(), "merging configuration layers");
    layers.into_iter().fold(CfgNode::new(), CfgNode::merge_into)
}
