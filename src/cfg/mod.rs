//! Hierarchical configuration tree
//!
//! A tree of named sections holding ordered options and sub-sections, each
//! entry optionally commented:
//! - [`CfgNode`]: one level of the tree and its mutation/query operations
//! - serializer: canonical text rendering (`CfgNode::serialize`)
//! - parser: canonical text loading (`CfgNode::load_from_buffer`, `parse`)
//! - merge: "other wins" tree merge (`CfgNode::merge_with`, `merge_layers`)
//! - diff: modification lists between trees

mod diff;
mod error;
mod format;
mod json;
mod merge;
mod node;
mod parser;
mod serializer;

pub use diff::Modification;
pub use error::{CfgError, Result};
pub use format::{Format, INDENT_STEP, MAX_DEPTH, PATH_SEPARATOR};
pub use merge::merge_layers;
pub use node::{CfgNode, Entry, Position};
pub use parser::parse;
