//! cfgtree - hierarchical configuration trees
//!
//! This crate implements a configuration tree of named sections holding
//! ordered, commented options and sub-sections, together with its text
//! format, a "last wins" merge and layered loading from files.

pub mod cfg;
pub mod config;

pub use cfg::{
    merge_layers, parse, CfgError, CfgNode, Entry, Format, Modification, Position, Result, MAX_DEPTH,
};
pub use config::{ConfigOrigin, ConfigSource, EffectiveConfig};
