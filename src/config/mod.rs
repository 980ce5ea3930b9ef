//! Layered configuration loading
//!
//! Builds one effective tree from several configuration files merged in
//! precedence order (later files win), with optional overrides on top:
//! 1. Site-wide files
//! 2. User files
//! 3. Overrides given on the command line

mod effective;

pub use effective::{ConfigOrigin, ConfigSource, EffectiveConfig, SCHEMA_ID, SCHEMA_VERSION};
