//! Effective configuration with full provenance
//!
//! The effective configuration is the merge of every configuration file
//! that exists, in precedence order, plus optional overrides on top, along
//! with a record of where each layer came from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::cfg::{merge_layers, CfgError, CfgNode, Result};

/// Schema version for effective_config
pub const SCHEMA_VERSION: u32 = 1;

/// Schema identifier
pub const SCHEMA_ID: &str = "cfgtree/effective_config@1";

/// Origin of a configuration layer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ConfigOrigin {
    File,
    Override,
}

/// A contributing layer with provenance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSource {
    /// Origin of this layer
    pub origin: ConfigOrigin,

    /// File path (None for overrides)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// SHA-256 digest of raw file bytes (None for overrides)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

/// Effective configuration with full provenance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveConfig {
    /// Schema version
    pub schema_version: u32,

    /// Schema identifier
    pub schema_id: String,

    /// When this config was computed
    pub created_at: DateTime<Utc>,

    /// The merged tree (canonical text when serialized)
    pub config: CfgNode,

    /// Contributing layers in precedence order
    pub sources: Vec<ConfigSource>,

    /// Candidate paths that did not exist
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<String>,
}

impl EffectiveConfig {
    /// Build the effective config from files (lowest precedence first) and
    /// optional overrides applied last. Missing files are skipped.
    pub fn build(paths: &[PathBuf], overrides: Option<CfgNode>) -> Result<Self> {
        let mut layers = Vec::new();
        let mut sources = Vec::new();
        let mut skipped = Vec::new();

        for path in paths {
            if !path.exists() {
                debug!(path = %path.display(), "configuration file not found, skipping");
                skipped.push(path.to_string_lossy().to_string());
                continue;
            }

            let (tree, digest) =
                Self::load_cfg_file(path).map_err(|e| CfgError::in_file(path, e))?;
            debug!(path = %path.display(), %digest, entries = tree.len(), "loaded configuration layer");
            layers.push(tree);
            sources.push(ConfigSource {
                origin: ConfigOrigin::File,
                path: Some(path.to_string_lossy().to_string()),
                digest: Some(digest),
            });
        }

        if let Some(overrides) = overrides {
            layers.push(overrides);
            sources.push(ConfigSource {
                origin: ConfigOrigin::Override,
                path: None,
                digest: None,
            });
        }

        Ok(Self {
            schema_version: SCHEMA_VERSION,
            schema_id: SCHEMA_ID.to_string(),
            created_at: Utc::now(),
            config: merge_layers(layers),
            sources,
            skipped,
        })
    }

    /// Load and parse a configuration file, returning the tree and digest
    fn load_cfg_file(path: &Path) -> Result<(CfgNode, String)> {
        let bytes = fs::read(path)?;

        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let digest = hex::encode(hasher.finalize());

        let contents = String::from_utf8(bytes)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        Ok((contents.parse()?, digest))
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Get a config value by `/`-separated path
    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.config.get_str(path)
    }

    pub fn get_u64(&self, path: &str) -> Option<u64> {
        self.config.get_u64(path)
    }

    pub fn get_bool(&self, path: &str) -> Option<bool> {
        self.config.get_bool(path)
    }
}
