//! JSON interchange and serde support.
//!
//! `to_json_value` maps sections to objects and options to strings, keeping
//! entry order. Comments have no JSON representation and are dropped.
//!
//! `Serialize`/`Deserialize` go through the canonical text form instead, so a
//! tree embedded in a JSON document keeps its comments.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use super::error::{CfgError, Result};
use super::format::Format;
use super::node::{CfgNode, Entry};

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl CfgNode {
    pub fn to_json_value(&self) -> Value {
        let map: Map<String, Value> = self
            .iter()
            .map(|(name, entry)| {
                let value = match entry {
                    Entry::Option(value) => Value::String(value.clone()),
                    Entry::Section(node) => node.to_json_value(),
                };
                (name.to_string(), value)
            })
            .collect();
        Value::Object(map)
    }

    /// Build a tree from a JSON object.
    ///
    /// Objects become sections and strings become options. Arrays are joined
    /// into a list value, numbers and booleans are stringified and `null`
    /// becomes an empty option.
    pub fn from_json_value(value: &Value) -> Result<Self> {
        let map = value.as_object().ok_or_else(|| {
            CfgError::InvalidJson(format!("expected an object, found {}", value))
        })?;

        let format = Format::default();
        let mut node = CfgNode::new();
        for (name, value) in map {
            match value {
                Value::Object(_) => {
                    node.create_new_section(name, "", Some(Self::from_json_value(value)?))?;
                }
                Value::String(s) => node.set_option(name, s, "")?,
                Value::Array(items) => node.set_option(
                    name,
                    cfgtree_list::join(items.iter().map(scalar_text), format.delimiter),
                    "",
                )?,
                Value::Null => node.set_option(name, "", "")?,
                other => node.set_option(name, other, "")?,
            }
        }
        Ok(node)
    }
}

impl Serialize for CfgNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.serialize_with(&Format::default()))
    }
}

impl<'de> Deserialize<'de> for CfgNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
