// Copyright 2024 OctoFHIR Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Entity records evaluated by expressions

use indexmap::IndexMap;

use super::value::Value;
use crate::error::{MagmaError, Result};

/// Default attribute treated as the identity field when ingesting JSON
pub const DEFAULT_IDENTITY_ATTRIBUTE: &str = "_idValue";

/// A read-only attribute mapping
///
/// An entity may carry an identity value. When present, the identity is what
/// unwrapping and equality surface for the entity instead of its structure.
/// The identity is fixed at construction time.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Entity {
    attributes: IndexMap<String, Value>,
    identity: Option<Box<Value>>,
}

impl Entity {
    /// Create an empty entity without identity
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the identity value
    pub fn with_identity(mut self, identity: impl Into<Value>) -> Self {
        let identity = identity.into();
        self.identity = (!identity.is_null()).then(|| Box::new(identity));
        self
    }

    /// Add an attribute
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Look up an attribute by name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Get the identity value, if this entity has one
    pub fn identity(&self) -> Option<&Value> {
        self.identity.as_deref()
    }

    /// All attributes in insertion order
    pub fn attributes(&self) -> &IndexMap<String, Value> {
        &self.attributes
    }

    /// Number of attributes
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Check if the entity has no attributes
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Build an entity from a JSON object
    ///
    /// Fails if `json` is not an object.
    pub fn from_json(json: &serde_json::Value, identity_key: &str) -> Result<Self> {
        match json {
            serde_json::Value::Object(map) => Ok(Self::from_json_object(map, identity_key)),
            other => Err(MagmaError::InvalidEntity {
                message: format!("expected a JSON object, got {}", json_type_name(other)),
            }),
        }
    }

    pub(crate) fn from_json_object(
        map: &serde_json::Map<String, serde_json::Value>,
        identity_key: &str,
    ) -> Self {
        let attributes: IndexMap<String, Value> = map
            .iter()
            .map(|(name, value)| (name.clone(), Value::from_json(value, identity_key)))
            .collect();

        // Only scalar identities are meaningful for equality
        let identity = attributes
            .get(identity_key)
            .filter(|id| !matches!(id, Value::Null | Value::Entity(_) | Value::List(_)))
            .cloned()
            .map(Box::new);

        Self {
            attributes,
            identity,
        }
    }
}

impl FromIterator<(String, Value)> for Entity {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            attributes: iter.into_iter().collect(),
            identity: None,
        }
    }
}

fn json_type_name(json: &serde_json::Value) -> &'static str {
    match json {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
