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

//! Raw data model for entity attributes and unwrapped results

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::fmt;
use std::sync::Arc;

use super::entity::Entity;

/// A raw attribute value as supplied by the host application
///
/// This is also the shape of every unwrapped result: `value()` on a wrapped
/// value always produces one of these variants.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Null or absent
    Null,

    /// Boolean value
    Boolean(bool),

    /// Numeric value (integers and decimals share one representation)
    Number(f64),

    /// String value
    String(String),

    /// Calendar date without time
    Date(NaiveDate),

    /// Date and time with offset
    DateTime(DateTime<FixedOffset>),

    /// Nested entity (a reference)
    Entity(Arc<Entity>),

    /// Ordered list of values
    List(Vec<Value>),
}

impl Value {
    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Get the numeric payload, if any
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Get the string payload, if any
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the boolean payload, if any
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Get the type name for this value
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Date(_) => "date",
            Self::DateTime(_) => "datetime",
            Self::Entity(_) => "entity",
            Self::List(_) => "list",
        }
    }

    /// Render the value as a lookup key
    ///
    /// Keys follow the textual form a mapping literal would use, so the
    /// number `1` matches the key written as `1` or `'1'`. Entities, lists
    /// and null have no key form.
    pub fn to_key(&self) -> Option<String> {
        match self {
            Self::Boolean(b) => Some(b.to_string()),
            Self::Number(n) => Some(format_number(*n)),
            Self::String(s) => Some(s.clone()),
            Self::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
            Self::DateTime(dt) => Some(dt.to_rfc3339()),
            Self::Null | Self::Entity(_) | Self::List(_) => None,
        }
    }

    /// Convert a JSON document into a raw value
    ///
    /// Objects become entities; the attribute named `identity_key`, when
    /// present and scalar, becomes the entity's identity.
    pub fn from_json(json: &serde_json::Value, identity_key: &str) -> Self {
        match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Boolean(*b),
            serde_json::Value::Number(n) => n.as_f64().map_or(Self::Null, Self::Number),
            serde_json::Value::String(s) => Self::String(s.clone()),
            serde_json::Value::Array(items) => Self::List(
                items
                    .iter()
                    .map(|item| Self::from_json(item, identity_key))
                    .collect(),
            ),
            serde_json::Value::Object(map) => {
                Self::Entity(Arc::new(Entity::from_json_object(map, identity_key)))
            }
        }
    }
}

/// Format a number the way expression authors write it: `18`, not `18.0`
pub(crate) fn format_number(n: f64) -> String {
    if n == 0.0 {
        // normalises -0
        return "0".to_string();
    }
    n.to_string()
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Entity(entity) => match entity.identity() {
                Some(id) => write!(f, "entity({id})"),
                None => write!(f, "entity"),
            },
            Self::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            other => match other.to_key() {
                Some(key) => write!(f, "{key}"),
                None => Ok(()),
            },
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_none(),
            Self::Boolean(b) => serializer.serialize_bool(*b),
            Self::Number(n) => {
                // Integral values serialise as JSON integers
                if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
                    serializer.serialize_i64(*n as i64)
                } else {
                    serializer.serialize_f64(*n)
                }
            }
            Self::String(s) => serializer.serialize_str(s),
            Self::Date(d) => serializer.serialize_str(&d.format("%Y-%m-%d").to_string()),
            Self::DateTime(dt) => serializer.serialize_str(&dt.to_rfc3339()),
            Self::Entity(entity) => {
                let mut map = serializer.serialize_map(Some(entity.len()))?;
                for (name, value) in entity.attributes() {
                    map.serialize_entry(name, value)?;
                }
                map.end()
            }
            Self::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(value: DateTime<FixedOffset>) -> Self {
        Self::DateTime(value)
    }
}

impl From<Entity> for Value {
    fn from(value: Entity) -> Self {
        Self::Entity(Arc::new(value))
    }
}

impl From<Arc<Entity>> for Value {
    fn from(value: Arc<Entity>) -> Self {
        Self::Entity(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(values: Vec<Value>) -> Self {
        Self::List(values)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_number_formatting() {
        assert_eq!(format_number(18.0), "18");
        assert_eq!(format_number(1.5), "1.5");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(Value::Number(75.0).to_key().as_deref(), Some("75"));
    }

    #[test]
    fn test_from_json_builds_entities_and_lists() {
        let value = Value::from_json(
            &json!({"_idValue": 1, "name": "Chocolate chip", "tags": ["a", null]}),
            "_idValue",
        );
        let Value::Entity(entity) = value else {
            panic!("expected entity");
        };
        assert_eq!(entity.identity(), Some(&Value::Number(1.0)));
        assert_eq!(
            entity.get("tags"),
            Some(&Value::List(vec![Value::from("a"), Value::Null]))
        );
    }

    #[test]
    fn test_serialize_to_json() {
        let value = Value::List(vec![
            Value::Number(1.0),
            Value::Number(1.5),
            Value::Date(NaiveDate::from_ymd_opt(2015, 1, 1).unwrap()),
            Value::Null,
        ]);
        assert_eq!(
            serde_json::to_value(&value).unwrap(),
            json!([1, 1.5, "2015-01-01", null])
        );
    }
}
