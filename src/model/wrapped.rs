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

//! The wrapped value: operand and result type of every operator
//!
//! A [`MagmaValue`] holds exactly one of absent, scalar, entity reference or
//! list. It is immutable; every operator returns a new value. Operators live
//! in [`crate::registry`], split by family.

use chrono::{DateTime, FixedOffset, NaiveDate};
use std::sync::Arc;

use super::accessor;
use super::entity::Entity;
use super::quantity::Quantity;
use super::value::Value;
use crate::error::Result;

/// Scalar payload of a wrapped value
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// Boolean value
    Boolean(bool),
    /// Numeric value
    Number(f64),
    /// String value
    String(String),
    /// Calendar date
    Date(NaiveDate),
    /// Date and time with offset
    DateTime(DateTime<FixedOffset>),
    /// Number tagged with a unit
    Quantity(Quantity),
}

impl Scalar {
    /// Unwrap into a raw value; quantities lose their unit tag
    pub fn to_value(&self) -> Value {
        match self {
            Self::Boolean(b) => Value::Boolean(*b),
            Self::Number(n) => Value::Number(*n),
            Self::String(s) => Value::String(s.clone()),
            Self::Date(d) => Value::Date(*d),
            Self::DateTime(dt) => Value::DateTime(*dt),
            Self::Quantity(q) => Value::Number(q.value),
        }
    }
}

/// Discriminant of a wrapped value, assigned at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// No value
    Absent,
    /// Boolean, number, string, date or quantity
    Scalar,
    /// Nested entity
    Reference,
    /// Ordered list
    List,
}

/// Immutable wrapped value with chainable operators
#[derive(Debug, Clone, Default)]
pub enum MagmaValue {
    /// No value; propagates through operators
    #[default]
    Absent,
    /// Scalar value
    Scalar(Scalar),
    /// Entity reference
    Reference(Arc<Entity>),
    /// List of wrapped elements
    List(Vec<MagmaValue>),
}

impl MagmaValue {
    /// Wrap a raw value
    ///
    /// Wrapping is idempotent: wrapping a `MagmaValue` returns it unchanged.
    pub fn wrap(raw: impl Into<MagmaValue>) -> Self {
        raw.into()
    }

    /// Create a number tagged with a unit
    pub fn quantity(value: f64, unit: impl Into<String>) -> Self {
        Self::Scalar(Scalar::Quantity(Quantity::new(value, unit)))
    }

    /// The explicit discriminant of this value
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Absent => ValueKind::Absent,
            Self::Scalar(_) => ValueKind::Scalar,
            Self::Reference(_) => ValueKind::Reference,
            Self::List(_) => ValueKind::List,
        }
    }

    /// Check if the value is absent
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Unwrap the payload
    ///
    /// References unwrap to their identity when they have one. Lists unwrap
    /// to their elements as they are, without identity substitution.
    pub fn value(&self) -> Value {
        match self {
            Self::Reference(entity) => entity
                .identity()
                .cloned()
                .unwrap_or_else(|| Value::Entity(Arc::clone(entity))),
            other => other.to_raw(),
        }
    }

    /// Convert back to the raw value without identity substitution
    pub fn to_raw(&self) -> Value {
        match self {
            Self::Absent => Value::Null,
            Self::Scalar(scalar) => scalar.to_value(),
            Self::Reference(entity) => Value::Entity(Arc::clone(entity)),
            Self::List(items) => Value::List(items.iter().map(MagmaValue::to_raw).collect()),
        }
    }

    /// Resolve an attribute path on a reference
    ///
    /// Non-reference values resolve to absent.
    pub fn attr(&self, name: &str) -> Result<MagmaValue> {
        accessor::validate_path(name)?;
        match self {
            Self::Reference(entity) => accessor::resolve(entity, name),
            _ => Ok(Self::Absent),
        }
    }

    /// Unit tag carried by the value, if any
    pub fn unit_name(&self) -> Option<&str> {
        match self {
            Self::Scalar(Scalar::Quantity(q)) => Some(&q.unit),
            _ => None,
        }
    }

    /// Numeric payload, looking through unit tags
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Scalar(Scalar::Number(n)) => Some(*n),
            Self::Scalar(Scalar::Quantity(q)) => Some(q.value),
            _ => None,
        }
    }

    /// String payload
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Scalar(Scalar::String(s)) => Some(s),
            _ => None,
        }
    }

    /// List elements
    pub fn as_list(&self) -> Option<&[MagmaValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Truthiness used by the logical operators; absent is false
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Absent => false,
            Self::Scalar(Scalar::Boolean(b)) => *b,
            Self::Scalar(Scalar::Number(n)) => *n != 0.0 && !n.is_nan(),
            Self::Scalar(Scalar::Quantity(q)) => q.value != 0.0 && !q.value.is_nan(),
            Self::Scalar(Scalar::String(s)) => !s.is_empty(),
            Self::Scalar(Scalar::Date(_) | Scalar::DateTime(_)) => true,
            Self::Reference(_) | Self::List(_) => true,
        }
    }
}

/// Structural equality of the unwrapped payloads
impl PartialEq for MagmaValue {
    fn eq(&self, other: &Self) -> bool {
        self.value() == other.value()
    }
}

impl From<Value> for MagmaValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Absent,
            Value::Boolean(b) => Self::Scalar(Scalar::Boolean(b)),
            Value::Number(n) => Self::Scalar(Scalar::Number(n)),
            Value::String(s) => Self::Scalar(Scalar::String(s)),
            Value::Date(d) => Self::Scalar(Scalar::Date(d)),
            Value::DateTime(dt) => Self::Scalar(Scalar::DateTime(dt)),
            Value::Entity(entity) => Self::Reference(entity),
            Value::List(items) => Self::List(items.into_iter().map(MagmaValue::from).collect()),
        }
    }
}

impl From<&Value> for MagmaValue {
    fn from(value: &Value) -> Self {
        Self::from(value.clone())
    }
}

impl From<Scalar> for MagmaValue {
    fn from(scalar: Scalar) -> Self {
        Self::Scalar(scalar)
    }
}

impl From<Quantity> for MagmaValue {
    fn from(quantity: Quantity) -> Self {
        Self::Scalar(Scalar::Quantity(quantity))
    }
}

impl From<Vec<MagmaValue>> for MagmaValue {
    fn from(items: Vec<MagmaValue>) -> Self {
        Self::List(items)
    }
}

macro_rules! wrap_via_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for MagmaValue {
                fn from(raw: $ty) -> Self {
                    Self::from(Value::from(raw))
                }
            }
        )*
    };
}

wrap_via_value!(
    bool,
    f64,
    i64,
    i32,
    &str,
    String,
    NaiveDate,
    DateTime<FixedOffset>,
    Entity,
    Arc<Entity>,
    Vec<Value>,
);

impl<T: Into<MagmaValue>> From<Option<T>> for MagmaValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Absent, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn cookie() -> Entity {
        Entity::new()
            .with_identity(1)
            .with_attribute("id", 1)
            .with_attribute("name", "Chocolate chip")
    }

    #[test]
    fn test_wrap_classifies_raw_values() {
        assert_eq!(MagmaValue::wrap(Value::Null).kind(), ValueKind::Absent);
        assert_eq!(MagmaValue::wrap(3).kind(), ValueKind::Scalar);
        assert_eq!(MagmaValue::wrap(cookie()).kind(), ValueKind::Reference);
        assert_eq!(
            MagmaValue::wrap(vec![Value::from(1), Value::from(2)]).kind(),
            ValueKind::List
        );
    }

    #[test]
    fn test_wrap_is_idempotent() {
        let once = MagmaValue::wrap("abc");
        let twice = MagmaValue::wrap(once.clone());
        assert_eq!(once, twice);
        assert_eq!(twice.kind(), ValueKind::Scalar);
    }

    #[test]
    fn test_value_substitutes_identity() {
        assert_eq!(MagmaValue::wrap(cookie()).value(), Value::Number(1.0));

        let anonymous = Entity::new().with_attribute("name", "x");
        assert_eq!(
            MagmaValue::wrap(anonymous.clone()).value(),
            Value::Entity(Arc::new(anonymous))
        );
    }

    #[test]
    fn test_list_value_keeps_elements() {
        let list = MagmaValue::wrap(vec![Value::from(cookie()), Value::from(2)]);
        assert_eq!(
            list.value(),
            Value::List(vec![Value::from(cookie()), Value::Number(2.0)])
        );
    }

    #[test]
    fn test_quantity_unwraps_to_number() {
        let height = MagmaValue::quantity(180.0, "cm");
        assert_eq!(height.value(), Value::Number(180.0));
        assert_eq!(height.unit_name(), Some("cm"));
    }

    #[test]
    fn test_attr_on_reference_and_scalars() {
        let value = MagmaValue::wrap(cookie());
        assert_eq!(value.attr("name").unwrap(), MagmaValue::wrap("Chocolate chip"));
        assert!(value.attr("missing").unwrap().is_absent());
        assert!(MagmaValue::wrap(3).attr("name").unwrap().is_absent());
        assert!(MagmaValue::Absent.attr("name").unwrap().is_absent());
        assert!(value.attr("").is_err());
    }
}
