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

//! Tagged evaluation result

use crate::model::{MagmaValue, Value};

/// Outcome of evaluating an expression
///
/// An expression whose outermost call is `value()`, a strict comparison or
/// a bare literal yields [`EvaluationResult::Raw`]; everything else yields
/// the wrapped value so callers can keep chaining.
#[derive(Debug, Clone, PartialEq)]
pub enum EvaluationResult {
    /// Unwrapped scalar, boolean, list or entity
    Raw(Value),
    /// Wrapped value, possibly absent
    Wrapped(MagmaValue),
}

impl EvaluationResult {
    /// Check whether this is a raw result
    pub fn is_raw(&self) -> bool {
        matches!(self, Self::Raw(_))
    }

    /// Get the raw value, if this is a raw result
    pub fn as_raw(&self) -> Option<&Value> {
        match self {
            Self::Raw(value) => Some(value),
            Self::Wrapped(_) => None,
        }
    }

    /// Get the wrapped value, if this is a wrapped result
    pub fn as_wrapped(&self) -> Option<&MagmaValue> {
        match self {
            Self::Raw(_) => None,
            Self::Wrapped(value) => Some(value),
        }
    }

    /// Unwrap into a raw value; wrapped results go through `value()`
    pub fn into_value(self) -> Value {
        match self {
            Self::Raw(value) => value,
            Self::Wrapped(value) => value.value(),
        }
    }

    /// Wrap into a wrapped value; raw results are wrapped as-is
    pub fn into_wrapped(self) -> MagmaValue {
        match self {
            Self::Raw(value) => MagmaValue::from(value),
            Self::Wrapped(value) => value,
        }
    }

    /// Render the unwrapped result as JSON
    ///
    /// Absent values and non-finite numbers render as `null`.
    pub fn to_json(&self) -> serde_json::Value {
        let value = match self {
            Self::Raw(value) => serde_json::to_value(value),
            Self::Wrapped(value) => serde_json::to_value(value.value()),
        };
        value.unwrap_or(serde_json::Value::Null)
    }
}

impl From<Value> for EvaluationResult {
    fn from(value: Value) -> Self {
        Self::Raw(value)
    }
}

impl From<MagmaValue> for EvaluationResult {
    fn from(value: MagmaValue) -> Self {
        Self::Wrapped(value)
    }
}
