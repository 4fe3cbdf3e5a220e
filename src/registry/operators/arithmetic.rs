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

//! Arithmetic operators: plus, times, div, pow
//!
//! An absent operand on either side yields absent. A unit tag on the left
//! operand is carried over to the result.

use crate::model::{MagmaValue, Quantity, Scalar};

impl MagmaValue {
    /// Add a number, or concatenate when both sides are strings
    pub fn plus(&self, other: impl Into<MagmaValue>) -> MagmaValue {
        let other = other.into();
        if let (Some(left), Some(right)) = (self.as_str(), other.as_str()) {
            return MagmaValue::from(format!("{left}{right}"));
        }
        numeric(self, &other, |a, b| a + b)
    }

    /// Multiply by a number
    pub fn times(&self, other: impl Into<MagmaValue>) -> MagmaValue {
        numeric(self, &other.into(), |a, b| a * b)
    }

    /// Divide by a number
    #[allow(clippy::should_implement_trait)]
    pub fn div(&self, other: impl Into<MagmaValue>) -> MagmaValue {
        numeric(self, &other.into(), |a, b| a / b)
    }

    /// Raise to a power
    pub fn pow(&self, other: impl Into<MagmaValue>) -> MagmaValue {
        numeric(self, &other.into(), f64::powf)
    }
}

fn numeric(left: &MagmaValue, right: &MagmaValue, op: impl FnOnce(f64, f64) -> f64) -> MagmaValue {
    let (Some(a), Some(b)) = (left.as_number(), right.as_number()) else {
        return MagmaValue::Absent;
    };
    let result = op(a, b);
    match left.unit_name() {
        Some(unit) => MagmaValue::from(Quantity::new(result, unit)),
        None => MagmaValue::Scalar(Scalar::Number(result)),
    }
}
