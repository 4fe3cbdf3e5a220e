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

//! Numbers tagged with a unit of measure

use std::fmt;

use super::units::UnitTable;
use super::value::format_number;
use crate::error::Result;

/// A numeric value carrying a unit tag
#[derive(Debug, Clone, PartialEq)]
pub struct Quantity {
    /// Numeric magnitude
    pub value: f64,
    /// Unit name, e.g. `cm`
    pub unit: String,
}

impl Quantity {
    /// Create a new quantity
    pub fn new(value: f64, unit: impl Into<String>) -> Self {
        Self {
            value,
            unit: unit.into(),
        }
    }

    /// Convert to another unit using the given table
    pub fn convert_to(&self, unit: &str, table: &UnitTable) -> Result<Quantity> {
        let value = table.convert(self.value, &self.unit, unit)?;
        Ok(Quantity::new(value, unit))
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", format_number(self.value), self.unit)
    }
}
