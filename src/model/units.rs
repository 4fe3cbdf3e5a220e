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

//! Unit conversion table
//!
//! Conversions are driven by a read-only `(from, to) -> multiplier` table.
//! Multipliers are decimals, so factors such as `0.01` apply exactly and the
//! result does not depend on locale or float rounding of the factor itself.

use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::error::{MagmaError, Result};

/// A single conversion rule as written in configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UnitRule {
    /// Source unit
    pub from: String,
    /// Target unit
    pub to: String,
    /// Multiplier applied to a value in `from` to express it in `to`
    pub factor: f64,
}

/// Read-only table of unit conversion multipliers
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(try_from = "Vec<UnitRule>")]
pub struct UnitTable {
    rules: FxHashMap<(String, String), Decimal>,
}

/// Built-in dimensions as (unit, multiplier to the dimension's base unit)
const BUILTIN_DIMENSIONS: &[&[(&str, i64, u32)]] = &[
    // length, base m
    &[
        ("m", 1, 0),
        ("cm", 1, 2),
        ("mm", 1, 3),
        ("km", 1000, 0),
        ("in", 254, 4),
        ("ft", 3048, 4),
    ],
    // mass, base kg
    &[
        ("kg", 1, 0),
        ("g", 1, 3),
        ("mg", 1, 6),
        ("lb", 45_359_237, 8),
    ],
    // volume, base l
    &[("l", 1, 0), ("dl", 1, 1), ("ml", 1, 3)],
    // time, base s
    &[("s", 1, 0), ("min", 60, 0), ("h", 3600, 0), ("d", 86_400, 0)],
];

static BUILTIN_TABLE: Lazy<UnitTable> = Lazy::new(|| {
    let mut table = UnitTable::new();
    for dimension in BUILTIN_DIMENSIONS {
        for &(from, from_num, from_scale) in dimension.iter() {
            for &(to, to_num, to_scale) in dimension.iter() {
                if from == to {
                    continue;
                }
                let factor = Decimal::new(from_num, from_scale) / Decimal::new(to_num, to_scale);
                table.rules.insert((from.to_string(), to.to_string()), factor);
            }
        }
    }
    table
});

impl UnitTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in table covering common length, mass, volume and time units
    pub fn builtin() -> Self {
        BUILTIN_TABLE.clone()
    }

    /// Load rules from a JSON list of `{"from", "to", "factor"}` objects
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| MagmaError::UnitConfig {
            message: e.to_string(),
        })
    }

    /// Register a rule; the inverse rule is derived automatically
    pub fn insert(&mut self, from: impl Into<String>, to: impl Into<String>, factor: Decimal) {
        let from = from.into();
        let to = to.into();
        if !factor.is_zero() {
            self.rules
                .insert((to.clone(), from.clone()), Decimal::ONE / factor);
        }
        self.rules.insert((from, to), factor);
    }

    /// Add all rules of `other`, replacing existing rules for the same pair
    pub fn merge(&mut self, other: &UnitTable) {
        for (key, factor) in &other.rules {
            self.rules.insert(key.clone(), *factor);
        }
    }

    /// Look up the multiplier between two units
    pub fn factor(&self, from: &str, to: &str) -> Option<Decimal> {
        if from == to {
            return Some(Decimal::ONE);
        }
        self.rules.get(&(from.to_string(), to.to_string())).copied()
    }

    /// Check whether a conversion rule exists
    pub fn supports(&self, from: &str, to: &str) -> bool {
        self.factor(from, to).is_some()
    }

    /// Number of rules, inverses included
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if the table has no rules
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Convert `value` from one unit to another
    pub fn convert(&self, value: f64, from: &str, to: &str) -> Result<f64> {
        let factor = self
            .factor(from, to)
            .ok_or_else(|| MagmaError::unsupported_conversion(Some(from), to))?;

        // Decimal arithmetic when the magnitude fits, plain floats otherwise
        let exact = Decimal::from_f64(value)
            .and_then(|v| v.checked_mul(factor))
            .and_then(|v| v.to_f64());
        Ok(exact.unwrap_or_else(|| value * factor.to_f64().unwrap_or(f64::NAN)))
    }
}

impl TryFrom<Vec<UnitRule>> for UnitTable {
    type Error = MagmaError;

    fn try_from(rules: Vec<UnitRule>) -> Result<Self> {
        let mut table = UnitTable::new();
        for rule in rules {
            let factor = Decimal::from_f64(rule.factor)
                .filter(|f| !f.is_zero())
                .ok_or_else(|| MagmaError::UnitConfig {
                    message: format!(
                        "invalid factor {} for {} -> {}",
                        rule.factor, rule.from, rule.to
                    ),
                })?;
            table.insert(rule.from, rule.to, factor);
        }
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_length_conversions() {
        let table = UnitTable::builtin();
        assert_eq!(table.convert(180.0, "cm", "m").unwrap(), 1.8);
        assert_eq!(table.convert(1.8, "m", "cm").unwrap(), 180.0);
        assert_eq!(table.convert(2.0, "km", "m").unwrap(), 2000.0);
        assert_eq!(table.convert(1.0, "ft", "in").unwrap(), 12.0);
    }

    #[test]
    fn test_same_unit_is_identity() {
        let table = UnitTable::new();
        assert_eq!(table.convert(3.5, "kg", "kg").unwrap(), 3.5);
    }

    #[test]
    fn test_missing_rule_is_unsupported() {
        let err = UnitTable::builtin().convert(1.0, "kg", "m").unwrap_err();
        assert_eq!(
            err,
            MagmaError::UnsupportedConversion {
                from: "kg".to_string(),
                to: "m".to_string()
            }
        );
    }

    #[test]
    fn test_insert_derives_inverse() {
        let mut table = UnitTable::new();
        table.insert("stone", "lb", Decimal::new(14, 0));
        assert_eq!(table.convert(2.0, "stone", "lb").unwrap(), 28.0);
        assert_eq!(table.convert(28.0, "lb", "stone").unwrap(), 2.0);
    }

    #[test]
    fn test_merge_adds_and_replaces_rules() {
        let mut table = UnitTable::builtin();
        let before = table.len();

        let mut custom = UnitTable::new();
        custom.insert("stone", "lb", Decimal::new(14, 0));
        custom.insert("in", "cm", Decimal::new(25, 1));
        table.merge(&custom);

        assert!(table.supports("stone", "lb"));
        assert!(table.supports("lb", "stone"));
        assert_eq!(table.factor("in", "cm"), Some(Decimal::new(25, 1)));
        assert_eq!(table.factor("cm", "m"), Some(Decimal::new(1, 2)));
        assert_eq!(table.len(), before + 2);
    }

    #[test]
    fn test_from_json_str() {
        let table = UnitTable::from_json_str(r#"[{"from": "mmHg", "to": "kPa", "factor": 0.1333}]"#)
            .unwrap();
        assert_eq!(table.len(), 2);
        assert!(table.supports("kPa", "mmHg"));

        let err = UnitTable::from_json_str(r#"[{"from": "a", "to": "b", "factor": 0}]"#)
            .unwrap_err();
        assert!(matches!(err, MagmaError::UnitConfig { .. }));
    }
}
