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

//! unit() and toUnit() - unit tagging and conversion

use crate::error::{MagmaError, Result};
use crate::model::{MagmaValue, Quantity, Scalar, UnitTable};

impl MagmaValue {
    /// Tag the numeric value with a unit; no conversion takes place
    ///
    /// Non-numeric values yield absent.
    pub fn unit(&self, name: &str) -> MagmaValue {
        match self.as_number() {
            Some(value) => MagmaValue::from(Quantity::new(value, name)),
            None => MagmaValue::Absent,
        }
    }

    /// Convert to `name` using the built-in unit table
    pub fn to_unit(&self, name: &str) -> Result<MagmaValue> {
        self.to_unit_with(name, &UnitTable::builtin())
    }

    /// Convert to `name` using `table`
    ///
    /// Fails with `UnsupportedConversion` when the table has no rule between
    /// the current unit and the target. Absent stays absent.
    pub fn to_unit_with(&self, name: &str, table: &UnitTable) -> Result<MagmaValue> {
        match self {
            MagmaValue::Absent => Ok(MagmaValue::Absent),
            MagmaValue::Scalar(Scalar::Quantity(quantity)) => {
                Ok(MagmaValue::from(quantity.convert_to(name, table)?))
            }
            _ => Err(MagmaError::unsupported_conversion(None, name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Value;
    use rust_decimal::Decimal;

    #[test]
    fn test_unit_attaches_tag_only() {
        let tagged = MagmaValue::wrap(180).unit("cm");
        assert_eq!(tagged.value(), Value::Number(180.0));
        assert_eq!(tagged.unit_name(), Some("cm"));
        assert!(MagmaValue::wrap("tall").unit("cm").is_absent());
    }

    #[test]
    fn test_round_trip_conversion() {
        let metres = MagmaValue::wrap(180).unit("cm").to_unit("m").unwrap();
        assert_eq!(metres.value(), Value::Number(1.8));
        assert_eq!(metres.unit_name(), Some("m"));

        let back = metres.to_unit("cm").unwrap().as_number().unwrap();
        assert!((back - 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_unsupported_conversions() {
        let err = MagmaValue::wrap(3).unit("kg").to_unit("m").unwrap_err();
        assert_eq!(
            err,
            MagmaError::UnsupportedConversion {
                from: "kg".to_string(),
                to: "m".to_string()
            }
        );
        assert!(MagmaValue::wrap(3).to_unit("m").is_err());
        assert!(MagmaValue::Absent.to_unit("m").unwrap().is_absent());
    }

    #[test]
    fn test_custom_table() {
        let mut table = UnitTable::new();
        table.insert("cup", "ml", Decimal::new(250, 0));
        let ml = MagmaValue::wrap(2).unit("cup").to_unit_with("ml", &table).unwrap();
        assert_eq!(ml.value(), Value::Number(500.0));
    }
}
