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

//! Categorical operators: map(table, default?, null?) and group(thresholds)

use indexmap::IndexMap;

use crate::model::value::format_number;
use crate::model::{MagmaValue, Value};

/// Lookup table for categorical remapping, keyed by textual value
pub type CategoryTable = IndexMap<String, Value>;

impl MagmaValue {
    /// Remap the unwrapped value through `table`
    ///
    /// References are looked up by identity. Absent sources give `null_value`
    /// (or absent); unmapped sources give `default` (or absent).
    pub fn map_table(
        &self,
        table: &CategoryTable,
        default: Option<Value>,
        null_value: Option<Value>,
    ) -> MagmaValue {
        if self.is_absent() {
            return MagmaValue::from(null_value);
        }
        let mapped = self
            .value()
            .to_key()
            .and_then(|key| table.get(&key).cloned());
        MagmaValue::from(mapped.or(default))
    }

    /// Bin the numeric value into a labelled half-open interval
    ///
    /// Thresholds are sorted ascending. A value in `[t[i], t[i+1])` is
    /// labelled `"t[i]-t[i+1]"`, values at or above the last threshold
    /// `"last+"`, values below the first `"<first"`.
    pub fn group(&self, thresholds: &[f64]) -> MagmaValue {
        let Some(value) = self.as_number().filter(|v| !v.is_nan()) else {
            return MagmaValue::Absent;
        };

        let mut bounds: Vec<f64> = thresholds.iter().copied().filter(|t| !t.is_nan()).collect();
        bounds.sort_by(f64::total_cmp);
        bounds.dedup();

        let (Some(&first), Some(&last)) = (bounds.first(), bounds.last()) else {
            return MagmaValue::Absent;
        };

        let label = if value < first {
            format!("<{}", format_number(first))
        } else if value >= last {
            format!("{}+", format_number(last))
        } else {
            // first <= value < last, so a closing bound exists
            let upper = bounds.partition_point(|&t| t <= value);
            format!(
                "{}-{}",
                format_number(bounds[upper - 1]),
                format_number(bounds[upper])
            )
        };
        MagmaValue::from(label)
    }
}
