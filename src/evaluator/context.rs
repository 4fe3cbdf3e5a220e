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

//! Evaluation context for expressions

use chrono::{DateTime, FixedOffset, Local};
use rustc_hash::FxHashMap;

use crate::model::{Entity, MagmaValue, UnitTable};

/// Context for evaluating one expression against one entity
#[derive(Debug, Clone)]
pub struct EvaluationContext<'a> {
    /// Entity bound to the `$` accessor
    pub entity: &'a Entity,

    /// Instant used by `age()`
    pub now: DateTime<FixedOffset>,

    /// Conversion rules consulted by `toUnit()`
    pub units: &'a UnitTable,

    /// Callback parameter bindings
    variables: FxHashMap<String, MagmaValue>,
}

impl<'a> EvaluationContext<'a> {
    /// Create a context evaluated at `now`
    pub fn new(entity: &'a Entity, units: &'a UnitTable, now: DateTime<FixedOffset>) -> Self {
        Self {
            entity,
            now,
            units,
            variables: FxHashMap::default(),
        }
    }

    /// Create a context evaluated at the current wall-clock time
    pub fn at_current_time(entity: &'a Entity, units: &'a UnitTable) -> Self {
        Self::new(entity, units, Local::now().fixed_offset())
    }

    /// Create a child context with one more variable bound
    pub fn with_variable(&self, name: impl Into<String>, value: MagmaValue) -> Self {
        let mut child = self.clone();
        child.variables.insert(name.into(), value);
        child
    }

    /// Get a variable from the context
    pub fn get_variable(&self, name: &str) -> Option<&MagmaValue> {
        self.variables.get(name)
    }
}
