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

//! Logical operators: and, or, not

use crate::model::MagmaValue;

impl MagmaValue {
    /// Logical AND; absent counts as false
    pub fn and(&self, other: impl Into<MagmaValue>) -> MagmaValue {
        MagmaValue::from(self.is_truthy() && other.into().is_truthy())
    }

    /// Logical OR; absent counts as false
    pub fn or(&self, other: impl Into<MagmaValue>) -> MagmaValue {
        MagmaValue::from(self.is_truthy() || other.into().is_truthy())
    }

    /// Logical negation; absent stays absent
    #[allow(clippy::should_implement_trait)]
    pub fn not(&self) -> MagmaValue {
        if self.is_absent() {
            return MagmaValue::Absent;
        }
        MagmaValue::from(!self.is_truthy())
    }
}
