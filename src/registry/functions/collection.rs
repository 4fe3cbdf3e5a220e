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

//! map(callback) - element-wise transform of list values

use crate::model::MagmaValue;

impl MagmaValue {
    /// Apply `f` to each element of a list, in order
    ///
    /// Each element is passed already wrapped so the callback can chain
    /// operators on it, and each result is wrapped again. Non-list values
    /// yield absent.
    pub fn map<F, T>(&self, mut f: F) -> MagmaValue
    where
        F: FnMut(MagmaValue) -> T,
        T: Into<MagmaValue>,
    {
        match self.try_map(|item| Ok::<_, std::convert::Infallible>(f(item))) {
            Ok(mapped) => mapped,
            Err(never) => match never {},
        }
    }

    /// Fallible form of [`MagmaValue::map`]; stops at the first error
    pub fn try_map<F, T, E>(&self, mut f: F) -> Result<MagmaValue, E>
    where
        F: FnMut(MagmaValue) -> Result<T, E>,
        T: Into<MagmaValue>,
    {
        let Some(items) = self.as_list() else {
            return Ok(MagmaValue::Absent);
        };
        let mapped = items
            .iter()
            .map(|item| f(item.clone()).map(Into::into))
            .collect::<Result<Vec<MagmaValue>, E>>()?;
        Ok(MagmaValue::List(mapped))
    }
}
