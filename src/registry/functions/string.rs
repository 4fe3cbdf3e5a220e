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

//! String and presence tests: matches, isValidJson, isNull

use regex::{Regex, RegexBuilder};

use crate::error::{MagmaError, Result};
use crate::model::{MagmaValue, Scalar};

/// Compile a pattern with literal-style flags (`i`, `m`, `s`, `x`)
///
/// `g`, `u` and `y` are accepted and have no effect on a match test.
pub fn build_regex(pattern: &str, flags: &str) -> Result<Regex> {
    let mut builder = RegexBuilder::new(pattern);
    for flag in flags.chars() {
        match flag {
            'i' => builder.case_insensitive(true),
            'm' => builder.multi_line(true),
            's' => builder.dot_matches_new_line(true),
            'x' => builder.ignore_whitespace(true),
            'g' | 'u' | 'y' => &mut builder,
            other => {
                return Err(MagmaError::invalid_argument(
                    "matches",
                    format!("unsupported regex flag '{other}'"),
                ));
            }
        };
    }
    builder
        .build()
        .map_err(|e| MagmaError::invalid_argument("matches", format!("invalid regex: {e}")))
}

impl MagmaValue {
    /// Test the unwrapped value against a regex; absent is false
    pub fn matches(&self, regex: &Regex) -> MagmaValue {
        let matched = match self {
            MagmaValue::Scalar(Scalar::String(s)) => regex.is_match(s),
            MagmaValue::Scalar(scalar) => scalar
                .to_value()
                .to_key()
                .is_some_and(|text| regex.is_match(&text)),
            _ => false,
        };
        MagmaValue::from(matched)
    }

    /// Compile `pattern` and test the unwrapped value against it
    pub fn matches_pattern(&self, pattern: &str) -> Result<MagmaValue> {
        Ok(self.matches(&build_regex(pattern, "")?))
    }

    /// Whether the unwrapped string parses as JSON; absent is false
    pub fn is_valid_json(&self) -> MagmaValue {
        let valid = match self {
            MagmaValue::Scalar(Scalar::String(s)) => {
                serde_json::from_str::<serde_json::Value>(s).is_ok()
            }
            // numbers and booleans serialise to themselves
            MagmaValue::Scalar(Scalar::Number(n)) => n.is_finite(),
            MagmaValue::Scalar(Scalar::Boolean(_)) => true,
            _ => false,
        };
        MagmaValue::from(valid)
    }

    /// Whether the value is absent
    pub fn is_null(&self) -> MagmaValue {
        MagmaValue::from(self.is_absent())
    }
}
