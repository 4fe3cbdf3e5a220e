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

//! Attribute path resolution against an entity graph
//!
//! A path is a dot-separated sequence of attribute names. Resolution walks
//! nested references left to right and yields an absent value as soon as a
//! segment is missing or null. Lists are leaves: segments after a list are
//! not applied.

use smallvec::SmallVec;

use super::entity::Entity;
use super::value::Value;
use super::wrapped::MagmaValue;
use crate::error::{MagmaError, Result};

/// Split a path into its segments, rejecting empty paths and empty segments
pub fn parse_path(path: &str) -> Result<SmallVec<[&str; 4]>> {
    validate_path(path)?;
    Ok(path.split('.').collect())
}

/// Check that a path is non-empty and has no empty segments
pub fn validate_path(path: &str) -> Result<()> {
    if path.is_empty() || path.split('.').any(str::is_empty) {
        return Err(MagmaError::InvalidPath {
            path: path.to_string(),
        });
    }
    Ok(())
}

/// Resolve `path` against `entity`
pub fn resolve(entity: &Entity, path: &str) -> Result<MagmaValue> {
    let segments = parse_path(path)?;
    let mut current = entity;

    for (index, segment) in segments.iter().enumerate() {
        let is_last = index + 1 == segments.len();
        match current.get(segment) {
            None | Some(Value::Null) => {
                log::trace!("path '{path}' stops at missing segment '{segment}'");
                return Ok(MagmaValue::Absent);
            }
            Some(Value::Entity(child)) if !is_last => current = child.as_ref(),
            Some(list @ Value::List(_)) => return Ok(MagmaValue::from(list)),
            Some(value) if is_last => return Ok(MagmaValue::from(value)),
            Some(value) => {
                log::trace!(
                    "path '{path}' cannot descend into {} at '{segment}'",
                    value.type_name()
                );
                return Ok(MagmaValue::Absent);
            }
        }
    }

    Ok(MagmaValue::Absent)
}
