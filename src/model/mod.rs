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

//! Data model and value types for expressions
//!
//! This module provides the entity data model supplied by the host, the
//! wrapped value type that carries operator results, attribute path
//! resolution, and the unit conversion table.

#![warn(missing_docs)]

pub mod accessor;
pub mod entity;
pub mod quantity;
pub mod units;
pub mod value;
pub mod wrapped;

pub use accessor::resolve;
pub use entity::{DEFAULT_IDENTITY_ATTRIBUTE, Entity};
pub use quantity::Quantity;
pub use units::{UnitRule, UnitTable};
pub use value::Value;
pub use wrapped::{MagmaValue, Scalar, ValueKind};
