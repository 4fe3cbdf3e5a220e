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

//! Operator registry
//!
//! The catalogue of chained operations an expression may call. Each family
//! is implemented as methods on [`crate::model::MagmaValue`]; [`Operator`]
//! names the catalogue for the parser and the evaluator.

#![warn(missing_docs)]

pub mod functions;
pub mod operators;
pub mod signature;

pub use functions::{CategoryTable, build_regex};
pub use operators::{compare_values, strict_equals};
pub use signature::{Operator, OperatorSignature};
