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

//! MagmaScript expression language in Rust
//!
//! A small, chainable expression language for computing derived fields over
//! entity records. An expression starts from an attribute accessor such as
//! `$('dob')` and chains operators on the wrapped value:
//!
//! ```
//! use magma_script::{Entity, MagmaEngine, Value};
//!
//! let engine = MagmaEngine::new();
//! let entity = Entity::new().with_attribute("height", 180);
//! let result = engine
//!     .evaluate("$('height').unit('cm').toUnit('m').value()", &entity)
//!     .unwrap();
//! assert_eq!(result.into_value(), Value::Number(1.8));
//! ```
//!
//! Missing data is not an error. An absent attribute flows through every
//! operator and comes out as `null`.

pub mod ast;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod model;
pub mod parser;
pub mod registry;

// Re-export main types
pub use ast::ExpressionNode;
pub use engine::{CompiledExpression, EngineConfig, MagmaEngine};
pub use error::{MagmaError, Result};
pub use evaluator::{EvaluationContext, EvaluationResult};
pub use model::{Entity, MagmaValue, Quantity, UnitTable, Value};
pub use parser::ParseError;
pub use registry::Operator;

/// Parse an expression without evaluating it
pub fn parse(expression: &str) -> Result<ExpressionNode> {
    parser::parse_with_context(expression)
}

/// Evaluate an expression against one entity with the default engine
pub fn evaluate(expression: &str, entity: &Entity) -> Result<EvaluationResult> {
    MagmaEngine::new().evaluate(expression, entity)
}
