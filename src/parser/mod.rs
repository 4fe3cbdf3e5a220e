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

//! Expression parser
//!
//! Converts expression text into an [`ExpressionNode`](crate::ast::ExpressionNode)
//! tree. All structural checks happen here: unknown operators, wrong
//! arities and misplaced callbacks are rejected before anything is
//! evaluated.

#![warn(missing_docs)]

pub mod error;
pub mod pratt;
pub mod span;
pub mod tokenizer;

pub use error::{ParseError, ParseResult};
pub use pratt::{MAX_NESTING_DEPTH, parse_expression_pratt};
pub use span::Spanned;

use crate::ast::ExpressionNode;
use crate::error::Result;

/// Parse expression text into an AST
pub fn parse(input: &str) -> ParseResult<ExpressionNode> {
    parse_expression_pratt(input)
}

/// Parse expression text, reporting failures as crate errors with a snippet
pub fn parse_with_context(input: &str) -> Result<ExpressionNode> {
    parse(input).map_err(|err| {
        log::debug!("failed to parse expression: {err}");
        err.into_magma_error(input)
    })
}
