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

//! Parser error types

use std::borrow::Cow;

use thiserror::Error;

use super::span::snippet;
use crate::error::MagmaError;

/// Result type for parser operations
pub type ParseResult<T> = Result<T, ParseError>;

/// Parse error with location information
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// Unexpected token
    #[error("Unexpected token {token} at position {position}, expected {expected}")]
    UnexpectedToken {
        /// The unexpected token that was found
        token: Cow<'static, str>,
        /// What the parser was looking for
        expected: Cow<'static, str>,
        /// Position where the token was found
        position: usize,
    },

    /// Unexpected end of input
    #[error("Unexpected end of input, expected {expected}")]
    UnexpectedEof {
        /// What the parser was looking for
        expected: Cow<'static, str>,
        /// Length of the input
        position: usize,
    },

    /// Unexpected character
    #[error("Unexpected character '{character}' at position {position}")]
    UnexpectedCharacter {
        /// The offending character
        character: char,
        /// Position of the character
        position: usize,
    },

    /// Unclosed string literal
    #[error("Unclosed string literal starting at position {position}")]
    UnclosedString {
        /// Position where the unclosed string started
        position: usize,
    },

    /// Unclosed regex literal
    #[error("Unclosed regex literal starting at position {position}")]
    UnclosedRegex {
        /// Position where the unclosed regex started
        position: usize,
    },

    /// Unclosed block comment
    #[error("Unclosed comment starting at position {position}")]
    UnclosedComment {
        /// Position where the comment started
        position: usize,
    },

    /// Invalid escape sequence
    #[error("Invalid escape sequence at position {position}: {sequence}")]
    InvalidEscape {
        /// The invalid escape sequence
        sequence: String,
        /// Position where the escape sequence was found
        position: usize,
    },

    /// Malformed number literal
    #[error("Invalid number literal at position {position}: {value}")]
    InvalidNumber {
        /// The literal text
        value: String,
        /// Position of the literal
        position: usize,
    },

    /// Regex literal that does not compile
    #[error("Invalid regex literal at position {position}: {message}")]
    InvalidRegex {
        /// Compiler message
        message: String,
        /// Position of the literal
        position: usize,
    },

    /// Chained call outside the operator catalogue
    #[error("Unknown operator '{name}' at position {position}")]
    UnknownOperator {
        /// The call name
        name: String,
        /// Position of the call name
        position: usize,
    },

    /// Bare identifier that is not a callback parameter in scope
    #[error("Unknown identifier '{name}' at position {position}")]
    UnknownIdentifier {
        /// The identifier
        name: String,
        /// Position of the identifier
        position: usize,
    },

    /// Operator called with the wrong number of arguments
    #[error("'{operator}' takes {expected} argument(s), found {found} at position {position}")]
    InvalidArity {
        /// Operator name
        operator: &'static str,
        /// Accepted arity
        expected: String,
        /// Arguments supplied
        found: usize,
        /// Position of the call name
        position: usize,
    },

    /// Brackets, groups, callbacks and chained calls nested past the limit
    #[error("Expression nests deeper than {limit} levels at position {position}")]
    NestingTooDeep {
        /// Deepest nesting accepted
        limit: usize,
        /// Position where the limit was crossed
        position: usize,
    },

    /// Callback used anywhere but as the single argument of `map`
    #[error("Callbacks are only allowed as the argument of map() (position {position})")]
    MisplacedCallback {
        /// Position of the callback
        position: usize,
    },
}

impl ParseError {
    /// Byte offset the error refers to
    pub fn position(&self) -> usize {
        match self {
            ParseError::UnexpectedToken { position, .. }
            | ParseError::UnexpectedEof { position, .. }
            | ParseError::UnexpectedCharacter { position, .. }
            | ParseError::UnclosedString { position }
            | ParseError::UnclosedRegex { position }
            | ParseError::UnclosedComment { position }
            | ParseError::InvalidEscape { position, .. }
            | ParseError::InvalidNumber { position, .. }
            | ParseError::InvalidRegex { position, .. }
            | ParseError::UnknownOperator { position, .. }
            | ParseError::UnknownIdentifier { position, .. }
            | ParseError::NestingTooDeep { position, .. }
            | ParseError::InvalidArity { position, .. }
            | ParseError::MisplacedCallback { position } => *position,
        }
    }

    /// Convert into the public error, attaching a snippet of `source`
    pub fn into_magma_error(self, source: &str) -> MagmaError {
        match self {
            ParseError::UnknownOperator { name, position } => {
                MagmaError::UnknownOperator { name, position }
            }
            other => {
                let position = other.position();
                MagmaError::ExpressionSyntax {
                    message: other.to_string(),
                    position,
                    snippet: snippet(source, position).to_string(),
                }
            }
        }
    }
}
