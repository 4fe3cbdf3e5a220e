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

//! Error types for expression compilation and evaluation
//!
//! Missing or null data is never an error: it flows through the operators as
//! an absent value. The variants here cover structural problems only.

use thiserror::Error;

/// Result type alias for expression operations
pub type Result<T> = std::result::Result<T, MagmaError>;

/// Errors surfaced to the host application
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MagmaError {
    /// Empty or malformed attribute path
    #[error("Invalid attribute path '{path}'")]
    InvalidPath {
        /// The offending path
        path: String,
    },

    /// No conversion rule exists between two units
    #[error("Unsupported unit conversion from '{from}' to '{to}'")]
    UnsupportedConversion {
        /// Unit carried by the value (`<none>` when untagged)
        from: String,
        /// Requested target unit
        to: String,
    },

    /// Malformed expression text
    #[error("Syntax error at position {position}: {message} (near `{snippet}`)")]
    ExpressionSyntax {
        /// Human-readable error message
        message: String,
        /// Byte offset in the expression text
        position: usize,
        /// Expression text around the failure
        snippet: String,
    },

    /// Chained call name outside the operator catalogue
    #[error("Unknown operator '{name}' at position {position}")]
    UnknownOperator {
        /// The unrecognised call name
        name: String,
        /// Byte offset in the expression text
        position: usize,
    },

    /// Operator received an argument of the wrong kind
    #[error("Invalid argument for '{operator}': {message}")]
    InvalidArgument {
        /// Operator name as written in expressions
        operator: String,
        /// Human-readable error message
        message: String,
    },

    /// Host-supplied data could not be turned into an entity
    #[error("Invalid entity: {message}")]
    InvalidEntity {
        /// Human-readable error message
        message: String,
    },

    /// Unit conversion table could not be loaded
    #[error("Unit table configuration error: {message}")]
    UnitConfig {
        /// Human-readable error message
        message: String,
    },
}

impl MagmaError {
    /// Create an invalid argument error
    pub fn invalid_argument(operator: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            operator: operator.into(),
            message: message.into(),
        }
    }

    /// Create an unsupported conversion error
    pub fn unsupported_conversion(from: Option<&str>, to: impl Into<String>) -> Self {
        Self::UnsupportedConversion {
            from: from.unwrap_or("<none>").to_string(),
            to: to.into(),
        }
    }

    /// Check whether this error was raised while parsing
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            Self::ExpressionSyntax { .. } | Self::UnknownOperator { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_carry_context() {
        let err = MagmaError::InvalidPath {
            path: "cookie..name".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid attribute path 'cookie..name'");

        let err = MagmaError::unsupported_conversion(None, "m");
        assert_eq!(
            err.to_string(),
            "Unsupported unit conversion from '<none>' to 'm'"
        );
        assert!(!err.is_parse_error());
    }
}
