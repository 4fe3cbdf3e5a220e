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

//! Expression AST node definitions

use regex::Regex;
use smallvec::SmallVec;

use super::operator::BinaryOperator;
use crate::registry::Operator;

/// AST representation of an expression
///
/// Large variants are boxed to keep the enum small.
#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionNode {
    /// Scalar literal
    Literal(LiteralValue),

    /// Array literal, e.g. `[18, 35, 50]`
    Array(Vec<ExpressionNode>),

    /// Object literal, e.g. `{0: 1, 'm': 'Male'}`; keys in source order
    Object(Vec<(String, ExpressionNode)>),

    /// Regex literal, e.g. `/^[a-z]+$/i`
    Regex(Box<RegexLiteral>),

    /// Attribute lookup on the evaluated entity: `$(path)`
    Accessor(Box<ExpressionNode>),

    /// Callback parameter reference
    Variable(String),

    /// Chained operator call (boxed for size optimization)
    MethodCall(Box<MethodCallData>),

    /// Single-parameter callback, only valid as the argument of `map`
    Lambda(Box<LambdaData>),

    /// Raw infix comparison (boxed for size optimization)
    BinaryOp(Box<BinaryOpData>),
}

/// Literal scalar values
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    /// `null` or `undefined`
    Null,
    /// `true` or `false`
    Boolean(bool),
    /// Numeric literal
    Number(f64),
    /// String literal with escapes resolved
    String(String),
}

/// A regex literal compiled at parse time
#[derive(Debug, Clone)]
pub struct RegexLiteral {
    /// Pattern text between the slashes
    pub source: String,
    /// Flags after the closing slash
    pub flags: String,
    /// Compiled pattern
    pub regex: Regex,
}

impl PartialEq for RegexLiteral {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source && self.flags == other.flags
    }
}

/// Method call data (separate struct to optimize enum size)
#[derive(Debug, Clone, PartialEq)]
pub struct MethodCallData {
    /// Receiver expression
    pub base: ExpressionNode,
    /// Catalogue operator being invoked
    pub operator: Operator,
    /// Call arguments (SmallVec for the common case of up to 4 args)
    pub args: SmallVec<[ExpressionNode; 4]>,
    /// Byte offset of the operator name
    pub position: usize,
}

/// Lambda expression data
#[derive(Debug, Clone, PartialEq)]
pub struct LambdaData {
    /// Parameter name
    pub param: String,
    /// Callback body
    pub body: ExpressionNode,
}

/// Binary operation data (separate struct to optimize enum size)
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryOpData {
    /// The operator
    pub op: BinaryOperator,
    /// Left operand
    pub left: ExpressionNode,
    /// Right operand
    pub right: ExpressionNode,
}

impl ExpressionNode {
    /// Create a literal expression
    pub fn literal(value: LiteralValue) -> Self {
        Self::Literal(value)
    }

    /// Create a string literal expression
    pub fn string(value: impl Into<String>) -> Self {
        Self::Literal(LiteralValue::String(value.into()))
    }

    /// Create a number literal expression
    pub fn number(value: f64) -> Self {
        Self::Literal(LiteralValue::Number(value))
    }

    /// Create an accessor expression
    pub fn accessor(path: ExpressionNode) -> Self {
        Self::Accessor(Box::new(path))
    }

    /// Create a variable reference
    pub fn variable(name: impl Into<String>) -> Self {
        Self::Variable(name.into())
    }

    /// Create a method call expression
    pub fn method_call(
        base: ExpressionNode,
        operator: Operator,
        args: impl Into<SmallVec<[ExpressionNode; 4]>>,
        position: usize,
    ) -> Self {
        Self::MethodCall(Box::new(MethodCallData {
            base,
            operator,
            args: args.into(),
            position,
        }))
    }

    /// Create a single-parameter lambda expression
    pub fn lambda(param: impl Into<String>, body: ExpressionNode) -> Self {
        Self::Lambda(Box::new(LambdaData {
            param: param.into(),
            body,
        }))
    }

    /// Create a binary operation expression
    pub fn binary_op(op: BinaryOperator, left: ExpressionNode, right: ExpressionNode) -> Self {
        Self::BinaryOp(Box::new(BinaryOpData { op, left, right }))
    }

    /// Check if this expression is a lambda
    pub fn is_lambda(&self) -> bool {
        matches!(self, Self::Lambda(_))
    }

    /// Operator of the outermost call, if the expression ends in one
    pub fn outer_operator(&self) -> Option<Operator> {
        match self {
            Self::MethodCall(call) => Some(call.operator),
            _ => None,
        }
    }

    /// Whether evaluation yields a raw result rather than a wrapped value
    ///
    /// True for literals, strict comparisons and expressions whose final
    /// call is `value()`.
    pub fn yields_raw(&self) -> bool {
        match self {
            Self::Literal(_) | Self::Array(_) | Self::Object(_) | Self::Regex(_) => true,
            Self::BinaryOp(_) => true,
            Self::MethodCall(call) => call.operator == Operator::Value,
            Self::Accessor(_) | Self::Variable(_) | Self::Lambda(_) => false,
        }
    }

    /// Number of nodes in the tree
    pub fn node_count(&self) -> usize {
        1 + match self {
            Self::Literal(_) | Self::Regex(_) | Self::Variable(_) => 0,
            Self::Array(items) => items.iter().map(Self::node_count).sum(),
            Self::Object(entries) => entries.iter().map(|(_, v)| v.node_count()).sum(),
            Self::Accessor(path) => path.node_count(),
            Self::MethodCall(call) => {
                call.base.node_count() + call.args.iter().map(Self::node_count).sum::<usize>()
            }
            Self::Lambda(lambda) => lambda.body.node_count(),
            Self::BinaryOp(data) => data.left.node_count() + data.right.node_count(),
        }
    }
}
