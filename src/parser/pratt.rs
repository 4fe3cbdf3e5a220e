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

//! Pratt parser for the expression grammar
//!
//! ```text
//! program   := expression ';'? EOF
//! expression:= postfix (('===' | '!==') postfix)*
//! postfix   := primary ('.' OPERATOR '(' args ')')*
//! primary   := literal | regex | '$' '(' expression ')' | array | object
//!            | '(' expression ')' | PARAM
//! callback  := IDENT '=>' body | '(' IDENT ')' '=>' body
//!            | 'function' IDENT? '(' IDENT ')' '{' 'return' expression ';'? '}'
//! ```
//!
//! Callbacks are only accepted as the single argument of `map`. Operator
//! names and arities are checked here, so a tree that parses is safe to
//! evaluate.

use std::borrow::Cow;

use smallvec::SmallVec;

use super::error::{ParseError, ParseResult};
use super::tokenizer::{Token, Tokenizer};
use crate::ast::{BinaryOperator, ExpressionNode, LiteralValue, RegexLiteral};
use crate::error::MagmaError;
use crate::model::value::format_number;
use crate::registry::{Operator, build_regex};

/// Deepest nesting of groups, brackets, callbacks, chained calls and comparisons
///
/// Evaluation and drop of the tree recurse as deep as parsing does, so the
/// bound applies to the call chain length too.
pub const MAX_NESTING_DEPTH: usize = 128;

/// Operator precedence levels (higher = tighter binding)
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    /// Strict equality (`===`, `!==`), left associative
    Equality = 1,
    /// Chained calls (`.op()`)
    Invocation = 2,
}

impl Precedence {
    /// Convert precedence to raw u8 for fast comparison
    #[inline(always)]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Get the next higher precedence level for left-associative operators
    #[inline(always)]
    pub const fn next_level(self) -> Self {
        match self {
            Precedence::Equality | Precedence::Invocation => Precedence::Invocation,
        }
    }
}

/// Precedence and operator for an infix token
#[inline]
fn infix_operator(token: &Token<'_>) -> Option<(Precedence, BinaryOperator)> {
    match token {
        Token::StrictEqual => Some((Precedence::Equality, BinaryOperator::StrictEqual)),
        Token::StrictNotEqual => Some((Precedence::Equality, BinaryOperator::StrictNotEqual)),
        _ => None,
    }
}

/// Recursive-descent parser with Pratt-style infix handling
pub struct PrattParser<'input> {
    source: &'input str,
    tokenizer: Tokenizer<'input>,
    current_token: Option<Token<'input>>,
    current_start: usize,
    /// Callback parameters visible at the current position
    scope: Vec<&'input str>,
    /// Current nesting depth
    depth: usize,
}

impl<'input> PrattParser<'input> {
    /// Create a new parser over `input`
    pub fn new(input: &'input str) -> Self {
        Self {
            source: input,
            tokenizer: Tokenizer::new(input),
            current_token: None,
            current_start: 0,
            scope: Vec::new(),
            depth: 0,
        }
    }

    /// Enter one nesting level, failing past [`MAX_NESTING_DEPTH`]
    fn descend(&mut self, position: usize) -> ParseResult<()> {
        self.depth += 1;
        if self.depth > MAX_NESTING_DEPTH {
            return Err(ParseError::NestingTooDeep {
                limit: MAX_NESTING_DEPTH,
                position,
            });
        }
        Ok(())
    }

    #[inline]
    fn advance(&mut self) -> ParseResult<()> {
        self.current_token = self.tokenizer.next_token()?;
        self.current_start = self.tokenizer.token_start();
        Ok(())
    }

    #[inline(always)]
    fn current(&self) -> Option<&Token<'input>> {
        self.current_token.as_ref()
    }

    #[inline]
    fn at(&self, expected: &Token<'_>) -> bool {
        self.current()
            .is_some_and(|token| std::mem::discriminant(token) == std::mem::discriminant(expected))
    }

    /// Token after the current one, without consuming anything
    fn peek(&self) -> Option<Token<'input>> {
        self.tokenizer.clone().next_token().ok().flatten()
    }

    /// Error for the current token (or end of input)
    fn unexpected(&self, expected: impl Into<Cow<'static, str>>) -> ParseError {
        match self.current() {
            Some(token) => ParseError::UnexpectedToken {
                token: token.describe(),
                expected: expected.into(),
                position: self.current_start,
            },
            None => ParseError::UnexpectedEof {
                expected: expected.into(),
                position: self.source.len(),
            },
        }
    }

    fn expect(&mut self, expected: Token<'static>, description: &'static str) -> ParseResult<()> {
        if self.at(&expected) {
            self.advance()
        } else {
            Err(self.unexpected(description))
        }
    }

    fn expect_identifier(&mut self, description: &'static str) -> ParseResult<&'input str> {
        match self.current() {
            Some(Token::Identifier(name)) => {
                let name = *name;
                self.advance()?;
                Ok(name)
            }
            _ => Err(self.unexpected(description)),
        }
    }

    /// Parse complete input
    pub fn parse(&mut self) -> ParseResult<ExpressionNode> {
        self.advance()?;
        let expr = self.parse_expression()?;
        if self.at(&Token::Semicolon) {
            self.advance()?;
        }
        if self.current_token.is_some() {
            return Err(self.unexpected("end of expression"));
        }
        Ok(expr)
    }

    /// Parse a complete expression
    #[inline]
    pub fn parse_expression(&mut self) -> ParseResult<ExpressionNode> {
        self.parse_expression_with_precedence(Precedence::Equality)
    }

    fn parse_expression_with_precedence(
        &mut self,
        min_precedence: Precedence,
    ) -> ParseResult<ExpressionNode> {
        self.descend(self.current_start)?;
        let result = self.parse_infix(min_precedence);
        self.depth -= 1;
        result
    }

    fn parse_infix(&mut self, min_precedence: Precedence) -> ParseResult<ExpressionNode> {
        let primary = self.parse_primary()?;
        let mut left = self.parse_postfix(primary)?;
        let mut operands = 0;

        while let Some((precedence, op)) = self.current().and_then(infix_operator) {
            if precedence.as_u8() < min_precedence.as_u8() {
                break;
            }
            self.descend(self.current_start)?;
            operands += 1;
            self.advance()?;
            let right = self.parse_expression_with_precedence(precedence.next_level())?;
            left = ExpressionNode::binary_op(op, left, right);
        }

        self.depth -= operands;
        Ok(left)
    }

    /// Parse primary expression (literals, accessor, grouping, parameters)
    fn parse_primary(&mut self) -> ParseResult<ExpressionNode> {
        let start = self.current_start;
        let Some(token) = self.current_token.clone() else {
            return Err(self.unexpected("an expression"));
        };

        match token {
            Token::Number(n) => {
                self.advance()?;
                Ok(ExpressionNode::number(n))
            }
            Token::String(s) => {
                self.advance()?;
                Ok(ExpressionNode::string(s.into_owned()))
            }
            Token::True | Token::False => {
                self.advance()?;
                Ok(ExpressionNode::literal(LiteralValue::Boolean(
                    token == Token::True,
                )))
            }
            Token::Null | Token::Undefined => {
                self.advance()?;
                Ok(ExpressionNode::literal(LiteralValue::Null))
            }
            Token::Regex { pattern, flags } => {
                self.advance()?;
                regex_literal(pattern, flags, start)
            }
            Token::Dollar => {
                self.advance()?;
                self.expect(Token::LeftParen, "'(' after '$'")?;
                let path = self.parse_expression()?;
                self.expect(Token::RightParen, "')' to close '$('")?;
                Ok(ExpressionNode::accessor(path))
            }
            Token::LeftBracket => self.parse_array(),
            Token::LeftBrace => self.parse_object(),
            Token::LeftParen => {
                if self.at_callback() {
                    return Err(ParseError::MisplacedCallback { position: start });
                }
                self.advance()?;
                let inner = self.parse_expression()?;
                self.expect(Token::RightParen, "')'")?;
                Ok(inner)
            }
            Token::Function => Err(ParseError::MisplacedCallback { position: start }),
            Token::Identifier(name) => {
                if self.at_callback() {
                    return Err(ParseError::MisplacedCallback { position: start });
                }
                if !self.scope.contains(&name) {
                    return Err(ParseError::UnknownIdentifier {
                        name: name.to_string(),
                        position: start,
                    });
                }
                self.advance()?;
                Ok(ExpressionNode::variable(name))
            }
            _ => Err(self.unexpected("an expression")),
        }
    }

    /// Parse chained operator calls
    fn parse_postfix(&mut self, mut left: ExpressionNode) -> ParseResult<ExpressionNode> {
        let mut calls = 0;
        while self.at(&Token::Dot) {
            self.advance()?;
            let position = self.current_start;
            self.descend(position)?;
            calls += 1;
            let name = self.expect_identifier("an operator name after '.'")?;
            let operator = Operator::from_name(name).ok_or_else(|| ParseError::UnknownOperator {
                name: name.to_string(),
                position,
            })?;
            self.expect(Token::LeftParen, "'(' after operator name")?;

            let args = if operator == Operator::Map {
                self.parse_map_args(position)?
            } else {
                self.parse_call_args()?
            };

            let signature = operator.signature();
            if !signature.accepts(args.len()) {
                return Err(ParseError::InvalidArity {
                    operator: signature.name,
                    expected: signature.arity_description(),
                    found: args.len(),
                    position,
                });
            }

            left = ExpressionNode::method_call(left, operator, args, position);
        }
        self.depth -= calls;
        Ok(left)
    }

    /// Arguments up to and including the closing parenthesis
    fn parse_call_args(&mut self) -> ParseResult<SmallVec<[ExpressionNode; 4]>> {
        let mut args = SmallVec::new();
        if self.at(&Token::RightParen) {
            self.advance()?;
            return Ok(args);
        }
        loop {
            args.push(self.parse_expression()?);
            match self.current() {
                Some(Token::Comma) => self.advance()?,
                Some(Token::RightParen) => {
                    self.advance()?;
                    return Ok(args);
                }
                _ => return Err(self.unexpected("',' or ')' in arguments")),
            }
        }
    }

    /// `map` arguments: either a single callback or table arguments
    fn parse_map_args(&mut self, position: usize) -> ParseResult<SmallVec<[ExpressionNode; 4]>> {
        if !self.at_callback() {
            return self.parse_call_args();
        }

        let callback = self.parse_callback()?;
        let mut args: SmallVec<[ExpressionNode; 4]> = SmallVec::new();
        args.push(callback);
        while self.at(&Token::Comma) {
            self.advance()?;
            args.push(self.parse_expression()?);
        }
        self.expect(Token::RightParen, "')' after callback")?;

        if args.len() != 1 {
            return Err(ParseError::InvalidArity {
                operator: Operator::Map.name(),
                expected: "1 (with a callback)".to_string(),
                found: args.len(),
                position,
            });
        }
        Ok(args)
    }

    /// Whether a callback starts at the current token
    fn at_callback(&self) -> bool {
        match self.current() {
            Some(Token::Function) => true,
            Some(Token::Identifier(_)) => matches!(self.peek(), Some(Token::Arrow)),
            Some(Token::LeftParen) => {
                let mut lookahead = self.tokenizer.clone();
                let mut next = || lookahead.next_token().ok().flatten();
                matches!(
                    (next(), next(), next()),
                    (
                        Some(Token::Identifier(_)),
                        Some(Token::RightParen),
                        Some(Token::Arrow)
                    )
                )
            }
            _ => false,
        }
    }

    fn parse_callback(&mut self) -> ParseResult<ExpressionNode> {
        let param = match self.current() {
            Some(Token::Function) => {
                self.advance()?;
                // optional function name
                if let Some(Token::Identifier(_)) = self.current() {
                    self.advance()?;
                }
                self.expect(Token::LeftParen, "'(' after 'function'")?;
                let param = self.expect_identifier("a callback parameter")?;
                self.expect(Token::RightParen, "')' after callback parameter")?;
                return self.with_param(param, Self::parse_block_body);
            }
            Some(Token::LeftParen) => {
                self.advance()?;
                let param = self.expect_identifier("a callback parameter")?;
                self.expect(Token::RightParen, "')' after callback parameter")?;
                param
            }
            _ => self.expect_identifier("a callback parameter")?,
        };

        self.expect(Token::Arrow, "'=>'")?;
        if self.at(&Token::LeftBrace) {
            self.with_param(param, Self::parse_block_body)
        } else {
            self.with_param(param, Self::parse_expression)
        }
    }

    /// Parse a callback body with `param` in scope
    fn with_param(
        &mut self,
        param: &'input str,
        body: fn(&mut Self) -> ParseResult<ExpressionNode>,
    ) -> ParseResult<ExpressionNode> {
        self.scope.push(param);
        let result = body(self);
        self.scope.pop();
        Ok(ExpressionNode::lambda(param, result?))
    }

    /// `{ return expression ;? }`
    fn parse_block_body(&mut self) -> ParseResult<ExpressionNode> {
        self.expect(Token::LeftBrace, "'{'")?;
        self.expect(Token::Return, "'return'")?;
        let body = self.parse_expression()?;
        if self.at(&Token::Semicolon) {
            self.advance()?;
        }
        self.expect(Token::RightBrace, "'}' to close the callback body")?;
        Ok(body)
    }

    fn parse_array(&mut self) -> ParseResult<ExpressionNode> {
        self.expect(Token::LeftBracket, "'['")?;
        let mut items = Vec::new();
        while !self.at(&Token::RightBracket) {
            items.push(self.parse_expression()?);
            match self.current() {
                Some(Token::Comma) => self.advance()?,
                Some(Token::RightBracket) => {}
                _ => return Err(self.unexpected("',' or ']' in array")),
            }
        }
        self.advance()?;
        Ok(ExpressionNode::Array(items))
    }

    fn parse_object(&mut self) -> ParseResult<ExpressionNode> {
        self.expect(Token::LeftBrace, "'{'")?;
        let mut entries = Vec::new();
        while !self.at(&Token::RightBrace) {
            let key = match self.current() {
                Some(Token::Identifier(name)) => (*name).to_string(),
                Some(Token::String(s)) => s.to_string(),
                Some(Token::Number(n)) => format_number(*n),
                Some(keyword) if keyword.is_keyword() => keyword.to_string(),
                _ => return Err(self.unexpected("an object key")),
            };
            self.advance()?;
            self.expect(Token::Colon, "':' after object key")?;
            entries.push((key, self.parse_expression()?));
            match self.current() {
                Some(Token::Comma) => self.advance()?,
                Some(Token::RightBrace) => {}
                _ => return Err(self.unexpected("',' or '}' in object")),
            }
        }
        self.advance()?;
        Ok(ExpressionNode::Object(entries))
    }
}

/// Compile a regex literal, translating `\/` to a plain slash
fn regex_literal(pattern: &str, flags: &str, position: usize) -> ParseResult<ExpressionNode> {
    let source = pattern.replace("\\/", "/");
    let regex = build_regex(&source, flags).map_err(|err| ParseError::InvalidRegex {
        message: match err {
            MagmaError::InvalidArgument { message, .. } => message,
            other => other.to_string(),
        },
        position,
    })?;
    Ok(ExpressionNode::Regex(Box::new(RegexLiteral {
        source: pattern.to_string(),
        flags: flags.to_string(),
        regex,
    })))
}

/// Parse expression text into an AST
pub fn parse_expression_pratt(input: &str) -> ParseResult<ExpressionNode> {
    PrattParser::new(input).parse()
}
