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

//! Byte-oriented tokenizer for expression text
//!
//! Operates on the input bytes directly and hands out zero-copy slices for
//! identifiers and escape-free strings. Whitespace and `//` / `/* */`
//! comments are skipped between tokens.

use std::borrow::Cow;
use std::fmt;

use super::error::{ParseError, ParseResult};
use super::span::Spanned;

/// Lexical token
#[derive(Debug, Clone, PartialEq)]
pub enum Token<'input> {
    /// Number literal, sign included (e.g. `18`, `-2.5`, `3.3e+225`)
    Number(f64),
    /// String literal in single or double quotes, escapes resolved
    String(Cow<'input, str>),
    /// Regex literal `/pattern/flags`
    Regex {
        /// Text between the slashes, escapes untouched
        pattern: &'input str,
        /// Trailing flag letters
        flags: &'input str,
    },
    /// Identifier (operator name, callback parameter or object key)
    Identifier(&'input str),

    /// `true`
    True,
    /// `false`
    False,
    /// `null`
    Null,
    /// `undefined`
    Undefined,
    /// `function`
    Function,
    /// `return`
    Return,

    /// `$`
    Dollar,
    /// `.`
    Dot,
    /// `,`
    Comma,
    /// `:`
    Colon,
    /// `;`
    Semicolon,
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `[`
    LeftBracket,
    /// `]`
    RightBracket,
    /// `{`
    LeftBrace,
    /// `}`
    RightBrace,
    /// `=>`
    Arrow,
    /// `===`
    StrictEqual,
    /// `!==`
    StrictNotEqual,
}

impl<'input> Token<'input> {
    /// Check if this token is a reserved word
    #[inline]
    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            Token::True
                | Token::False
                | Token::Null
                | Token::Undefined
                | Token::Function
                | Token::Return
        )
    }

    /// Get keyword from string
    #[inline]
    pub fn from_keyword(s: &str) -> Option<Token<'input>> {
        match s {
            "true" => Some(Token::True),
            "false" => Some(Token::False),
            "null" => Some(Token::Null),
            "undefined" => Some(Token::Undefined),
            "function" => Some(Token::Function),
            "return" => Some(Token::Return),
            _ => None,
        }
    }

    /// Short description for error messages
    pub fn describe(&self) -> Cow<'static, str> {
        match self {
            Token::Number(n) => Cow::Owned(format!("number {n}")),
            Token::String(s) => Cow::Owned(format!("string '{s}'")),
            Token::Regex { pattern, flags } => Cow::Owned(format!("regex /{pattern}/{flags}")),
            Token::Identifier(name) => Cow::Owned(format!("identifier '{name}'")),
            other => Cow::Owned(format!("'{other}'")),
        }
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{n}"),
            Token::String(s) => write!(f, "'{s}'"),
            Token::Regex { pattern, flags } => write!(f, "/{pattern}/{flags}"),
            Token::Identifier(name) => f.write_str(name),
            Token::True => f.write_str("true"),
            Token::False => f.write_str("false"),
            Token::Null => f.write_str("null"),
            Token::Undefined => f.write_str("undefined"),
            Token::Function => f.write_str("function"),
            Token::Return => f.write_str("return"),
            Token::Dollar => f.write_str("$"),
            Token::Dot => f.write_str("."),
            Token::Comma => f.write_str(","),
            Token::Colon => f.write_str(":"),
            Token::Semicolon => f.write_str(";"),
            Token::LeftParen => f.write_str("("),
            Token::RightParen => f.write_str(")"),
            Token::LeftBracket => f.write_str("["),
            Token::RightBracket => f.write_str("]"),
            Token::LeftBrace => f.write_str("{"),
            Token::RightBrace => f.write_str("}"),
            Token::Arrow => f.write_str("=>"),
            Token::StrictEqual => f.write_str("==="),
            Token::StrictNotEqual => f.write_str("!=="),
        }
    }
}

/// Tokenizer over the input bytes
///
/// Cloning is cheap, which the parser relies on for lookahead.
#[derive(Clone)]
pub struct Tokenizer<'input> {
    input: &'input str,
    bytes: &'input [u8],
    pos: usize,
    end: usize,
    token_start: usize,
}

impl<'input> Tokenizer<'input> {
    /// Create a new tokenizer
    #[inline]
    pub fn new(input: &'input str) -> Self {
        let bytes = input.as_bytes();
        Self {
            input,
            bytes,
            pos: 0,
            end: bytes.len(),
            token_start: 0,
        }
    }

    /// Byte offset of the most recently returned token
    #[inline]
    pub fn token_start(&self) -> usize {
        self.token_start
    }

    /// Length of the input in bytes
    #[inline]
    pub fn len(&self) -> usize {
        self.end
    }

    /// Check if the input is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.end == 0
    }

    #[inline(always)]
    fn slice(&self, start: usize, end: usize) -> &'input str {
        // token boundaries always sit on ASCII bytes
        &self.input[start..end]
    }

    #[inline(always)]
    fn peek_byte(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    #[inline(always)]
    fn is_id_start(ch: u8) -> bool {
        matches!(ch, b'A'..=b'Z' | b'a'..=b'z' | b'_')
    }

    #[inline(always)]
    fn is_id_continue(ch: u8) -> bool {
        matches!(ch, b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'_')
    }

    /// Skip whitespace and comments
    fn skip_trivia(&mut self) -> ParseResult<()> {
        loop {
            while self.pos < self.end && self.bytes[self.pos].is_ascii_whitespace() {
                self.pos += 1;
            }
            match (self.peek_byte(0), self.peek_byte(1)) {
                (Some(b'/'), Some(b'/')) => self.skip_single_line_comment(),
                (Some(b'/'), Some(b'*')) => self.skip_multi_line_comment()?,
                _ => return Ok(()),
            }
        }
    }

    fn skip_single_line_comment(&mut self) {
        self.pos += 2;
        while self.pos < self.end && !matches!(self.bytes[self.pos], b'\n' | b'\r') {
            self.pos += 1;
        }
    }

    fn skip_multi_line_comment(&mut self) -> ParseResult<()> {
        let start = self.pos;
        self.pos += 2;
        while self.pos + 1 < self.end {
            if self.bytes[self.pos] == b'*' && self.bytes[self.pos + 1] == b'/' {
                self.pos += 2;
                return Ok(());
            }
            self.pos += 1;
        }
        Err(ParseError::UnclosedComment { position: start })
    }

    /// Number literal with optional sign, fraction and exponent
    fn parse_number(&mut self) -> ParseResult<Token<'input>> {
        let start = self.pos;
        if self.bytes[self.pos] == b'-' {
            self.pos += 1;
        }
        self.skip_digits();

        if self.peek_byte(0) == Some(b'.') && self.peek_byte(1).is_some_and(|b| b.is_ascii_digit())
        {
            self.pos += 1;
            self.skip_digits();
        }

        if matches!(self.peek_byte(0), Some(b'e' | b'E')) {
            let sign = usize::from(matches!(self.peek_byte(1), Some(b'+' | b'-')));
            if self.peek_byte(1 + sign).is_some_and(|b| b.is_ascii_digit()) {
                self.pos += 1 + sign;
                self.skip_digits();
            }
        }

        let text = self.slice(start, self.pos);
        if self.peek_byte(0).is_some_and(Self::is_id_start) {
            return Err(ParseError::InvalidNumber {
                value: format!("{text}{}", self.bytes[self.pos] as char),
                position: start,
            });
        }
        text.parse::<f64>()
            .map(Token::Number)
            .map_err(|_| ParseError::InvalidNumber {
                value: text.to_string(),
                position: start,
            })
    }

    #[inline]
    fn skip_digits(&mut self) {
        while self.pos < self.end && self.bytes[self.pos].is_ascii_digit() {
            self.pos += 1;
        }
    }

    fn parse_identifier(&mut self) -> &'input str {
        let start = self.pos;
        while self.pos < self.end && Self::is_id_continue(self.bytes[self.pos]) {
            self.pos += 1;
        }
        self.slice(start, self.pos)
    }

    /// String literal delimited by `'` or `"`
    ///
    /// Borrows from the input unless an escape sequence forces a copy.
    fn parse_string_literal(&mut self) -> ParseResult<Cow<'input, str>> {
        let quote = self.bytes[self.pos];
        let start = self.pos;
        self.pos += 1;
        let content_start = self.pos;
        let mut has_escapes = false;

        while self.pos < self.end {
            match self.bytes[self.pos] {
                b if b == quote => {
                    let content = self.slice(content_start, self.pos);
                    self.pos += 1;
                    return if has_escapes {
                        process_string_escapes(content, content_start).map(Cow::Owned)
                    } else {
                        Ok(Cow::Borrowed(content))
                    };
                }
                b'\\' => {
                    has_escapes = true;
                    self.pos += 2;
                }
                b'\n' => break,
                _ => self.pos += 1,
            }
        }

        Err(ParseError::UnclosedString { position: start })
    }

    /// Regex literal; a `/` inside a character class does not terminate it
    fn parse_regex_literal(&mut self) -> ParseResult<Token<'input>> {
        let start = self.pos;
        self.pos += 1;
        let pattern_start = self.pos;
        let mut in_class = false;

        while self.pos < self.end {
            match self.bytes[self.pos] {
                b'\\' => self.pos += 2,
                b'[' => {
                    in_class = true;
                    self.pos += 1;
                }
                b']' => {
                    in_class = false;
                    self.pos += 1;
                }
                b'/' if !in_class => {
                    let pattern = self.slice(pattern_start, self.pos);
                    self.pos += 1;
                    let flags_start = self.pos;
                    while self.pos < self.end && self.bytes[self.pos].is_ascii_alphabetic() {
                        self.pos += 1;
                    }
                    let flags = self.slice(flags_start, self.pos);
                    return Ok(Token::Regex { pattern, flags });
                }
                b'\n' | b'\r' => break,
                _ => self.pos += 1,
            }
        }

        Err(ParseError::UnclosedRegex { position: start })
    }

    /// Produce the next token, or `None` at end of input
    pub fn next_token(&mut self) -> ParseResult<Option<Token<'input>>> {
        self.skip_trivia()?;
        self.token_start = self.pos;

        if self.pos >= self.end {
            return Ok(None);
        }

        let single = |tokenizer: &mut Self, token: Token<'input>| {
            tokenizer.pos += 1;
            token
        };

        let byte = self.bytes[self.pos];
        let token = match byte {
            b'.' => single(self, Token::Dot),
            b'(' => single(self, Token::LeftParen),
            b')' => single(self, Token::RightParen),
            b',' => single(self, Token::Comma),
            b'$' => single(self, Token::Dollar),
            b'[' => single(self, Token::LeftBracket),
            b']' => single(self, Token::RightBracket),
            b'{' => single(self, Token::LeftBrace),
            b'}' => single(self, Token::RightBrace),
            b':' => single(self, Token::Colon),
            b';' => single(self, Token::Semicolon),

            b'=' => match (self.peek_byte(1), self.peek_byte(2)) {
                (Some(b'>'), _) => {
                    self.pos += 2;
                    Token::Arrow
                }
                (Some(b'='), Some(b'=')) => {
                    self.pos += 3;
                    Token::StrictEqual
                }
                _ => return Err(self.operator_error("'===' or '=>'")),
            },
            b'!' => match (self.peek_byte(1), self.peek_byte(2)) {
                (Some(b'='), Some(b'=')) => {
                    self.pos += 3;
                    Token::StrictNotEqual
                }
                _ => return Err(self.operator_error("'!=='")),
            },

            b'/' => self.parse_regex_literal()?,
            b'\'' | b'"' => Token::String(self.parse_string_literal()?),
            b'0'..=b'9' => self.parse_number()?,
            b'-' if self.peek_byte(1).is_some_and(|b| b.is_ascii_digit()) => {
                self.parse_number()?
            }

            ch if Self::is_id_start(ch) => {
                let ident = self.parse_identifier();
                Token::from_keyword(ident).unwrap_or(Token::Identifier(ident))
            }

            _ => {
                let character = self.input[self.pos..].chars().next().unwrap_or('\u{fffd}');
                return Err(ParseError::UnexpectedCharacter {
                    character,
                    position: self.pos,
                });
            }
        };

        Ok(Some(token))
    }

    /// Next token together with its byte span
    pub fn next_spanned(&mut self) -> ParseResult<Option<Spanned<Token<'input>>>> {
        Ok(self
            .next_token()?
            .map(|token| Spanned::new(token, self.token_start, self.pos)))
    }

    /// Tokenize the remaining input
    pub fn tokenize_all(&mut self) -> ParseResult<Vec<Spanned<Token<'input>>>> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_spanned()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    fn operator_error(&self, expected: &'static str) -> ParseError {
        let run = self.bytes[self.pos..]
            .iter()
            .take_while(|b| matches!(b, b'=' | b'!'))
            .count();
        ParseError::UnexpectedToken {
            token: Cow::Owned(format!("'{}'", self.slice(self.pos, self.pos + run))),
            expected: Cow::Borrowed(expected),
            position: self.pos,
        }
    }
}

/// Resolve escape sequences, including `\uXXXX`
///
/// Unknown escapes yield the escaped character itself.
fn process_string_escapes(input: &str, offset: usize) -> ParseResult<String> {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.char_indices();

    while let Some((index, ch)) = chars.next() {
        if ch != '\\' {
            result.push(ch);
            continue;
        }
        match chars.next().map(|(_, c)| c) {
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('r') => result.push('\r'),
            Some('b') => result.push('\u{8}'),
            Some('f') => result.push('\u{c}'),
            Some('0') => result.push('\0'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).map(|(_, c)| c).collect();
                let decoded = (hex.len() == 4)
                    .then(|| u32::from_str_radix(&hex, 16).ok())
                    .flatten()
                    .and_then(char::from_u32);
                match decoded {
                    Some(c) => result.push(c),
                    None => {
                        return Err(ParseError::InvalidEscape {
                            sequence: format!("\\u{hex}"),
                            position: offset + index,
                        });
                    }
                }
            }
            Some(other) => result.push(other),
            None => {
                return Err(ParseError::InvalidEscape {
                    sequence: "\\".to_string(),
                    position: offset + index,
                });
            }
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tokens(input: &str) -> Vec<Token<'_>> {
        Tokenizer::new(input)
            .tokenize_all()
            .unwrap()
            .into_iter()
            .map(|t| t.value)
            .collect()
    }

    #[test]
    fn test_tokenizer_basic() {
        assert_eq!(
            tokens("$('height').plus(100)"),
            vec![
                Token::Dollar,
                Token::LeftParen,
                Token::String(Cow::Borrowed("height")),
                Token::RightParen,
                Token::Dot,
                Token::Identifier("plus"),
                Token::LeftParen,
                Token::Number(100.0),
                Token::RightParen,
            ]
        );
    }

    #[test]
    fn test_spans() {
        let spanned = Tokenizer::new("  $( 'a' )").tokenize_all().unwrap();
        assert_eq!((spanned[0].start, spanned[0].end), (2, 3));
        assert_eq!((spanned[2].start, spanned[2].end), (5, 8));
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            tokens("18 -2.5 3.367057324275169e+225 1E3"),
            vec![
                Token::Number(18.0),
                Token::Number(-2.5),
                Token::Number(3.367057324275169e225),
                Token::Number(1000.0),
            ]
        );
        assert!(matches!(
            Tokenizer::new("12abc").next_token(),
            Err(ParseError::InvalidNumber { position: 0, .. })
        ));
    }

    #[test]
    fn test_string_literals() {
        assert_eq!(
            tokens(r#"'hello world' "test" 'it\'s' "A\n""#),
            vec![
                Token::String(Cow::Borrowed("hello world")),
                Token::String(Cow::Borrowed("test")),
                Token::String(Cow::Owned("it's".to_string())),
                Token::String(Cow::Owned("A\n".to_string())),
            ]
        );
        assert_eq!(
            Tokenizer::new("'open").next_token(),
            Err(ParseError::UnclosedString { position: 0 })
        );
        assert!(matches!(
            Tokenizer::new(r"'\u12'").next_token(),
            Err(ParseError::InvalidEscape { .. })
        ));
    }

    #[test]
    fn test_regex_literals() {
        assert_eq!(
            tokens(r"/^[a-z0-9]+$/i /a[/]b/ /\/x/"),
            vec![
                Token::Regex {
                    pattern: "^[a-z0-9]+$",
                    flags: "i"
                },
                Token::Regex {
                    pattern: "a[/]b",
                    flags: ""
                },
                Token::Regex {
                    pattern: r"\/x",
                    flags: ""
                },
            ]
        );
        assert_eq!(
            Tokenizer::new("/abc").next_token(),
            Err(ParseError::UnclosedRegex { position: 0 })
        );
    }

    #[test]
    fn test_keywords_and_operators() {
        assert_eq!(
            tokens("true false null undefined function return x => === !=="),
            vec![
                Token::True,
                Token::False,
                Token::Null,
                Token::Undefined,
                Token::Function,
                Token::Return,
                Token::Identifier("x"),
                Token::Arrow,
                Token::StrictEqual,
                Token::StrictNotEqual,
            ]
        );
        assert!(Token::Function.is_keyword());
        assert!(!Token::Identifier("map").is_keyword());
    }

    #[test]
    fn test_loose_equality_is_rejected() {
        assert!(matches!(
            Tokenizer::new("== 1").next_token(),
            Err(ParseError::UnexpectedToken { position: 0, .. })
        ));
        assert!(matches!(
            Tokenizer::new("!= 1").next_token(),
            Err(ParseError::UnexpectedToken { .. })
        ));
    }

    #[test]
    fn test_comments_are_skipped() {
        assert_eq!(
            tokens("// leading\n$ /* inline */ . // trailing"),
            vec![Token::Dollar, Token::Dot]
        );
        assert_eq!(
            Tokenizer::new("$ /* open").tokenize_all(),
            Err(ParseError::UnclosedComment { position: 2 })
        );
    }

    #[test]
    fn test_unexpected_character() {
        assert_eq!(
            Tokenizer::new("$ + 1").tokenize_all(),
            Err(ParseError::UnexpectedCharacter {
                character: '+',
                position: 2
            })
        );
    }
}
