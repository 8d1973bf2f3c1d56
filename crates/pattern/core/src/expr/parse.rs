//! Textual formula syntax.
//!
//! ```text
//! expr    := term (("+" | "-") term)*
//! term    := unary (("*" | "/" | "%") unary)*
//! unary   := ("-" | "+") unary | primary
//! primary := number | "$" digits | "$rank" | "$rand" | "(" expr ")"
//! ```

use crate::error::{ErrorSeverity, PatternError};
use crate::expr::{BinaryOp, Expression};

/// Deepest nesting of parentheses and unary signs a formula may use.
pub const MAX_NESTING: usize = 64;

/// Failure while reading a formula. Offsets are byte positions in the source.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unexpected character '{ch}' at {offset}")]
    UnexpectedChar { ch: char, offset: usize },

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("unexpected token at {offset}")]
    UnexpectedToken { offset: usize },

    #[error("invalid number '{text}' at {offset}")]
    InvalidNumber { text: String, offset: usize },

    #[error("invalid parameter '${name}' at {offset}")]
    InvalidParam { name: String, offset: usize },

    #[error("expression nested deeper than {MAX_NESTING} levels at {offset}")]
    TooDeep { offset: usize },
}

impl PatternError for ParseError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Authoring
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnexpectedChar { .. } => "PARSE_UNEXPECTED_CHAR",
            Self::UnexpectedEnd => "PARSE_UNEXPECTED_END",
            Self::UnexpectedToken { .. } => "PARSE_UNEXPECTED_TOKEN",
            Self::InvalidNumber { .. } => "PARSE_INVALID_NUMBER",
            Self::InvalidParam { .. } => "PARSE_INVALID_PARAM",
            Self::TooDeep { .. } => "PARSE_TOO_DEEP",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum TokenKind {
    Number(f32),
    Param(usize),
    Rank,
    Rand,
    Op(BinaryOp),
    LParen,
    RParen,
}

#[derive(Clone, Copy, Debug)]
struct Token {
    kind: TokenKind,
    offset: usize,
}

pub(crate) fn parse(source: &str) -> Result<Expression, ParseError> {
    let tokens = tokenize(source)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let expr = parser.expr()?;
    match parser.peek() {
        None => Ok(expr),
        Some(token) => Err(ParseError::UnexpectedToken {
            offset: token.offset,
        }),
    }
}

// ============================================================================
// Lexer
// ============================================================================

fn tokenize(source: &str) -> Result<Vec<Token>, ParseError> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let start = pos;
        let ch = bytes[pos];
        let kind = match ch {
            b' ' | b'\t' | b'\n' | b'\r' => {
                pos += 1;
                continue;
            }
            b'+' => TokenKind::Op(BinaryOp::Add),
            b'-' => TokenKind::Op(BinaryOp::Sub),
            b'*' => TokenKind::Op(BinaryOp::Mul),
            b'/' => TokenKind::Op(BinaryOp::Div),
            b'%' => TokenKind::Op(BinaryOp::Rem),
            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,
            b'0'..=b'9' | b'.' => {
                while pos < bytes.len() && (bytes[pos].is_ascii_digit() || bytes[pos] == b'.') {
                    pos += 1;
                }
                let text = &source[start..pos];
                let value = text.parse::<f32>().map_err(|_| ParseError::InvalidNumber {
                    text: text.to_string(),
                    offset: start,
                })?;
                tokens.push(Token {
                    kind: TokenKind::Number(value),
                    offset: start,
                });
                continue;
            }
            b'$' => {
                pos += 1;
                while pos < bytes.len() && bytes[pos].is_ascii_alphanumeric() {
                    pos += 1;
                }
                let name = &source[start + 1..pos];
                let kind = match name {
                    "rank" => TokenKind::Rank,
                    "rand" => TokenKind::Rand,
                    _ => match name.parse::<usize>() {
                        Ok(index) if index > 0 => TokenKind::Param(index),
                        _ => {
                            return Err(ParseError::InvalidParam {
                                name: name.to_string(),
                                offset: start,
                            });
                        }
                    },
                };
                tokens.push(Token {
                    kind,
                    offset: start,
                });
                continue;
            }
            _ => {
                let ch = source[start..].chars().next().unwrap_or('\u{fffd}');
                return Err(ParseError::UnexpectedChar { ch, offset: start });
            }
        };
        tokens.push(Token {
            kind,
            offset: start,
        });
        pos += 1;
    }

    Ok(tokens)
}

// ============================================================================
// Parser
// ============================================================================

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn next(&mut self) -> Result<Token, ParseError> {
        let token = self.peek().ok_or(ParseError::UnexpectedEnd)?;
        self.pos += 1;
        Ok(token)
    }

    fn expr(&mut self) -> Result<Expression, ParseError> {
        let mut lhs = self.term()?;
        while let Some(Token {
            kind: TokenKind::Op(op @ (BinaryOp::Add | BinaryOp::Sub)),
            ..
        }) = self.peek()
        {
            self.pos += 1;
            let rhs = self.term()?;
            lhs = Expression::binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn term(&mut self) -> Result<Expression, ParseError> {
        let mut lhs = self.unary()?;
        while let Some(Token {
            kind: TokenKind::Op(op @ (BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem)),
            ..
        }) = self.peek()
        {
            self.pos += 1;
            let rhs = self.unary()?;
            lhs = Expression::binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expression, ParseError> {
        match self.peek() {
            Some(Token {
                kind: TokenKind::Op(op @ (BinaryOp::Sub | BinaryOp::Add)),
                offset,
            }) => {
                self.pos += 1;
                let operand = self.nested(offset, Self::unary)?;
                Ok(match op {
                    BinaryOp::Sub => Expression::Neg(Box::new(operand)),
                    _ => operand,
                })
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> Result<Expression, ParseError> {
        let token = self.next()?;
        match token.kind {
            TokenKind::Number(value) => Ok(Expression::Number(value)),
            TokenKind::Param(index) => Ok(Expression::Param(index)),
            TokenKind::Rank => Ok(Expression::Rank),
            TokenKind::Rand => Ok(Expression::Rand),
            TokenKind::LParen => {
                let inner = self.nested(token.offset, Self::expr)?;
                match self.next()? {
                    Token {
                        kind: TokenKind::RParen,
                        ..
                    } => Ok(inner),
                    other => Err(ParseError::UnexpectedToken {
                        offset: other.offset,
                    }),
                }
            }
            TokenKind::Op(_) | TokenKind::RParen => Err(ParseError::UnexpectedToken {
                offset: token.offset,
            }),
        }
    }

    /// Runs `rule` one nesting level deeper, failing past [`MAX_NESTING`].
    fn nested(
        &mut self,
        offset: usize,
        rule: fn(&mut Self) -> Result<Expression, ParseError>,
    ) -> Result<Expression, ParseError> {
        if self.depth >= MAX_NESTING {
            return Err(ParseError::TooDeep { offset });
        }
        self.depth += 1;
        let result = rule(self);
        self.depth -= 1;
        result
    }
}
