//! Parser Types
//!
//! Error type shared by the parser entry points.

use std::fmt;
use thiserror::Error;
use crate::parser::lexer::Token;

/// Which rule a script broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Wrong token kind, or input ended early
    Syntax,
    /// Variable declared twice, or used before it was set
    Semantic,
}

impl ParseErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Syntax => "Syntax error",
            Self::Semantic => "Semantic error",
        }
    }
}

#[derive(Debug, Clone, Error)]
pub struct ParseException {
    pub kind: ParseErrorKind,
    pub message: String,
    pub line: usize,
    pub column: usize,
    pub token: Option<Token>,
}

impl fmt::Display for ParseException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at {}:{}: {}",
            self.kind.as_str(),
            self.line,
            self.column,
            self.message
        )
    }
}

impl ParseException {
    pub fn syntax(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            kind: ParseErrorKind::Syntax,
            message: message.into(),
            line,
            column,
            token: None,
        }
    }

    pub fn semantic(message: impl Into<String>, token: &Token) -> Self {
        Self {
            kind: ParseErrorKind::Semantic,
            message: message.into(),
            line: token.line,
            column: token.column,
            token: Some(token.clone()),
        }
    }

    pub fn with_token(mut self, token: Token) -> Self {
        self.token = Some(token);
        self
    }
}
