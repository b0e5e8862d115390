//! Parser module for kubescript
//!
//! This module contains the lexer and parser for kubescript sources.

pub mod types;
pub mod lexer;
pub mod parser;

// Re-exports
pub use types::{ParseErrorKind, ParseException};
pub use lexer::{tokenize, Lexer, LexerError, LexerErrorKind, Token, TokenType};
pub use parser::{parse, parse_script, Parser};
