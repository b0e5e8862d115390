//! Pipeline errors
//!
//! Each stage has its own error type; `CompileError` wraps whichever one
//! stopped the pipeline.

use thiserror::Error;

use crate::codegen::GenerationError;
use crate::parser::{LexerError, ParseException};

#[derive(Error, Debug, Clone)]
pub enum CompileError {
    #[error("lex error: {0}")]
    Lex(#[from] LexerError),

    #[error("{0}")]
    Parse(#[from] ParseException),

    #[error("generation error: {0}")]
    Generate(#[from] GenerationError),
}

impl CompileError {
    /// The stage that failed
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Lex(_) => "lex",
            Self::Parse(_) => "parse",
            Self::Generate(_) => "generate",
        }
    }
}
