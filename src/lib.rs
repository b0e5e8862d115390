//! kubescript - compile small cluster-operation scripts to shell functions
//!
//! A script is lexed, parsed into an AST, and rendered as a shell function
//! whose body calls the cluster CLI.

pub mod ast;
pub mod codegen;
pub mod compiler;
pub mod config;
pub mod diff;
pub mod error;
pub mod parser;

pub use ast::types::*;
pub use codegen::{generate, FunctionLibrary, GenerationError, Generator};
pub use compiler::{compile, Compiler, Parsed};
pub use config::{CompilerConfig, ConfigError, Grammar, LiteralPolicy};
pub use error::CompileError;
pub use parser::{parse, parse_script, tokenize, LexerError, ParseException, Parser, Token, TokenType};
