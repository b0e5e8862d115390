//! Compiler
//!
//! Main entry point: ties the lexer, parser, and generator together. Each
//! stage runs to completion before the next one starts, and the first error
//! ends the run.

use crate::ast::types::Node;
use crate::codegen::{FunctionLibrary, Generator};
use crate::config::{CompilerConfig, Grammar};
use crate::error::CompileError;
use crate::parser::{Lexer, Parser, Token};

/// Result of the parse stage.
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed {
    pub root: Node,
    /// Variables the script assigns, in order
    pub variables: Vec<String>,
}

pub struct Compiler {
    config: CompilerConfig,
    library: &'static FunctionLibrary,
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new(CompilerConfig::default())
    }
}

impl Compiler {
    pub fn new(config: CompilerConfig) -> Self {
        Self::with_library(config, FunctionLibrary::builtin())
    }

    pub fn with_library(config: CompilerConfig, library: &'static FunctionLibrary) -> Self {
        Self { config, library }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    pub fn library(&self) -> &'static FunctionLibrary {
        self.library
    }

    pub fn tokenize(&self, source: &str) -> Result<Vec<Token>, CompileError> {
        Ok(Lexer::new(source).tokenize()?)
    }

    /// Parse with the configured grammar.
    pub fn parse(&self, tokens: Vec<Token>) -> Result<Parsed, CompileError> {
        let mut parser = Parser::new();
        let root = match self.config.grammar {
            Grammar::Function => parser.parse_tokens(tokens)?,
            Grammar::Statements => parser.parse_script_tokens(tokens)?,
        };
        let variables = parser.declared_variables().iter().cloned().collect();
        Ok(Parsed { root, variables })
    }

    pub fn generate(&self, root: &Node) -> Result<String, CompileError> {
        Ok(Generator::new(self.library, &self.config).generate(root)?)
    }

    /// Source text to shell text.
    pub fn compile(&self, source: &str) -> Result<String, CompileError> {
        let tokens = self.tokenize(source)?;
        let parsed = self.parse(tokens)?;
        self.generate(&parsed.root)
    }
}

/// Compile `source` with the default configuration.
pub fn compile(source: &str) -> Result<String, CompileError> {
    Compiler::default().compile(source)
}
