//! Abstract Syntax Tree (AST) Types for kubescript
//!
//! Architecture:
//!   Input → Lexer → Parser → AST → Generator → shell function

pub mod types;
