//! Code generation: AST to shell function
//!
//! The generator checks every call against the builtin library and expands
//! it through that builtin's command template.

pub mod types;
pub mod quoting;
pub mod library;
pub mod generator;

// Re-exports
pub use types::GenerationError;
pub use library::{ArgKind, Builtin, FunctionLibrary, FunctionSignature, ParamSpec, BUILTINS};
pub use generator::{generate, namespace_flag, Generator, PROMPT};
