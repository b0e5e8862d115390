//! Abstract Syntax Tree (AST) Types for kubescript
//!
//! The tree is built bottom-up by the parser and never mutated afterwards.
//! Every node owns its children.

// =============================================================================
// ROOTS
// =============================================================================

/// Root node: `def name(params) { body }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDefNode {
    pub name: String,
    pub params: Vec<String>,
    pub body: Vec<Node>,
}

/// Root node for bare scripts without an enclosing function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramNode {
    pub statements: Vec<Node>,
}

// =============================================================================
// EXPRESSIONS
// =============================================================================

/// A library call: `name(arg, ...)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallNode {
    pub name: String,
    pub args: Vec<Node>,
}

/// `$NAME=value`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarAssignNode {
    pub name: String,
    pub value: AssignValue,
}

/// `$NAME`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarRefNode {
    pub name: String,
}

/// `"text"`, quotes already stripped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringLiteralNode {
    pub value: String,
}

/// Right-hand side of an assignment. A bare variable is not allowed here, so
/// one variable can never alias another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignValue {
    Literal(StringLiteralNode),
    Prompt,
    Call(CallNode),
}

/// Union of all node types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    FunctionDef(FunctionDefNode),
    Program(ProgramNode),
    Call(CallNode),
    VarAssign(VarAssignNode),
    VarRef(VarRefNode),
    StringLiteral(StringLiteralNode),
    /// The `ask` construct: one line of user input
    Prompt,
}

impl Node {
    /// Short name of the variant, for diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::FunctionDef(_) => "function definition",
            Self::Program(_) => "program",
            Self::Call(_) => "call",
            Self::VarAssign(_) => "assignment",
            Self::VarRef(_) => "variable reference",
            Self::StringLiteral(_) => "string",
            Self::Prompt => "ask",
        }
    }
}

// =============================================================================
// FACTORY
// =============================================================================

pub struct AST;

impl AST {
    pub fn function_def(name: impl Into<String>, params: Vec<String>, body: Vec<Node>) -> Node {
        Node::FunctionDef(FunctionDefNode {
            name: name.into(),
            params,
            body,
        })
    }

    pub fn program(statements: Vec<Node>) -> Node {
        Node::Program(ProgramNode { statements })
    }

    pub fn call_node(name: impl Into<String>, args: Vec<Node>) -> CallNode {
        CallNode {
            name: name.into(),
            args,
        }
    }

    pub fn call(name: impl Into<String>, args: Vec<Node>) -> Node {
        Node::Call(Self::call_node(name, args))
    }

    pub fn assign(name: impl Into<String>, value: AssignValue) -> Node {
        Node::VarAssign(VarAssignNode {
            name: name.into(),
            value,
        })
    }

    pub fn var_ref(name: impl Into<String>) -> Node {
        Node::VarRef(VarRefNode { name: name.into() })
    }

    pub fn literal_node(value: impl Into<String>) -> StringLiteralNode {
        StringLiteralNode {
            value: value.into(),
        }
    }

    pub fn string(value: impl Into<String>) -> Node {
        Node::StringLiteral(Self::literal_node(value))
    }
}
