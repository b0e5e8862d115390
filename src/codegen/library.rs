//! Builtin function library
//!
//! Every call a script may make is listed here with its arity and the kind
//! of each parameter. The table is read-only; the generator receives it by
//! reference and checks each call against it before picking a template.

use indexmap::IndexMap;

use crate::codegen::types::GenerationError;

/// What a parameter accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    /// Any expression
    Text,
    /// A number: a literal of ASCII digits, or anything computed at runtime
    Count,
}

impl ArgKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Count => "count",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ArgKind,
}

const fn text(name: &'static str) -> ParamSpec {
    ParamSpec { name, kind: ArgKind::Text }
}

const fn count(name: &'static str) -> ParamSpec {
    ParamSpec { name, kind: ArgKind::Count }
}

/// Identifies the shell template a builtin expands to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Print,
    FindNamespace,
    FindPod,
    ScalePodsInNamespaceTo,
    BashInto,
    TailLog,
    PortForward,
}

/// A builtin's contract. Required parameters come first in `params`,
/// followed by the optional ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSignature {
    pub name: &'static str,
    pub builtin: Builtin,
    pub required_args: usize,
    pub optional_args: usize,
    pub params: &'static [ParamSpec],
    pub description: &'static str,
}

impl FunctionSignature {
    pub fn max_args(&self) -> usize {
        self.required_args + self.optional_args
    }

    /// `name(a, b, [c])`
    pub fn usage(&self) -> String {
        let params: Vec<String> = self
            .params
            .iter()
            .enumerate()
            .map(|(i, p)| {
                if i < self.required_args {
                    p.name.to_string()
                } else {
                    format!("[{}]", p.name)
                }
            })
            .collect();
        format!("{}({})", self.name, params.join(", "))
    }
}

/// All builtins, in listing order.
pub static BUILTINS: &[FunctionSignature] = &[
    FunctionSignature {
        name: "print", builtin: Builtin::Print,
        required_args: 1, optional_args: 0,
        params: &[text("message")],
        description: "Echo a message",
    },
    FunctionSignature {
        name: "find_namespace", builtin: Builtin::FindNamespace,
        required_args: 1, optional_args: 0,
        params: &[text("query")],
        description: "Fuzzy match a namespace by name",
    },
    FunctionSignature {
        name: "find_pod", builtin: Builtin::FindPod,
        required_args: 1, optional_args: 1,
        params: &[text("query"), text("namespace")],
        description: "Fuzzy match a running pod by name",
    },
    FunctionSignature {
        name: "scale_pods_in_namespace_to", builtin: Builtin::ScalePodsInNamespaceTo,
        required_args: 2, optional_args: 0,
        params: &[text("namespace"), count("replicas")],
        description: "Scale every deployment in a namespace",
    },
    FunctionSignature {
        name: "bash_into", builtin: Builtin::BashInto,
        required_args: 1, optional_args: 1,
        params: &[text("pod"), text("namespace")],
        description: "Open an interactive shell in a pod",
    },
    FunctionSignature {
        name: "tail_log", builtin: Builtin::TailLog,
        required_args: 1, optional_args: 1,
        params: &[text("pod"), text("namespace")],
        description: "Follow a pod's log",
    },
    FunctionSignature {
        name: "port_forward", builtin: Builtin::PortForward,
        required_args: 3, optional_args: 1,
        params: &[text("pod"), count("local"), count("remote"), text("namespace")],
        description: "Forward a local port to a pod",
    },
];

/// Lookup table over a set of builtins.
#[derive(Debug, Clone)]
pub struct FunctionLibrary {
    entries: IndexMap<&'static str, &'static FunctionSignature>,
}

lazy_static::lazy_static! {
    static ref DEFAULT_LIBRARY: FunctionLibrary = FunctionLibrary::new(BUILTINS);
}

impl FunctionLibrary {
    pub fn new(signatures: &'static [FunctionSignature]) -> Self {
        let entries = signatures.iter().map(|s| (s.name, s)).collect();
        Self { entries }
    }

    /// The standard library, shared process-wide.
    pub fn builtin() -> &'static FunctionLibrary {
        &DEFAULT_LIBRARY
    }

    pub fn get(&self, name: &str) -> Option<&'static FunctionSignature> {
        self.entries.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static FunctionSignature> + '_ {
        self.entries.values().copied()
    }

    /// Look up `name` and check that `argc` arguments fit its signature.
    pub fn resolve(&self, name: &str, argc: usize) -> Result<&'static FunctionSignature, GenerationError> {
        let signature = self.get(name).ok_or_else(|| GenerationError::UnknownFunction {
            name: name.to_string(),
        })?;

        if argc < signature.required_args || argc > signature.max_args() {
            return Err(GenerationError::Arity {
                name: name.to_string(),
                got: argc,
                min: signature.required_args,
                max: signature.max_args(),
            });
        }

        Ok(signature)
    }
}
