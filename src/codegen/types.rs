//! Code generation errors

use thiserror::Error;

fn arg_range(min: &usize, max: &usize) -> String {
    if min == max {
        format!("{} argument{}", min, if *min == 1 { "" } else { "s" })
    } else {
        format!("{} to {} arguments", min, max)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("unknown function {name}, not in library")]
    UnknownFunction { name: String },

    #[error("{name} takes {} but got {got}", arg_range(.min, .max))]
    Arity {
        name: String,
        got: usize,
        min: usize,
        max: usize,
    },

    #[error("argument {param} of {function} must be a {expected}, got {found:?}")]
    InvalidArgument {
        function: String,
        param: String,
        expected: String,
        found: String,
    },

    #[error("string {value:?} contains unsafe character {character:?}")]
    UnsafeLiteral { value: String, character: char },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arity_messages() {
        let err = GenerationError::Arity {
            name: "port_forward".to_string(),
            got: 2,
            min: 3,
            max: 4,
        };
        assert_eq!(err.to_string(), "port_forward takes 3 to 4 arguments but got 2");

        let err = GenerationError::Arity {
            name: "print".to_string(),
            got: 0,
            min: 1,
            max: 1,
        };
        assert_eq!(err.to_string(), "print takes 1 argument but got 0");
    }
}
