//! Shell code generator
//!
//! Walks the AST and renders it as shell text. Library calls are validated
//! against a `FunctionLibrary` and expanded through a fixed template per
//! builtin. Generation is a pure function of the tree and the config.

use crate::ast::types::{AssignValue, CallNode, FunctionDefNode, Node, VarAssignNode};
use crate::codegen::library::{ArgKind, Builtin, FunctionLibrary, FunctionSignature};
use crate::codegen::quoting::{first_unsafe_char, quote_value};
use crate::codegen::types::GenerationError;
use crate::config::{CompilerConfig, LiteralPolicy};

/// Reads one line from the terminal and yields it.
pub const PROMPT: &str = "$(read temp && echo $temp)";

/// `-n <value> ` when a namespace is given, otherwise nothing.
pub fn namespace_flag(namespace: Option<&str>) -> String {
    match namespace {
        Some(ns) => format!("-n {} ", ns),
        None => String::new(),
    }
}

pub struct Generator<'a> {
    library: &'a FunctionLibrary,
    config: &'a CompilerConfig,
    /// Assignments found in argument position, waiting to be emitted ahead
    /// of the statement that contains them
    hoisted: Vec<String>,
}

impl<'a> Generator<'a> {
    pub fn new(library: &'a FunctionLibrary, config: &'a CompilerConfig) -> Self {
        Self {
            library,
            config,
            hoisted: Vec::new(),
        }
    }

    /// Render a whole tree.
    pub fn generate(&mut self, root: &Node) -> Result<String, GenerationError> {
        self.hoisted.clear();
        match root {
            Node::FunctionDef(def) => self.gen_function_def(def),
            Node::Program(program) => {
                Ok(self.gen_statements(&program.statements, "")?.join("\n"))
            }
            statement => Ok(self.gen_statements(std::slice::from_ref(statement), "")?.join("\n")),
        }
    }

    fn gen_function_def(&mut self, def: &FunctionDefNode) -> Result<String, GenerationError> {
        let config = self.config;
        let indent = config.indent.as_str();
        let mut lines = vec![format!("function {}() {{", def.name)];

        // Shell functions only have positional parameters.
        for (i, param) in def.params.iter().enumerate() {
            lines.push(format!("{}local {}=\"${}\"", indent, param, i + 1));
        }
        lines.extend(self.gen_statements(&def.body, indent)?);
        lines.push("}".to_string());

        Ok(lines.join("\n"))
    }

    /// One output line per statement, preceded by anything it hoisted.
    fn gen_statements(&mut self, statements: &[Node], indent: &str) -> Result<Vec<String>, GenerationError> {
        let mut lines = Vec::new();
        for statement in statements {
            let line = self.gen(statement)?;
            for hoisted in self.hoisted.drain(..) {
                lines.push(format!("{}{}", indent, hoisted));
            }
            lines.push(format!("{}{}", indent, line));
        }
        Ok(lines)
    }

    fn gen(&mut self, node: &Node) -> Result<String, GenerationError> {
        match node {
            Node::FunctionDef(def) => self.gen_function_def(def),
            Node::Program(program) => Ok(self.gen_statements(&program.statements, "")?.join("\n")),
            Node::Prompt => Ok(PROMPT.to_string()),
            Node::VarAssign(assign) => self.gen_var_assign(assign),
            Node::VarRef(var) => Ok(format!("${}", var.name)),
            Node::StringLiteral(lit) => self.render_literal(&lit.value),
            Node::Call(call) => self.gen_call(call),
        }
    }

    fn gen_var_assign(&mut self, assign: &VarAssignNode) -> Result<String, GenerationError> {
        let value = match &assign.value {
            AssignValue::Call(call) => format!("$({})", self.gen_call(call)?),
            AssignValue::Literal(lit) => self.render_literal(&lit.value)?,
            AssignValue::Prompt => PROMPT.to_string(),
        };
        Ok(format!("{}={}", assign.name, value))
    }

    /// Render an expression used as a call argument. Nested calls become
    /// command substitutions; assignments are hoisted and leave their
    /// variable behind.
    fn gen_argument(&mut self, node: &Node) -> Result<String, GenerationError> {
        match node {
            Node::Call(call) => Ok(format!("$({})", self.gen_call(call)?)),
            Node::VarAssign(assign) => {
                let line = self.gen_var_assign(assign)?;
                self.hoisted.push(line);
                Ok(format!("${}", assign.name))
            }
            other => self.gen(other),
        }
    }

    fn gen_optional_argument(&mut self, node: Option<&Node>) -> Result<Option<String>, GenerationError> {
        node.map(|n| self.gen_argument(n)).transpose()
    }

    fn render_literal(&self, value: &str) -> Result<String, GenerationError> {
        match self.config.literals {
            LiteralPolicy::Escape => Ok(quote_value(value)),
            LiteralPolicy::Reject => {
                if let Some(character) = first_unsafe_char(value) {
                    return Err(GenerationError::UnsafeLiteral {
                        value: value.to_string(),
                        character,
                    });
                }
                if value.is_empty() || value.contains(' ') {
                    Ok(format!("\"{}\"", value))
                } else {
                    Ok(value.to_string())
                }
            }
            LiteralPolicy::Verbatim => Ok(value.to_string()),
        }
    }

    fn check_argument_kinds(&self, signature: &FunctionSignature, args: &[Node]) -> Result<(), GenerationError> {
        for (arg, param) in args.iter().zip(signature.params) {
            if param.kind != ArgKind::Count {
                continue;
            }
            if let Node::StringLiteral(lit) = arg {
                if lit.value.is_empty() || !lit.value.chars().all(|c| c.is_ascii_digit()) {
                    return Err(GenerationError::InvalidArgument {
                        function: signature.name.to_string(),
                        param: param.name.to_string(),
                        expected: param.kind.as_str().to_string(),
                        found: lit.value.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    fn gen_call(&mut self, call: &CallNode) -> Result<String, GenerationError> {
        let signature = self.library.resolve(&call.name, call.args.len())?;
        self.check_argument_kinds(signature, &call.args)?;

        let config = self.config;
        let cli = config.cli.as_str();
        let args = &call.args;

        let command = match signature.builtin {
            Builtin::Print => match &args[0] {
                Node::StringLiteral(lit) if config.literals == LiteralPolicy::Verbatim => {
                    format!("echo \"{}\"", lit.value)
                }
                message => format!("echo {}", self.gen_argument(message)?),
            },
            Builtin::FindNamespace => {
                let query = self.gen_argument(&args[0])?;
                format!("{} get ns | grep {} | grep -o '^[a-z0-9-]\\+'", cli, query)
            }
            Builtin::FindPod => {
                let query = self.gen_argument(&args[0])?;
                let ns = self.gen_optional_argument(args.get(1))?;
                format!(
                    "{} {}get pods | grep {} | grep Running | head -n 1 | grep -o '^[a-z0-9-]\\+'",
                    cli,
                    namespace_flag(ns.as_deref()),
                    query
                )
            }
            Builtin::ScalePodsInNamespaceTo => {
                let ns = self.gen_argument(&args[0])?;
                let replicas = self.gen_argument(&args[1])?;
                format!("{} scale deploy -n {} --replicas={} --all", cli, ns, replicas)
            }
            Builtin::BashInto => {
                let pod = self.gen_argument(&args[0])?;
                let ns = self.gen_optional_argument(args.get(1))?;
                format!(
                    "{} exec {}-it {} -- {}",
                    cli,
                    namespace_flag(ns.as_deref()),
                    pod,
                    config.shell
                )
            }
            Builtin::TailLog => {
                let pod = self.gen_argument(&args[0])?;
                let ns = self.gen_optional_argument(args.get(1))?;
                format!("{} {}logs {} -f", cli, namespace_flag(ns.as_deref()), pod)
            }
            Builtin::PortForward => {
                let pod = self.gen_argument(&args[0])?;
                let local = self.gen_argument(&args[1])?;
                let remote = self.gen_argument(&args[2])?;
                let ns = self.gen_optional_argument(args.get(3))?;
                format!(
                    "{} port-forward {}{} {}:{}",
                    cli,
                    namespace_flag(ns.as_deref()),
                    pod,
                    local,
                    remote
                )
            }
        };

        Ok(command)
    }
}

/// Render `root` with the builtin library.
pub fn generate(root: &Node, config: &CompilerConfig) -> Result<String, GenerationError> {
    Generator::new(FunctionLibrary::builtin(), config).generate(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::types::AST;

    fn gen_with(root: &Node, config: &CompilerConfig) -> Result<String, GenerationError> {
        generate(root, config)
    }

    fn gen_one(node: Node) -> Result<String, GenerationError> {
        gen_with(&AST::program(vec![node]), &CompilerConfig::default())
    }

    fn lit(value: &str) -> AssignValue {
        AssignValue::Literal(AST::literal_node(value))
    }

    #[test]
    fn test_namespace_flag() {
        assert_eq!(namespace_flag(Some("prod")), "-n prod ");
        assert_eq!(namespace_flag(None), "");
    }

    #[test]
    fn test_function_wrapper() {
        let root = AST::function_def(
            "main",
            vec![],
            vec![AST::assign("NS", lit("prod")), AST::assign("IN", AssignValue::Prompt)],
        );
        assert_eq!(
            gen_with(&root, &CompilerConfig::default()).unwrap(),
            "function main() {\n  NS=prod\n  IN=$(read temp && echo $temp)\n}"
        );
    }

    #[test]
    fn test_empty_function() {
        let root = AST::function_def("noop", vec![], vec![]);
        assert_eq!(
            gen_with(&root, &CompilerConfig::default()).unwrap(),
            "function noop() {\n}"
        );
    }

    #[test]
    fn test_params_bind_positionals() {
        let root = AST::function_def("f", vec!["env".to_string(), "region".to_string()], vec![]);
        assert_eq!(
            gen_with(&root, &CompilerConfig::default()).unwrap(),
            "function f() {\n  local env=\"$1\"\n  local region=\"$2\"\n}"
        );
    }

    #[test]
    fn test_assign_from_call_uses_substitution() {
        let node = AST::assign(
            "NS",
            AssignValue::Call(AST::call_node("find_namespace", vec![AST::string("web")])),
        );
        assert_eq!(
            gen_one(node).unwrap(),
            "NS=$(kubectl get ns | grep web | grep -o '^[a-z0-9-]\\+')"
        );
    }

    #[test]
    fn test_var_ref_and_prompt() {
        assert_eq!(gen_one(AST::var_ref("POD")).unwrap(), "$POD");
        assert_eq!(gen_one(Node::Prompt).unwrap(), PROMPT);
    }

    #[test]
    fn test_print_variants() {
        assert_eq!(
            gen_one(AST::call("print", vec![AST::string("Enter a namespace")])).unwrap(),
            "echo 'Enter a namespace'"
        );
        assert_eq!(
            gen_one(AST::call("print", vec![AST::var_ref("NS")])).unwrap(),
            "echo $NS"
        );

        let config = CompilerConfig {
            literals: LiteralPolicy::Verbatim,
            ..Default::default()
        };
        let root = AST::program(vec![AST::call("print", vec![AST::string("Enter a namespace")])]);
        assert_eq!(gen_with(&root, &config).unwrap(), "echo \"Enter a namespace\"");
    }

    #[test]
    fn test_find_pod_with_and_without_namespace() {
        assert_eq!(
            gen_one(AST::call("find_pod", vec![AST::string("web")])).unwrap(),
            "kubectl get pods | grep web | grep Running | head -n 1 | grep -o '^[a-z0-9-]\\+'"
        );
        assert_eq!(
            gen_one(AST::call("find_pod", vec![AST::string("web"), AST::var_ref("NS")])).unwrap(),
            "kubectl -n $NS get pods | grep web | grep Running | head -n 1 | grep -o '^[a-z0-9-]\\+'"
        );
    }

    #[test]
    fn test_scale_and_logs() {
        assert_eq!(
            gen_one(AST::call(
                "scale_pods_in_namespace_to",
                vec![AST::var_ref("NS"), AST::string("3")]
            ))
            .unwrap(),
            "kubectl scale deploy -n $NS --replicas=3 --all"
        );
        assert_eq!(
            gen_one(AST::call("tail_log", vec![AST::var_ref("POD")])).unwrap(),
            "kubectl logs $POD -f"
        );
        assert_eq!(
            gen_one(AST::call("tail_log", vec![AST::var_ref("POD"), AST::string("prod")])).unwrap(),
            "kubectl -n prod logs $POD -f"
        );
    }

    #[test]
    fn test_bash_into() {
        assert_eq!(
            gen_one(AST::call("bash_into", vec![AST::string("web-1"), AST::string("prod")])).unwrap(),
            "kubectl exec -n prod -it web-1 -- /bin/bash"
        );
        assert_eq!(
            gen_one(AST::call("bash_into", vec![AST::string("web-1")])).unwrap(),
            "kubectl exec -it web-1 -- /bin/bash"
        );
    }

    #[test]
    fn test_port_forward_arity() {
        let three = AST::call(
            "port_forward",
            vec![AST::string("web"), AST::string("8080"), AST::string("80")],
        );
        assert_eq!(gen_one(three).unwrap(), "kubectl port-forward web 8080:80");

        let four = AST::call(
            "port_forward",
            vec![
                AST::string("web"),
                AST::string("8080"),
                AST::string("80"),
                AST::string("prod"),
            ],
        );
        assert_eq!(gen_one(four).unwrap(), "kubectl port-forward -n prod web 8080:80");

        let two = AST::call("port_forward", vec![AST::string("a"), AST::string("b")]);
        assert!(matches!(
            gen_one(two),
            Err(GenerationError::Arity { got: 2, min: 3, max: 4, .. })
        ));
    }

    #[test]
    fn test_count_argument_kind() {
        let bad = AST::call(
            "scale_pods_in_namespace_to",
            vec![AST::string("prod"), AST::string("three")],
        );
        match gen_one(bad) {
            Err(GenerationError::InvalidArgument { param, found, .. }) => {
                assert_eq!(param, "replicas");
                assert_eq!(found, "three");
            }
            other => panic!("unexpected {:?}", other),
        }

        let runtime = AST::call(
            "scale_pods_in_namespace_to",
            vec![AST::string("prod"), AST::var_ref("COUNT")],
        );
        assert!(gen_one(runtime).is_ok());
    }

    #[test]
    fn test_unknown_function() {
        let err = gen_one(AST::call("frobnicate", vec![AST::string("1")])).unwrap_err();
        assert_eq!(
            err,
            GenerationError::UnknownFunction {
                name: "frobnicate".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_function_nested_in_assignment() {
        let node = AST::assign("X", AssignValue::Call(AST::call_node("nope", vec![])));
        assert!(matches!(
            gen_one(node),
            Err(GenerationError::UnknownFunction { .. })
        ));
    }

    #[test]
    fn test_nested_call_argument() {
        let node = AST::call(
            "bash_into",
            vec![AST::call("find_pod", vec![AST::string("web")])],
        );
        assert_eq!(
            gen_one(node).unwrap(),
            "kubectl exec -it $(kubectl get pods | grep web | grep Running | head -n 1 | grep -o '^[a-z0-9-]\\+') -- /bin/bash"
        );
    }

    #[test]
    fn test_assignment_argument_is_hoisted() {
        let root = AST::function_def(
            "main",
            vec![],
            vec![AST::call(
                "tail_log",
                vec![AST::assign("POD", lit("web-1")), AST::assign("NS", lit("prod"))],
            )],
        );
        assert_eq!(
            gen_with(&root, &CompilerConfig::default()).unwrap(),
            "function main() {\n  POD=web-1\n  NS=prod\n  kubectl -n $NS logs $POD -f\n}"
        );
    }

    #[test]
    fn test_literal_policies() {
        let root = AST::program(vec![AST::assign("MSG", lit("a; rm -rf /"))]);

        let escaped = gen_with(&root, &CompilerConfig::default()).unwrap();
        assert_eq!(escaped, "MSG='a; rm -rf /'");

        let reject = CompilerConfig {
            literals: LiteralPolicy::Reject,
            ..Default::default()
        };
        assert_eq!(
            gen_with(&root, &reject).unwrap_err(),
            GenerationError::UnsafeLiteral {
                value: "a; rm -rf /".to_string(),
                character: ';',
            }
        );
        let spaced = AST::program(vec![AST::assign("MSG", lit("hello there"))]);
        assert_eq!(gen_with(&spaced, &reject).unwrap(), "MSG=\"hello there\"");

        let verbatim = CompilerConfig {
            literals: LiteralPolicy::Verbatim,
            ..Default::default()
        };
        assert_eq!(gen_with(&root, &verbatim).unwrap(), "MSG=a; rm -rf /");
    }

    #[test]
    fn test_custom_cli_and_shell() {
        let config = CompilerConfig {
            cli: "oc".to_string(),
            shell: "/bin/sh".to_string(),
            indent: "\t".to_string(),
            ..Default::default()
        };
        let root = AST::function_def(
            "main",
            vec![],
            vec![AST::call("bash_into", vec![AST::string("web")])],
        );
        assert_eq!(
            gen_with(&root, &config).unwrap(),
            "function main() {\n\toc exec -it web -- /bin/sh\n}"
        );
    }

    #[test]
    fn test_custom_library() {
        static ONLY_PRINT: &[FunctionSignature] = &[FunctionSignature {
            name: "print",
            builtin: Builtin::Print,
            required_args: 1,
            optional_args: 0,
            params: &[crate::codegen::library::ParamSpec {
                name: "message",
                kind: ArgKind::Text,
            }],
            description: "Echo a message",
        }];
        let library = FunctionLibrary::new(ONLY_PRINT);
        let config = CompilerConfig::default();
        let root = AST::program(vec![AST::call("tail_log", vec![AST::string("web")])]);
        let err = Generator::new(&library, &config).generate(&root).unwrap_err();
        assert!(matches!(err, GenerationError::UnknownFunction { .. }));
    }
}
