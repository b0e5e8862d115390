use clap::{Parser, ValueEnum};
use std::io::Read;
use std::path::PathBuf;

use kubescript::diff::check_generated;
use kubescript::{CompileError, Compiler, CompilerConfig, FunctionLibrary, Grammar, LiteralPolicy};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Emit {
    /// The generated shell function
    Shell,
    /// One token per line
    Tokens,
    /// The parsed syntax tree
    Ast,
    /// The effective configuration as TOML
    Config,
}

#[derive(Parser)]
#[command(name = "kubescript")]
#[command(about = "Compile kubescript files into shell functions")]
#[command(version)]
struct Cli {
    /// Compile the script given on the command line
    #[arg(short = 'c')]
    script: Option<String>,

    /// Config file (.toml, .yaml or .yml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Accept a bare list of statements instead of one function
    #[arg(long)]
    bare: bool,

    /// How string literals are embedded: escape, reject or verbatim
    #[arg(long)]
    literals: Option<LiteralPolicy>,

    /// Cluster CLI to call in generated commands
    #[arg(long = "cli")]
    cluster_cli: Option<String>,

    /// What to print
    #[arg(long, value_enum, default_value_t = Emit::Shell)]
    emit: Emit,

    /// Output results as JSON (output, error, exitCode)
    #[arg(long)]
    json: bool,

    /// Compare the generated shell with this file and print a diff
    #[arg(long)]
    check: Option<PathBuf>,

    /// List the builtin functions and exit
    #[arg(long = "list-builtins")]
    list_builtins: bool,

    /// Trace each compilation stage on stderr
    #[arg(long)]
    trace: bool,

    /// Script file to compile
    #[arg()]
    script_file: Option<String>,
}

fn fail_usage(message: &str) -> ! {
    eprintln!("kubescript: {}", message);
    std::process::exit(2);
}

fn read_script(cli: &Cli) -> String {
    if let Some(s) = &cli.script {
        return s.clone();
    }
    if let Some(file) = &cli.script_file {
        return match std::fs::read_to_string(file) {
            Ok(content) => content,
            Err(e) => fail_usage(&format!("cannot read script file: {}: {}", file, e)),
        };
    }

    use std::io::IsTerminal;
    if std::io::stdin().is_terminal() {
        fail_usage("no script provided. Use -c 'script', provide a script file, or pipe via stdin.");
    }
    let mut buf = String::new();
    if let Err(e) = std::io::stdin().read_to_string(&mut buf) {
        fail_usage(&format!("cannot read stdin: {}", e));
    }
    buf
}

fn load_config(cli: &Cli) -> CompilerConfig {
    let mut config = match &cli.config {
        Some(path) => match CompilerConfig::load(path) {
            Ok(config) => config,
            Err(e) => fail_usage(&e.to_string()),
        },
        None => CompilerConfig::default(),
    };

    if cli.bare {
        config.grammar = Grammar::Statements;
    }
    if let Some(policy) = cli.literals {
        config.literals = policy;
    }
    if let Some(name) = &cli.cluster_cli {
        config.cli = name.clone();
    }
    if let Err(e) = config.validate() {
        fail_usage(&e.to_string());
    }
    config
}

fn list_builtins(library: &FunctionLibrary) {
    let width = library.iter().map(|s| s.usage().len()).max().unwrap_or(0);
    for signature in library.iter() {
        println!("{:width$}  {}", signature.usage(), signature.description, width = width);
    }
}

/// Run the pipeline up to the stage `emit` asks for.
fn run(compiler: &Compiler, source: &str, emit: Emit, verbose: bool) -> Result<String, CompileError> {
    let trace = |message: String| {
        if verbose {
            eprintln!("+ {}", message);
        }
    };

    let tokens = compiler.tokenize(source)?;
    trace(format!("lex: {} tokens", tokens.len()));
    if emit == Emit::Tokens {
        let lines: Vec<String> = tokens
            .iter()
            .map(|t| format!("{}:{}\t{}\t{}", t.line, t.column, t.token_type, t.value))
            .collect();
        return Ok(lines.join("\n"));
    }

    let parsed = compiler.parse(tokens)?;
    trace(format!(
        "parse: {}, variables [{}]",
        parsed.root.kind(),
        parsed.variables.join(", ")
    ));
    if emit == Emit::Ast {
        return Ok(format!("{:#?}", parsed.root));
    }

    let output = compiler.generate(&parsed.root)?;
    trace(format!("generate: {} lines", output.lines().count()));
    Ok(output)
}

fn main() {
    let cli = Cli::parse();
    let compiler = Compiler::new(load_config(&cli));

    if cli.list_builtins {
        list_builtins(compiler.library());
        return;
    }
    if cli.emit == Emit::Config {
        match compiler.config().to_toml_string() {
            Ok(text) => print!("{}", text),
            Err(e) => fail_usage(&e.to_string()),
        }
        return;
    }

    let script = read_script(&cli);

    let result = run(&compiler, &script, cli.emit, cli.trace);

    let mut exit_code = if result.is_ok() { 0 } else { 1 };
    let mut diff = None;

    if let (Some(path), Ok(output)) = (&cli.check, &result) {
        let expected = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => fail_usage(&format!("cannot read {}: {}", path.display(), e)),
        };
        diff = check_generated(&path.display().to_string(), "generated", &expected, output);
        if diff.is_some() {
            exit_code = 1;
        }
    }

    if cli.json {
        let (output, error, stage) = match &result {
            Ok(output) => (Some(output.as_str()), None, None),
            Err(e) => (None, Some(e.to_string()), Some(e.stage())),
        };
        println!(
            "{}",
            serde_json::json!({
                "output": output,
                "error": error,
                "stage": stage,
                "diff": diff,
                "exitCode": exit_code,
            })
        );
    } else {
        match &result {
            Ok(output) if cli.check.is_none() => println!("{}", output),
            Ok(_) => {
                if let Some(diff) = &diff {
                    print!("{}", diff);
                }
            }
            Err(e) => eprintln!("kubescript: {}", e),
        }
    }

    std::process::exit(exit_code);
}
