use clap::Parser;
use owo_colors::OwoColorize;
use serpent::ast::Stmt;
use serpent::cli::{generate_completions, Args, Commands};
use serpent::config::{init_tracing, AppConfig};
use serpent::diagnostic::{render_diagnostics, Diagnostic};
use serpent::interpreter::{parse_program, Interpreter};
use serpent::{json, repl};
use std::io;
use std::path::Path;
use std::process::ExitCode;
use tracing::debug;

fn main() -> ExitCode {
    let args = Args::parse();

    if let Some(Commands::Complete { shell }) = args.command {
        generate_completions(shell);
        return ExitCode::SUCCESS;
    }

    let config = AppConfig::from_args(&args);
    init_tracing(&config);

    run(&args, &config)
}

fn run(args: &Args, config: &AppConfig) -> ExitCode {
    if let Some(code) = &args.eval {
        debug!("running --eval input");
        return run_source(code, "<eval>", config);
    }

    if let Some(path) = &args.ast {
        debug!(path = %path.display(), "loading JSON AST");
        let origin = path.display().to_string();
        return match json::load_ast_file(path) {
            Ok(program) => execute(&program, "", &origin, config),
            Err(e) => report(&[e.to_diagnostic()], "", &origin, config),
        };
    }

    if let Some(path) = &args.script {
        debug!(path = %path.display(), "running script");
        return match read_file(path) {
            Ok(source) => run_source(&source, &path.display().to_string(), config),
            Err(e) => {
                error_message(config, &e);
                ExitCode::FAILURE
            }
        };
    }

    run_interactive_mode(config)
}

fn run_source(source: &str, origin: &str, config: &AppConfig) -> ExitCode {
    debug!(origin, bytes = source.len(), "parsing");
    match parse_program(source) {
        Ok(program) => execute(&program, source, origin, config),
        Err(diagnostics) => report(&diagnostics, source, origin, config),
    }
}

fn execute(program: &[Stmt], source: &str, origin: &str, config: &AppConfig) -> ExitCode {
    if config.dump_ast {
        return match json::program_to_json(program) {
            Ok(text) => {
                println!("{}", text);
                ExitCode::SUCCESS
            }
            Err(e) => {
                error_message(config, &format!("Failed to serialize AST: {}", e));
                ExitCode::FAILURE
            }
        };
    }

    debug!(statements = program.len(), "executing");
    let mut interpreter = Interpreter::standalone(config.interpreter);
    match interpreter.run(program) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => report(&[e.to_diagnostic()], source, origin, config),
    }
}

fn run_interactive_mode(config: &AppConfig) -> ExitCode {
    println!("Serpent {} interactive mode", env!("CARGO_PKG_VERSION"));
    println!("Type `exit` or `quit` to leave, `:env` to list globals.");

    let mut interpreter = Interpreter::standalone(config.interpreter);
    let stdin = io::stdin();
    let result = repl::run(
        &mut interpreter,
        stdin.lock(),
        &mut io::stdout(),
        &mut io::stderr(),
        config.color_enabled,
    );

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error_message(config, &format!("Error reading input: {}", e));
            ExitCode::FAILURE
        }
    }
}

fn report(diagnostics: &[Diagnostic], source: &str, origin: &str, config: &AppConfig) -> ExitCode {
    eprint!("{}", render_diagnostics(source, origin, diagnostics, config.color_enabled));
    ExitCode::FAILURE
}

fn read_file(path: &Path) -> Result<String, String> {
    std::fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", path.display(), e))
}

fn error_message(config: &AppConfig, message: &str) {
    if config.color_enabled {
        eprintln!("{}", message.red().bold());
    } else {
        eprintln!("{}", message);
    }
}
