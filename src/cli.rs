use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "serpent")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Serpent scripting language interpreter", long_about = None)]
pub struct Args {
    /// Script to run. Starts the REPL when omitted.
    #[arg(value_name = "SCRIPT")]
    pub script: Option<PathBuf>,

    #[arg(short, long, value_name = "CODE", conflicts_with_all = ["script", "ast"])]
    pub eval: Option<String>,

    /// Run a program given as a JSON AST.
    #[arg(long, value_name = "FILE", conflicts_with = "script")]
    pub ast: Option<PathBuf>,

    /// Print the parsed program as JSON instead of running it.
    #[arg(long = "dump-ast")]
    pub dump_ast: bool,

    #[arg(long = "color", value_name = "WHEN", default_value = "auto")]
    pub color: ColorChoice,

    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    #[arg(long = "max-depth", value_name = "N")]
    pub max_depth: Option<usize>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate shell completions.
    Complete {
        #[arg(value_name = "SHELL")]
        shell: Shell,
    },
}

#[derive(Debug, Clone, Copy)]
pub enum ColorChoice {
    Auto,
    Always,
    Never,
}

impl std::str::FromStr for ColorChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(ColorChoice::Auto),
            "always" => Ok(ColorChoice::Always),
            "never" => Ok(ColorChoice::Never),
            _ => Err(format!(
                "Invalid color choice: {}. Must be 'auto', 'always', or 'never'",
                s
            )),
        }
    }
}

pub fn generate_completions(shell: Shell) {
    let mut cmd = Args::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, &bin_name, &mut io::stdout());
}
