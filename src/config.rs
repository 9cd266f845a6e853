use std::sync::Once;

use crate::cli::{Args, ColorChoice};

/// Environment variable holding an `EnvFilter` directive, e.g. `serpent=trace`.
pub const LOG_ENV: &str = "SERPENT_LOG";

pub const DEFAULT_MAX_CALL_DEPTH: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterpreterConfig {
    /// Nested calls allowed before `RecursionLimit` is raised.
    pub max_call_depth: usize,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }
}

pub struct AppConfig {
    pub color_enabled: bool,
    pub verbosity: u8,
    pub dump_ast: bool,
    pub interpreter: InterpreterConfig,
}

impl AppConfig {
    pub fn from_args(args: &Args) -> Self {
        let color_enabled = match args.color {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => atty::is(atty::Stream::Stderr) && atty::is(atty::Stream::Stdout),
        };

        let mut interpreter = InterpreterConfig::default();
        if let Some(depth) = args.max_depth {
            interpreter.max_call_depth = depth;
        }

        AppConfig {
            color_enabled,
            verbosity: args.verbose,
            dump_ast: args.dump_ast,
            interpreter,
        }
    }

    /// Filter directive used when `SERPENT_LOG` is unset.
    pub fn default_log_filter(&self) -> &'static str {
        match self.verbosity {
            0 => "warn",
            1 => "serpent=debug",
            _ => "serpent=trace",
        }
    }
}

static TRACING_INIT: Once = Once::new();

/// Install the stderr subscriber. Later calls are no-ops.
pub fn init_tracing(config: &AppConfig) {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        let filter = EnvFilter::try_from_env(LOG_ENV)
            .unwrap_or_else(|_| EnvFilter::new(config.default_log_filter()));
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_level(true)
                    .with_ansi(config.color_enabled),
            )
            .with(filter)
            .init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["serpent", "--color", "never"]);
        let config = AppConfig::from_args(&args);
        assert!(!config.color_enabled);
        assert_eq!(config.interpreter.max_call_depth, DEFAULT_MAX_CALL_DEPTH);
        assert_eq!(config.default_log_filter(), "warn");
    }

    #[test]
    fn test_verbosity_and_depth() {
        let args = Args::parse_from(["serpent", "-vv", "--max-depth", "32", "--color", "always"]);
        let config = AppConfig::from_args(&args);
        assert!(config.color_enabled);
        assert_eq!(config.interpreter.max_call_depth, 32);
        assert_eq!(config.default_log_filter(), "serpent=trace");
    }
}
