mod commands;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "granska",
    version,
    about = "Extract findings and scores from store compliance audit reports"
)]
struct Cli {
    /// Log extraction decisions to stderr
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the report info and non-compliances from an audit PDF
    Parse {
        /// Path to the audit PDF
        input_file: PathBuf,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,

        /// Write the report to a JSON file
        #[arg(short = 'O', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,

        /// Engine config JSON file
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
    /// Run the engine on pre-extracted fragments (JSON array of pages)
    Extract {
        /// Path to the fragments JSON file
        fragments_file: PathBuf,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,

        /// Write the report to a JSON file
        #[arg(short = 'O', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,

        /// Engine config JSON file
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
    /// Print the reconstructed lines of a PDF or fragments file
    Lines {
        /// Path to a PDF or fragments JSON file
        input_file: PathBuf,

        /// Engine config JSON file
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
    /// Print the default engine config, or validate a config file
    Config {
        /// Config file to validate instead
        #[arg(long, value_name = "FILE")]
        validate: Option<PathBuf>,
    },
}

fn init_tracing(verbose: bool) {
    let filter = tracing_filter(std::env::var(EnvFilter::DEFAULT_ENV).ok().as_deref(), verbose);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// `RUST_LOG` (or `warn`) as the base, with `--verbose` adding debug output
/// from the engine on top.
fn tracing_filter(env: Option<&str>, verbose: bool) -> EnvFilter {
    let base = env.filter(|v| !v.trim().is_empty()).unwrap_or("warn");
    let with_verbose = |base: &str| {
        if verbose {
            format!("{base},granska_core=debug")
        } else {
            base.to_string()
        }
    };
    EnvFilter::try_new(with_verbose(base)).unwrap_or_else(|_| EnvFilter::new(with_verbose("warn")))
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Parse {
            input_file,
            output,
            out,
            config,
        } => commands::parse::run(input_file, &output, out, config),
        Commands::Extract {
            fragments_file,
            output,
            out,
            config,
        } => commands::extract::run(fragments_file, &output, out, config),
        Commands::Lines { input_file, config } => commands::lines::run(input_file, config),
        Commands::Config { validate } => match validate {
            Some(file) => commands::config::validate(&file),
            None => commands::config::show_default(),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_keeps_warnings_from_other_targets() {
        let filter = tracing_filter(None, true).to_string();
        assert!(filter.contains("granska_core=debug"));
        assert!(filter.contains("warn"));
    }

    #[test]
    fn test_verbose_applies_on_top_of_env() {
        let filter = tracing_filter(Some("info"), true).to_string();
        assert!(filter.contains("info"));
        assert!(filter.contains("granska_core=debug"));
    }

    #[test]
    fn test_quiet_uses_env_or_warn() {
        let quiet = tracing_filter(None, false).to_string();
        assert!(quiet.contains("warn") && !quiet.contains("granska_core"));
        assert!(!tracing_filter(Some("info"), false)
            .to_string()
            .contains("granska_core"));
    }
}
