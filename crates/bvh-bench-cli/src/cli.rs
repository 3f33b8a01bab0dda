use anyhow::Result;
use bvh_bench::{ConfigManager, SweepConfig};
use clap::{Args, Parser, Subcommand};
use console::style;
use std::path::PathBuf;

use crate::commands::collect::handle_collect;
use crate::commands::sweep::run_sweep;
use crate::logging::{setup_logging, LogLevel};

/// Exit status when every run of the sweep succeeded
pub const EXIT_OK: i32 = 0;
/// Exit status when at least one run recorded a fault
pub const EXIT_RUN_FAILURES: i32 = 1;
/// Exit status when the configuration could not be loaded
pub const EXIT_CONFIG_ERROR: i32 = 2;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    options: SweepOptions,

    #[arg(
        short,
        long,
        action = clap::ArgAction::Count,
        global = true,
        help = "Increase console log detail (-v debug, -vv trace)"
    )]
    verbose: u8,

    #[arg(
        long = "log-file",
        value_name = "FILE",
        global = true,
        help = "Also write debug logs to this file"
    )]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Args, Debug, Default)]
struct SweepOptions {
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Load the sweep configuration from a TOML file"
    )]
    config: Option<PathBuf>,

    #[arg(
        short,
        long,
        value_name = "QUANTITY",
        help = "Number of runs per model",
        long_help = "Number of times the benchmark is run for each model. Overrides the configuration file."
    )]
    runs: Option<usize>,

    #[arg(
        short,
        long,
        value_name = "MODELS",
        value_delimiter = ',',
        help = "Models to benchmark, in order (e.g. 'Cow,Dragon')",
        long_help = "Comma-separated list of models. Order decides the order of the sweep. Overrides the configuration file."
    )]
    models: Vec<String>,

    #[arg(
        short,
        long = "base-dir",
        value_name = "DIR",
        help = "Directory holding run.sh, the result files and the outputs"
    )]
    base_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Rebuild a time series from the per-run archive
    #[command(about = "Rebuild a time series CSV from statistics/")]
    Collect {
        #[arg(
            short,
            long,
            value_name = "FILE",
            default_value = "timeseries.csv",
            help = "Where to write the time series, relative to the base directory"
        )]
        output: PathBuf,
    },

    /// Print the effective configuration
    #[command(about = "Print the effective configuration as TOML")]
    Config,
}

fn resolve_config(options: &SweepOptions) -> Result<ConfigManager> {
    let mut config = match &options.config {
        Some(path) => SweepConfig::from(path.clone())?,
        None => SweepConfig::default(),
    };
    if let Some(runs) = options.runs {
        config.runs = runs;
    }
    if !options.models.is_empty() {
        config.models = options.models.clone();
    }
    if let Some(base_dir) = &options.base_dir {
        config.base_dir = base_dir.clone();
    }
    ConfigManager::new(config)
}

/// Parse arguments, run the requested command and return the process exit code.
pub fn cli() -> Result<i32> {
    let cli = Cli::parse();
    let _guard = setup_logging(
        LogLevel::from_verbosity(cli.verbose),
        cli.log_file.as_deref(),
    )?;

    let manager = match resolve_config(&cli.options) {
        Ok(manager) => manager,
        Err(e) => {
            eprintln!("{}: {:#}", style("Error").red().bold(), e);
            return Ok(EXIT_CONFIG_ERROR);
        }
    };

    match cli.command {
        Some(Command::Config) => {
            print!("{}", manager.config().to_string()?);
            Ok(EXIT_OK)
        }
        Some(Command::Collect { output }) => {
            let (path, rows) = handle_collect(manager.config(), &cli.options.models, &output)?;
            println!("Wrote {} rows to {}", rows, path.display());
            Ok(EXIT_OK)
        }
        None => {
            let report = run_sweep(manager);
            println!();
            println!("{}", report.summary());
            if report.all_succeeded() {
                println!("{}", style("All runs succeeded").green());
                Ok(EXIT_OK)
            } else {
                println!(
                    "{}",
                    style(format!(
                        "{} of {} runs failed",
                        report.failed_runs().count(),
                        report.runs.len()
                    ))
                    .red()
                );
                Ok(EXIT_RUN_FAILURES)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_no_arguments_runs_defaults() {
        let cli = Cli::try_parse_from(["bvh-bench"]).unwrap();
        assert!(cli.command.is_none());
        let manager = resolve_config(&cli.options).unwrap();
        assert_eq!(manager.config(), &SweepConfig::default());
    }

    #[test]
    fn test_flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "bvh-bench",
            "--runs",
            "3",
            "--models",
            "Face,Cow",
            "--base-dir",
            "/tmp/bench",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        let config = resolve_config(&cli.options).unwrap().into_config();
        assert_eq!(config.runs, 3);
        assert_eq!(config.models, vec!["Face", "Cow"]);
        assert_eq!(config.base_dir, PathBuf::from("/tmp/bench"));
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sweep.toml");
        fs::write(&path, "runs = 10\nmodels = [\"Car\"]\nsummary_filename = \"car.csv\"\n").unwrap();

        let cli = Cli::try_parse_from([
            "bvh-bench",
            "--config",
            path.to_str().unwrap(),
            "--runs",
            "2",
        ])
        .unwrap();
        let config = resolve_config(&cli.options).unwrap().into_config();
        assert_eq!(config.runs, 2);
        assert_eq!(config.models, vec!["Car"]);
        assert_eq!(config.summary_filename, "car.csv");
    }

    #[test]
    fn test_invalid_overrides_are_rejected() {
        let cli = Cli::try_parse_from(["bvh-bench", "--runs", "0"]).unwrap();
        assert!(resolve_config(&cli.options).is_err());
    }

    #[test]
    fn test_collect_subcommand() {
        let cli =
            Cli::try_parse_from(["bvh-bench", "--models", "Cow", "collect", "-o", "out.csv"])
                .unwrap();
        match cli.command {
            Some(Command::Collect { output }) => assert_eq!(output, PathBuf::from("out.csv")),
            _ => panic!("expected collect"),
        }
        assert_eq!(cli.options.models, vec!["Cow"]);
    }
}
