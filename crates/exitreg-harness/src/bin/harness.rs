//! CLI entrypoint for the exitreg scenario harness.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use exitreg_core::ExitRegistry;
use exitreg_harness::structured_log::{LogEmitter, validate_log_file};
use exitreg_harness::{HarnessError, ScenarioRunner, ScenarioSet, demo};

/// Scenario tooling for exitreg.
#[derive(Debug, Parser)]
#[command(name = "exitreg-harness")]
#[command(about = "Scenario runner for the exitreg exit-handler registry")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the canonical four-handler demo and print each call.
    Demo,
    /// Run a scenario set and report pass/fail per scenario.
    RunScenarios {
        /// Scenario set JSON path.
        #[arg(long)]
        scenarios: PathBuf,
        /// Output JSON report path (if omitted, prints to stdout).
        #[arg(long)]
        report: Option<PathBuf>,
        /// Structured JSONL log path.
        #[arg(long)]
        log: Option<PathBuf>,
        /// Campaign name used in trace ids.
        #[arg(long, default_value = "local")]
        campaign: String,
    },
    /// Validate a structured JSONL log produced by `run-scenarios`.
    ValidateLog {
        #[arg(long)]
        log: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Demo => {
            let registry = ExitRegistry::new();
            for line in demo::run_demo(&registry)? {
                println!("{line}");
            }
        }
        Command::RunScenarios {
            scenarios,
            report,
            log,
            campaign,
        } => {
            let set = ScenarioSet::from_file(&scenarios)?;
            let mut emitter = match &log {
                Some(path) => Some(LogEmitter::to_file(path, &campaign, "run-1")?),
                None => None,
            };
            let runner = ScenarioRunner::new(&campaign);
            let reports = runner.run_set(&set, emitter.as_mut())?;
            if let Some(emitter) = emitter.as_mut() {
                emitter.flush()?;
            }

            let json = serde_json::to_string_pretty(&reports)?;
            match report {
                Some(path) => {
                    eprintln!("Writing report to {}", path.display());
                    std::fs::write(&path, json)?;
                }
                None => println!("{json}"),
            }

            let failed = reports.iter().filter(|r| !r.passed).count();
            for r in reports.iter().filter(|r| !r.passed) {
                eprintln!("FAIL {}: {}", r.name, r.mismatches.join("; "));
            }
            eprintln!("{} passed, {failed} failed", reports.len() - failed);
            if failed > 0 {
                return Err(HarnessError::ScenariosFailed {
                    failed,
                    total: reports.len(),
                }
                .into());
            }
        }
        Command::ValidateLog { log } => {
            let (lines, errors) = validate_log_file(&log)?;
            for err in &errors {
                eprintln!("{err}");
            }
            eprintln!("{lines} lines, {} errors", errors.len());
            if !errors.is_empty() {
                return Err(HarnessError::InvalidLog {
                    count: errors.len(),
                }
                .into());
            }
        }
    }

    Ok(())
}
