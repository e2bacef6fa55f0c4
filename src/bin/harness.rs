//! solid-harness binary.
//!
//! Plays the driver role: builds a registry per scenario, registers variants
//! from the catalog and routes calls through it, printing what happens.
//!
//! # Environment Variables
//!
//! - `SOLID_SCENARIO_DIR`: scenarios run by a bare `run` (default: `scenarios`)
//! - `SOLID_CAPABILITY_DIR`: extra capability YAML files to declare
//! - `SOLID_NARRATE`: print every dispatch event (default: true)
//! - `RUST_LOG`: Tracing filter (default: "info")
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin solid-harness -- demo
//! cargo run --bin solid-harness -- run scenarios/shapes.yaml
//! ```

use std::sync::Arc;

use solid_dispatch::cli::{self, CliCommand};
use solid_dispatch::events::NarrationListener;
use solid_dispatch::scenario::ScenarioRunner;
use solid_dispatch::utilities::config::HarnessConfig;
use solid_dispatch::utilities::printer::Printer;
use solid_dispatch::variants::VariantCatalog;

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,solid_dispatch=debug".into()),
        )
        .init();

    let config = HarnessConfig::from_env();
    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(parsed) = cli::parse_args(&args) else {
        eprint!("{}", cli::usage());
        std::process::exit(2);
    };

    match parsed.command {
        CliCommand::Help => print!("{}", cli::usage()),
        CliCommand::Version => println!("solid-harness {}", solid_dispatch::VERSION),
        CliCommand::List => {
            let registry = cli::listing_registry(config.capability_dir.as_deref())?;
            for line in cli::catalog_lines(&registry, &VariantCatalog::with_builtins()) {
                println!("{}", line);
            }
        }
        CliCommand::Run | CliCommand::Demo => {
            let mut runner = ScenarioRunner::new();
            if let Some(dir) = &config.capability_dir {
                runner = runner.with_capability_dir(dir.clone());
            }
            if config.narrate {
                runner.add_listener(Arc::new(NarrationListener::new()));
            }

            let reports = if parsed.command == CliCommand::Demo {
                cli::run_bundled(&runner)?
            } else {
                let files = if parsed.files.is_empty() {
                    tracing::info!("Running scenarios from {}", config.scenario_dir.display());
                    cli::scenario_files(&config.scenario_dir)?
                } else {
                    parsed.files
                };
                cli::run_files(&runner, &files)?
            };

            let printer = Printer::new();
            for report in &reports {
                cli::print_report(&printer, report);
            }

            let failed = reports.iter().filter(|r| !r.passed()).count();
            if failed > 0 {
                anyhow::bail!(
                    "{} of {} scenario(s) did not behave as expected",
                    failed,
                    reports.len()
                );
            }
            tracing::info!("All {} scenario(s) behaved as expected", reports.len());
        }
    }

    Ok(())
}
