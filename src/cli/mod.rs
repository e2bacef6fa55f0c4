//! CLI module for the `solid-harness` binary.
//!
//! Provides command parsing and the work behind each command: running
//! scenario files, running the bundled demo, and listing what the registry
//! and catalog offer.

use std::path::{Path, PathBuf};

use crate::capabilities::{CapabilityRegistry, DispatchError};
use crate::scenario::{ScenarioError, ScenarioReport, ScenarioRunner, BUNDLED};
use crate::utilities::printer::{ColoredText, Printer, PrinterColor};
use crate::variants::VariantCatalog;

/// Available CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliCommand {
    /// Run scenario files (or every file in the scenario directory).
    Run,
    /// Run the scenarios bundled with the crate.
    Demo,
    /// List capabilities and variant kinds.
    List,
    /// Show version information.
    Version,
    /// Show usage.
    Help,
}

impl std::fmt::Display for CliCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Run => write!(f, "run"),
            Self::Demo => write!(f, "demo"),
            Self::List => write!(f, "list"),
            Self::Version => write!(f, "version"),
            Self::Help => write!(f, "help"),
        }
    }
}

/// Parse a CLI command from a string.
pub fn parse_command(cmd: &str) -> Option<CliCommand> {
    match cmd {
        "run" => Some(CliCommand::Run),
        "demo" => Some(CliCommand::Demo),
        "list" | "ls" => Some(CliCommand::List),
        "version" | "--version" | "-v" => Some(CliCommand::Version),
        "help" | "--help" | "-h" => Some(CliCommand::Help),
        _ => None,
    }
}

/// A parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub command: CliCommand,
    pub files: Vec<PathBuf>,
}

/// Parse the arguments after the program name.
///
/// No arguments means `help`. Only `run` accepts file arguments.
pub fn parse_args<S: AsRef<str>>(args: &[S]) -> Option<CliArgs> {
    let Some((first, rest)) = args.split_first() else {
        return Some(CliArgs {
            command: CliCommand::Help,
            files: Vec::new(),
        });
    };
    let command = parse_command(first.as_ref())?;
    if command != CliCommand::Run && !rest.is_empty() {
        return None;
    }
    Some(CliArgs {
        command,
        files: rest.iter().map(|a| PathBuf::from(a.as_ref())).collect(),
    })
}

pub fn usage() -> &'static str {
    "Usage: solid-harness <command>\n\
     \n\
     Commands:\n\
     \x20 run [FILE...]   run scenario files (default: every file in SOLID_SCENARIO_DIR)\n\
     \x20 demo            run the bundled scenarios\n\
     \x20 list            list capabilities and variant kinds\n\
     \x20 version         show version information\n"
}

/// YAML files directly under `dir`, sorted.
pub fn scenario_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .map_or(false, |ext| ext == "yaml" || ext == "yml")
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Run each file in order. A file that cannot be loaded stops the run.
pub fn run_files(
    runner: &ScenarioRunner,
    files: &[PathBuf],
) -> Result<Vec<ScenarioReport>, ScenarioError> {
    files
        .iter()
        .map(|path| {
            log::debug!("Loading scenario {}", path.display());
            runner.run_file(path)
        })
        .collect()
}

/// Run every bundled scenario.
pub fn run_bundled(runner: &ScenarioRunner) -> Result<Vec<ScenarioReport>, ScenarioError> {
    BUNDLED
        .iter()
        .map(|(file, yaml)| {
            log::debug!("Running bundled scenario {}", file);
            runner.run_yaml(yaml)
        })
        .collect()
}

/// Print a report: one line per step, then the summary.
pub fn print_report(printer: &Printer, report: &ScenarioReport) {
    printer.print(&format!("\n== {} ==", report.name), PrinterColor::BoldPurple);
    if !report.description.is_empty() {
        printer.print(&report.description, PrinterColor::White);
    }
    for outcome in &report.outcomes {
        let (mark, color) = if outcome.passed {
            ("PASS", PrinterColor::Green)
        } else {
            ("FAIL", PrinterColor::BoldRed)
        };
        printer.print_colored(&[
            ColoredText::new(format!("{:>3}. {} ", outcome.index, mark), color),
            ColoredText::new(format!("{:<48}", outcome.action), PrinterColor::White),
            ColoredText::new(
                format!(" expected {}, got {}", outcome.expected, outcome.observed),
                PrinterColor::Cyan,
            ),
        ]);
    }
    let color = if report.passed() {
        PrinterColor::BoldGreen
    } else {
        PrinterColor::BoldRed
    };
    printer.print(&report.summary(), color);
}

/// Describe every declared capability and every catalog kind.
pub fn catalog_lines(registry: &CapabilityRegistry, catalog: &VariantCatalog) -> Vec<String> {
    let mut lines = vec!["Capabilities:".to_string()];
    for capability in registry.list_capabilities() {
        let methods: Vec<String> = capability.methods.iter().map(|m| m.key()).collect();
        lines.push(format!(
            "  {:<14} {:<40} {}",
            capability.name,
            methods.join(", "),
            capability.description
        ));
    }
    lines.push("Variant kinds:".to_string());
    lines.extend(catalog.kinds().into_iter().map(|kind| format!("  {}", kind)));
    lines
}

/// Registry with the built-in capabilities plus any found under `capability_dir`.
pub fn listing_registry(capability_dir: Option<&Path>) -> Result<CapabilityRegistry, DispatchError> {
    let mut registry = CapabilityRegistry::with_builtins()?;
    if let Some(dir) = capability_dir {
        registry.load_directory(dir)?;
    }
    Ok(registry)
}
