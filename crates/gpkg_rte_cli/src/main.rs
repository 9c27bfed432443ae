//! Command-line driver for Related Tables Extension conformance checks.
//!
//! # Responsibility
//! - Open a container, run the conformance engine, print the report.
//! - Map outcomes onto stable exit codes.

use clap::{Parser, Subcommand};
use gpkg_rte_core::{
    builtin_classes, core_version, default_log_level, init_logging, open_container,
    Applicability, ConformanceService, SqliteCatalog, ValidationOptions, ValidationReport,
};
use log::error;
use std::path::PathBuf;
use std::process::ExitCode;

const EXIT_PASSED: u8 = 0;
const EXIT_FAILED: u8 = 1;
const EXIT_ERROR: u8 = 2;

#[derive(Parser)]
#[command(name = "gpkg-rte")]
#[command(about = "GeoPackage Related Tables Extension conformance checks")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate one GeoPackage container.
    Validate {
        path: PathBuf,
        /// Relation name of a requirements class to evaluate; repeatable.
        #[arg(long = "class")]
        classes: Vec<String>,
        /// JSON options file.
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long, default_value_t = false)]
        json: bool,
        #[arg(long)]
        log_level: Option<String>,
        /// Absolute directory for rolling log files; logging is off without it.
        #[arg(long)]
        log_dir: Option<String>,
    },
    /// List the built-in requirements classes.
    Classes,
    Version,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match cli.command {
        Commands::Validate {
            path,
            classes,
            config,
            json,
            log_level,
            log_dir,
        } => {
            if let Some(log_dir) = log_dir {
                let level = log_level.as_deref().unwrap_or(default_log_level());
                if let Err(message) = init_logging(level, &log_dir) {
                    eprintln!("error: {message}");
                    return ExitCode::from(EXIT_ERROR);
                }
            }
            match run_validate(path, classes, config, json) {
                Ok(code) => ExitCode::from(code),
                Err(message) => {
                    error!("event=cli_validate module=cli status=error error={message}");
                    eprintln!("error: {message}");
                    ExitCode::from(EXIT_ERROR)
                }
            }
        }
        Commands::Classes => {
            for class in builtin_classes() {
                println!(
                    "{:<18} {:<18} related data_type={}",
                    class.relation_name, class.name, class.related_data_type
                );
            }
            ExitCode::from(EXIT_PASSED)
        }
        Commands::Version => {
            println!("gpkg-rte {}", core_version());
            ExitCode::from(EXIT_PASSED)
        }
    }
}

fn run_validate(
    path: PathBuf,
    classes: Vec<String>,
    config: Option<PathBuf>,
    json: bool,
) -> Result<u8, String> {
    let mut options = match config {
        Some(config) => {
            ValidationOptions::from_json_file(&config).map_err(|err| err.to_string())?
        }
        None => ValidationOptions::default(),
    };
    if !classes.is_empty() {
        options = options.with_classes(classes);
    }
    options.validate().map_err(|err| err.to_string())?;

    let conn = open_container(&path).map_err(|err| err.to_string())?;
    let service = ConformanceService::new(SqliteCatalog::new(&conn));
    let report = service.validate(&options).map_err(|err| err.to_string())?;

    if json {
        println!(
            "{}",
            report.to_json_pretty().map_err(|err| err.to_string())?
        );
    } else {
        print_report(&path, &report);
    }

    Ok(if report.passed() {
        EXIT_PASSED
    } else {
        EXIT_FAILED
    })
}

fn print_report(path: &std::path::Path, report: &ValidationReport) {
    println!("container: {}", path.display());
    for class in &report.classes {
        match class.applicability {
            Applicability::Applicable => {
                let failures = class.verdicts.iter().filter(|v| !v.passed).count();
                println!("{:<18} applicable failures={failures}", class.relation_name);
            }
            Applicability::NotApplicable(reason) => {
                println!("{:<18} skipped ({})", class.relation_name, reason.as_str());
                if let Some(message) = class.not_used_message() {
                    println!("  {message}");
                }
            }
        }
        for verdict in &class.verdicts {
            println!("  {verdict}");
        }
    }
    println!("result: {}", if report.passed() { "PASS" } else { "FAIL" });
}

#[cfg(test)]
mod tests {
    use super::{Cli, Commands};
    use clap::Parser;

    #[test]
    fn parses_repeated_class_flags() {
        let cli = Cli::try_parse_from([
            "gpkg-rte",
            "validate",
            "sample.gpkg",
            "--class",
            "media",
            "--class",
            "simple_attributes",
            "--json",
        ])
        .expect("arguments should parse");

        match cli.command {
            Commands::Validate {
                path,
                classes,
                json,
                log_dir,
                ..
            } => {
                assert_eq!(path.to_str(), Some("sample.gpkg"));
                assert_eq!(classes, vec!["media", "simple_attributes"]);
                assert!(json);
                assert!(log_dir.is_none());
            }
            _ => panic!("expected validate command"),
        }
    }

    #[test]
    fn validate_requires_a_path() {
        assert!(Cli::try_parse_from(["gpkg-rte", "validate"]).is_err());
    }
}
