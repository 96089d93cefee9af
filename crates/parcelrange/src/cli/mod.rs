//! Command-line interface for parcelrange.
//!
//! This module provides the CLI structure for the `prange` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    CheckCommand, ConfigCommand, ListCommand, NextCommand, OutputFormat, RegisterCommand,
    ReportCommand, StationsCommand, StatusCommand,
};

use crate::logging::Verbosity;

/// prange - Tracking numbers for parcel pickup stations
///
/// Every station owns a range of tracking numbers. prange hands out the
/// lowest free number in a station's range and records the package.
#[derive(Debug, Parser)]
#[command(name = "prange")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Path to the package database (overrides configuration)
    #[arg(long, global = true, value_name = "FILE")]
    pub database: Option<PathBuf>,

    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List stations with their ranges and next free number
    Stations(StationsCommand),

    /// Parse and validate a tracking code
    Check(CheckCommand),

    /// Show the next free tracking code at a station
    Next(NextCommand),

    /// Register a package
    Register(RegisterCommand),

    /// List registered packages
    List(ListCommand),

    /// Per-station package counts and quantity totals
    Report(ReportCommand),

    /// Show database status
    Status(StatusCommand),

    /// View configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.verbose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_name() {
        let cli = Cli::command();
        assert_eq!(cli.get_name(), "prange");
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_flags() {
        let cli = Cli::try_parse_from(["prange", "-q", "stations"]).unwrap();
        assert_eq!(cli.verbosity(), Verbosity::Quiet);

        let cli = Cli::try_parse_from(["prange", "stations"]).unwrap();
        assert_eq!(cli.verbosity(), Verbosity::Normal);

        let cli = Cli::try_parse_from(["prange", "-vv", "stations"]).unwrap();
        assert_eq!(cli.verbosity(), Verbosity::Debug);
    }

    #[test]
    fn test_parse_check() {
        let cli = Cli::try_parse_from(["prange", "check", "Embu-42"]).unwrap();
        match cli.command {
            Command::Check(cmd) => assert_eq!(cmd.code, "Embu-42"),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_register_with_quantities() {
        let cli = Cli::try_parse_from([
            "prange",
            "register",
            "Ugweri",
            "--boxes",
            "3",
            "--small-sacks",
            "1",
            "--receiver",
            "Achieng",
        ])
        .unwrap();

        match cli.command {
            Command::Register(cmd) => {
                assert_eq!(cmd.station, "Ugweri");
                assert!(cmd.number.is_none());
                assert_eq!(cmd.boxes, 3);
                assert_eq!(cmd.basins, 0);
                assert_eq!(cmd.small_sacks, 1);
                assert_eq!(cmd.receiver.as_deref(), Some("Achieng"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_register_rejects_negative_number() {
        let result = Cli::try_parse_from(["prange", "register", "Embu", "--number", "-4"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_list_defaults() {
        let cli = Cli::try_parse_from(["prange", "list"]).unwrap();
        match cli.command {
            Command::List(cmd) => {
                assert!(cmd.station.is_none());
                assert_eq!(cmd.limit, 20);
                assert_eq!(cmd.format, OutputFormat::Table);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_global_database() {
        let cli =
            Cli::try_parse_from(["prange", "next", "Embu", "--database", "/tmp/p.db"]).unwrap();
        assert_eq!(cli.database, Some(PathBuf::from("/tmp/p.db")));
        assert!(matches!(cli.command, Command::Next(_)));
    }

    #[test]
    fn test_parse_with_config() {
        let cli = Cli::try_parse_from(["prange", "-c", "/custom/config.toml", "report"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_parse_config_subcommand() {
        let cli = Cli::try_parse_from(["prange", "config", "show", "--json"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Config(ConfigCommand::Show { json: true })
        ));
    }
}
