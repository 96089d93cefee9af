//! CLI command definitions.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::package::{PackageDetails, Quantities};
use crate::register::RegisterRequest;

/// Stations command arguments.
#[derive(Debug, Args)]
pub struct StationsCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Check command arguments.
#[derive(Debug, Args)]
pub struct CheckCommand {
    /// Tracking code to check, e.g. "Embu-42"
    pub code: String,
}

/// Next command arguments.
#[derive(Debug, Args)]
pub struct NextCommand {
    /// Station to allocate from
    pub station: String,
}

/// Register command arguments.
#[derive(Debug, Args)]
pub struct RegisterCommand {
    /// Station registering the package
    pub station: String,

    /// Use this number instead of the next free one
    #[arg(short, long)]
    pub number: Option<u32>,

    /// Number of boxes
    #[arg(long, default_value = "0")]
    pub boxes: u32,

    /// Number of basins
    #[arg(long, default_value = "0")]
    pub basins: u32,

    /// Number of small sacks
    #[arg(long, default_value = "0")]
    pub small_sacks: u32,

    /// Sender name
    #[arg(long)]
    pub sender: Option<String>,

    /// Receiver name
    #[arg(long)]
    pub receiver: Option<String>,

    /// Receiver phone number
    #[arg(long)]
    pub phone: Option<String>,

    /// Destination
    #[arg(long)]
    pub destination: Option<String>,

    /// Output the stored package as JSON
    #[arg(short, long)]
    pub json: bool,
}

impl RegisterCommand {
    /// Build the registration request described by these arguments.
    #[must_use]
    pub fn to_request(&self) -> RegisterRequest {
        RegisterRequest {
            station: self.station.clone(),
            number: self.number,
            quantities: Quantities::new(self.boxes, self.basins, self.small_sacks),
            details: PackageDetails {
                sender_name: self.sender.clone(),
                receiver_name: self.receiver.clone(),
                receiver_phone: self.phone.clone(),
                destination: self.destination.clone(),
            },
        }
    }
}

/// List command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Only packages registered at this station
    #[arg(short, long)]
    pub station: Option<String>,

    /// Maximum number of results
    #[arg(short, long, default_value = "20")]
    pub limit: usize,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Report command arguments.
#[derive(Debug, Args)]
pub struct ReportCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// One tracking code per line
    #[default]
    Plain,
    /// Formatted table
    Table,
    /// JSON output
    Json,
}
