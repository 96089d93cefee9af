//! `prange` - CLI for parcelrange
//!
//! This binary provides the command-line interface for allocating tracking
//! numbers and recording packages.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use parcelrange::allocator::{issued_numbers, next_free_number};
use parcelrange::cli::{
    CheckCommand, Cli, Command, ConfigCommand, ListCommand, OutputFormat, RegisterCommand,
};
use parcelrange::{
    init_logging, parse_tracking_code, register, suggest, Config, Package, PackageStore, Report,
    Storage,
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    let mut config = Config::load_from(cli.config.clone()).context("loading configuration")?;
    if let Some(database) = cli.database.clone() {
        config.storage.database_path = Some(database);
    }

    match cli.command {
        Command::Stations(cmd) => handle_stations(&config, cmd.json),
        Command::Check(cmd) => handle_check(&config, &cmd),
        Command::Next(cmd) => handle_next(&config, &cmd.station),
        Command::Register(cmd) => handle_register(&config, &cmd),
        Command::List(cmd) => handle_list(&config, &cmd),
        Command::Report(cmd) => handle_report(&config, cmd.json),
        Command::Status(cmd) => handle_status(&config, cmd.json),
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

fn open_storage(config: &Config) -> Result<Storage> {
    let path = config.database_path();
    Storage::open(&path).with_context(|| format!("opening package database {}", path.display()))
}

/// One line of the `stations` listing.
#[derive(Debug, Serialize)]
struct StationRow {
    name: String,
    range_min: u32,
    range_max: u32,
    issued: usize,
    next: Option<String>,
}

fn handle_stations(config: &Config, json: bool) -> Result<()> {
    let storage = open_storage(config)?;
    let codes = storage.tracking_codes()?;

    let rows: Vec<StationRow> = config
        .stations
        .iter()
        .map(|station| {
            let issued = issued_numbers(station, codes.iter().map(String::as_str));
            StationRow {
                name: station.name.clone(),
                range_min: station.range_min,
                range_max: station.range_max,
                issued: issued.len(),
                next: next_free_number(station, &issued).map(|n| station.code_for(n).to_string()),
            }
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!(
        "{:<14} {:>7} {:>7} {:>7}  NEXT",
        "STATION", "MIN", "MAX", "ISSUED"
    );
    for row in &rows {
        println!(
            "{:<14} {:>7} {:>7} {:>7}  {}",
            row.name,
            row.range_min,
            row.range_max,
            row.issued,
            row.next.as_deref().unwrap_or("Full"),
        );
    }
    Ok(())
}

fn handle_check(config: &Config, cmd: &CheckCommand) -> Result<()> {
    let code = parse_tracking_code(&cmd.code)?;
    let station = config.stations.validate_code(&code)?;

    let storage = open_storage(config)?;
    let issued = storage.get_by_code(&code.to_string())?.is_some();

    println!(
        "{code}: valid for {} ({}..={}){}",
        station.name,
        station.range_min,
        station.range_max,
        if issued { ", already issued" } else { ", not issued" }
    );
    Ok(())
}

fn handle_next(config: &Config, station: &str) -> Result<()> {
    let storage = open_storage(config)?;
    match suggest(&storage, &config.stations, station)? {
        Some(code) => println!("{code}"),
        None => println!("Full"),
    }
    Ok(())
}

fn handle_register(config: &Config, cmd: &RegisterCommand) -> Result<()> {
    let storage = open_storage(config)?;
    let package = register(&storage, &config.stations, cmd.to_request())
        .with_context(|| format!("registering package at {}", cmd.station))?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&package)?);
    } else {
        println!("{}", package.tracking_code);
    }
    Ok(())
}

fn handle_list(config: &Config, cmd: &ListCommand) -> Result<()> {
    let storage = open_storage(config)?;
    let packages = match &cmd.station {
        Some(station) => storage.by_station(station, cmd.limit)?,
        None => storage.recent(cmd.limit)?,
    };

    match cmd.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&packages)?),
        OutputFormat::Plain => {
            for package in &packages {
                println!("{}", package.tracking_code);
            }
        }
        OutputFormat::Table => print_package_table(&packages),
    }
    Ok(())
}

fn print_package_table(packages: &[Package]) {
    println!(
        "{:<16} {:>5} {:>6} {:>6}  {:<20} {:<20} CREATED",
        "CODE", "BOXES", "BASINS", "SACKS", "RECEIVER", "DESTINATION"
    );
    for package in packages {
        println!(
            "{:<16} {:>5} {:>6} {:>6}  {:<20} {:<20} {}",
            package.tracking_code,
            package.quantities.boxes,
            package.quantities.basins,
            package.quantities.small_sacks,
            package.details.receiver_name.as_deref().unwrap_or("-"),
            package.details.destination.as_deref().unwrap_or("-"),
            package.created_at.format("%Y-%m-%d %H:%M"),
        );
    }
}

fn handle_report(config: &Config, json: bool) -> Result<()> {
    let storage = open_storage(config)?;
    let report = Report::from_packages(&storage.packages()?);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "{:<14} {:>8} {:>6} {:>7} {:>6}",
        "STATION", "RECORDS", "BOXES", "BASINS", "SACKS"
    );
    for row in &report.stations {
        println!(
            "{:<14} {:>8} {:>6} {:>7} {:>6}",
            row.station,
            row.records,
            row.quantities.boxes,
            row.quantities.basins,
            row.quantities.small_sacks
        );
    }
    let total = report.total_quantities();
    println!(
        "{:<14} {:>8} {:>6} {:>7} {:>6}",
        "TOTAL",
        report.total_records(),
        total.boxes,
        total.basins,
        total.small_sacks
    );
    if report.malformed > 0 {
        println!();
        println!("{} record(s) with unreadable tracking codes skipped", report.malformed);
    }
    Ok(())
}

fn handle_status(config: &Config, json: bool) -> Result<()> {
    let storage = open_storage(config)?;
    let stats = storage.stats()?;

    if json {
        let status = serde_json::json!({
            "database_path": storage.path(),
            "stations_configured": config.stations.len(),
            "stats": stats,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("prange status");
        println!("-------------");
        println!("Database:      {}", storage.path().display());
        println!("Size:          {} bytes", stats.db_size_bytes);
        println!("Stations:      {}", config.stations.len());
        println!("Packages:      {}", stats.total_packages);
        println!("In use:        {}", stats.stations_in_use.join(", "));
        if let Some(newest) = stats.newest_package {
            println!("Last package:  {}", newest.to_rfc3339());
        }
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!();
                println!("[Stations]");
                for station in &config.stations {
                    println!(
                        "  {:<18}  {}..={}",
                        station.name, station.range_min, station.range_max
                    );
                }
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            Config::load_from(Some(path.clone()))
                .with_context(|| format!("invalid configuration {}", path.display()))?;
            println!("Configuration is valid.");
        }
    }
    Ok(())
}
