// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! QubitOS Lindblad evolution CLI
//!
//! Runs open-system scenarios through the evolution engine and inspects the
//! effective configuration.
//!
//! # Usage
//!
//! ```bash
//! # Run a scenario and print a JSON report
//! qubit-os-lindblad simulate --scenario decay.yaml
//!
//! # Same scenario with the split strategy and a custom config
//! qubit-os-lindblad --config /path/to/config.yaml simulate --scenario decay.yaml --strategy split
//!
//! # Show or check the effective configuration
//! qubit-os-lindblad config
//! qubit-os-lindblad validate --scenario decay.yaml
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use qubit_os_lindblad::{config::Config, lindblad::Strategy, scenario::Scenario, Result, VERSION};

/// QubitOS Lindblad evolution engine
#[derive(Parser)]
#[command(name = "qubit-os-lindblad")]
#[command(author = "QubitOS Contributors")]
#[command(version = VERSION)]
#[command(about = "Open quantum system evolution under the Lindblad master equation")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log format (pretty, json)
    #[arg(long, global = true)]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scenario and print a JSON report
    Simulate {
        /// Scenario YAML file
        #[arg(short, long)]
        scenario: PathBuf,

        /// Integration strategy (euler, split)
        #[arg(long, env = "QUBITOS_LINDBLAD_STRATEGY")]
        strategy: Option<Strategy>,

        /// Largest Euler substep
        #[arg(long)]
        max_dt: Option<f64>,

        /// Padé approximant order (3..=20)
        #[arg(long)]
        pade_order: Option<u32>,

        /// Pretty-print the report
        #[arg(long)]
        pretty: bool,
    },

    /// Show effective configuration
    Config,

    /// Validate configuration and, optionally, a scenario
    Validate {
        /// Scenario YAML file
        #[arg(short, long)]
        scenario: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = Config::load(cli.config.as_deref())?;

    // Override config with CLI args
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    if let Some(format) = cli.log_format {
        config.logging.format = format;
    }

    // Initialize logging
    init_logging(&config.logging.level, &config.logging.format);

    match cli.command {
        Commands::Simulate {
            scenario,
            strategy,
            max_dt,
            pade_order,
            pretty,
        } => {
            if let Some(strategy) = strategy {
                config.evolution.strategy = strategy;
            }
            if let Some(max_dt) = max_dt {
                config.evolution.max_dt = max_dt;
            }
            if let Some(order) = pade_order {
                config.pade.order = order;
            }

            // Validate config
            config.validate()?;

            let scenario_file = scenario;
            let scenario = Scenario::load(&scenario_file)?;
            info!(
                version = VERSION,
                scenario = %scenario_file.display(),
                dim = scenario.dim,
                steps = scenario.steps,
                dt = scenario.dt,
                strategy = %scenario.evolution(&config).strategy,
                "Running scenario"
            );

            let report = scenario.run(&config)?;
            info!(
                evolution_time_ms = report.metrics["evolution_time_ms"],
                purity = report.purity,
                "Scenario finished"
            );

            let out = if pretty {
                serde_json::to_string_pretty(&report)?
            } else {
                serde_json::to_string(&report)?
            };
            println!("{out}");
        }

        Commands::Config => {
            // Show effective configuration
            println!("{}", serde_yaml::to_string(&config)?);
        }

        Commands::Validate { scenario } => {
            let result = config.validate().and_then(|()| match &scenario {
                Some(path) => Scenario::load(path)?.validate(&config),
                None => Ok(()),
            });
            match result {
                Ok(()) => {
                    println!("Configuration is valid");
                }
                Err(e) => {
                    error!(error = %e, "Validation failed");
                    eprintln!("Validation error: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}

/// Initialize logging with tracing.
fn init_logging(level: &str, format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);
    if format == "json" {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}
