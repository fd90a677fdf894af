// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Latency Surface CLI
//!
//! Inspect the code shape a build was compiled with, check sweep plans and
//! run build-and-measure sweeps across the configuration grid.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;
mod sweep;

/// latsurf - per-call latency under varied code-generation strategies
#[derive(Parser)]
#[command(name = "latsurf")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the code shape this build was compiled with
    Config {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate a sweep plan
    Validate {
        /// Path to the sweep plan YAML file
        file: String,
    },

    /// Build and measure every variant of a sweep plan
    Sweep {
        /// Sweep plan YAML file (built-in defaults if omitted)
        #[arg(short, long)]
        plan: Option<String>,

        /// Workspace to build the driver from
        #[arg(long, default_value = ".")]
        workspace: PathBuf,

        /// Cargo executable used for the variant builds
        #[arg(long, value_name = "PATH")]
        cargo: Option<PathBuf>,

        /// List the builds and runs without performing them
        #[arg(long)]
        dry_run: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(std::io::stderr)
        .init();

    // Dispatch to command handlers
    match cli.command {
        Commands::Config { json } => commands::config::execute(json),
        Commands::Validate { file } => commands::validate::execute(&file),
        Commands::Sweep {
            plan,
            workspace,
            cargo,
            dry_run,
        } => commands::sweep::execute(plan.as_deref(), &workspace, cargo.as_deref(), dry_run),
    }
}
