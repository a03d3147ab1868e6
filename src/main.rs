mod agents;
mod cli;
mod config;
mod error;
mod maven;
mod pom;
mod repository;
mod utils;
mod workflow;

use clap::Parser;
use cli::{Cli, Commands};
use colored::Colorize;
use std::process;
use workflow::Goal;

fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        unsafe {
            std::env::set_var("POMUP_VERBOSE", "1");
        }
    }

    let (goal, common) = match cli.command {
        Commands::UseLatestVersions { segments, common } => {
            (Goal::LatestVersions { segments }, common)
        }
        Commands::UseNextVersions {
            process_snapshots_only,
            process_properties,
            process_parent,
            properties,
            common,
        } => (
            Goal::NextVersions {
                snapshots_only: process_snapshots_only,
                process_properties,
                process_parent,
                properties,
            },
            common,
        ),
        Commands::UpdateProperties {
            next,
            process_parent,
            process_snapshots_only,
            segments,
            properties,
            common,
        } => (
            Goal::Properties {
                next,
                snapshots_only: process_snapshots_only,
                process_parent,
                segments,
                properties,
            },
            common,
        ),
    };

    if let Err(e) = workflow::execute_update(&cli.path, cli.file.as_deref(), goal, &common) {
        eprintln!("{} {}", "Error:".red().bold(), e);
        process::exit(1);
    }
}
