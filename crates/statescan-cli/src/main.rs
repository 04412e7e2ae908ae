use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use statescan_config::{LeafConfig, ProjectExclusionConfig};
use statescan_model::RiskLevel;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "statescan", version, about = "Static scaling-hazard scanner for compiled class artifacts")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan a project tree and report stateful components
    Scan(ScanArgs),
    /// Enumerate root-to-leaf stateful paths through the reachable graph
    Paths(ScanArgs),
}

#[derive(clap::Args)]
struct ScanArgs {
    /// Directory containing compiled class artifacts
    path: PathBuf,
    /// Dependency archive to decode alongside the project tree
    #[arg(long = "dependency")]
    dependencies: Vec<PathBuf>,
    /// Project package prefix treated as in-scope (repeatable)
    #[arg(long = "include")]
    include: Vec<String>,
    /// Package prefix excluded even if it matches an include prefix (repeatable)
    #[arg(long = "exclude")]
    exclude: Vec<String>,
    /// Lowest risk level to report
    #[arg(long, value_enum, default_value = "medium")]
    min_risk: MinRisk,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum MinRisk {
    Medium,
    High,
    Critical,
}

impl From<MinRisk> for RiskLevel {
    fn from(value: MinRisk) -> Self {
        match value {
            MinRisk::Medium => RiskLevel::Medium,
            MinRisk::High => RiskLevel::High,
            MinRisk::Critical => RiskLevel::Critical,
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let exit_code = match run(Cli::parse()) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{:#}", err);
            2
        }
    };
    std::process::exit(exit_code);
}

fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Command::Scan(args) => {
            let exclusion = exclusion_config(&args);
            let report = statescan::analyze(
                &args.path,
                &args.dependencies,
                &exclusion,
                &LeafConfig::default(),
                args.min_risk.into(),
            )?;
            println!("{:#?}", report);
            Ok(0)
        }
        Command::Paths(args) => {
            let exclusion = exclusion_config(&args);
            let paths = statescan::find_stateful_paths(
                &args.path,
                &args.dependencies,
                &exclusion,
                &LeafConfig::default(),
            )?;
            println!("{:#?}", paths);
            Ok(0)
        }
    }
}

fn exclusion_config(args: &ScanArgs) -> ProjectExclusionConfig {
    ProjectExclusionConfig {
        include_packages: args.include.clone(),
        exclude_packages: args.exclude.clone(),
        ..Default::default()
    }
}
