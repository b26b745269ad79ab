//! Generate the C# MAVLink implementation from parsed schema files.
//!
//! Usage:
//!   mavsharp [-o DIR] [--class-name NAME] [-v] SCHEMA.json [SCHEMA.json ...]
//!
//! The first schema is the dialect; the others are its includes and share its settings. The
//! artifact is written to `DIR/<basename>/mavlink.cs`, replacing any previous one.

use anyhow::{Context, Result};
use clap::Parser;
use mavsharp::{GenConfig, Generator, Schema};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "mavsharp", version, about = "MAVLink schema to C# generator")]
struct Cli {
    /// Parsed schema files (JSON), dialect first.
    #[arg(required = true)]
    schemas: Vec<PathBuf>,

    /// Output root directory.
    #[arg(short, long, value_name = "DIR", default_value = "generated")]
    output: PathBuf,

    /// Name of the generated partial class.
    #[arg(long, default_value = "MAVLink")]
    class_name: String,

    /// Log derivation details.
    #[arg(short, long)]
    verbose: bool,
}

fn load(path: &PathBuf) -> Result<Schema> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    Schema::from_json(&text).with_context(|| format!("parsing {}", path.display()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::new()
        .filter_level(if cli.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .init();

    let schemas = cli.schemas.iter().map(load).collect::<Result<Vec<_>>>()?;
    let config = GenConfig {
        class_name: cli.class_name,
        ..GenConfig::default()
    };
    let path = Generator::new(config)
        .generate_to_dir(&schemas, &cli.output)
        .context("generation failed")?;
    eprintln!("{}: generated", path.display());
    Ok(())
}
