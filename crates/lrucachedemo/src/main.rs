//! lrucachedemo - run create/put/get commands against an LRU cache

mod command;
mod driver;
mod parser;

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::driver::Driver;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Input and output listings
    Text,
    /// Single JSON object
    Json,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Commands in call syntax, e.g. `LRUCache(2) put(1,1) get(1)`
    #[arg(conflicts_with = "file")]
    commands: Vec<String>,

    /// Read commands from a file (call syntax or the two-array JSON form)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,
}

fn main() -> Result<()> {
    // Initialize tracing; logs go to stderr so stdout stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let commands = if let Some(path) = &args.file {
        info!("Reading commands from {}", path.display());
        parser::read_script(path)?
    } else if !args.commands.is_empty() {
        parser::parse_script(&args.commands.join(" "))?
    } else {
        info!("No commands given, running the preset trace");
        command::preset()
    };
    info!("Running {} commands", commands.len());

    let mut driver = Driver::new(commands);
    driver.run()?;

    if let Some(stats) = driver.stats() {
        info!(
            results = driver.outputs().len(),
            hits = stats.hits(),
            misses = stats.misses(),
            evictions = stats.evictions(),
            hit_ratio = stats.hit_ratio(),
            "Run finished"
        );
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match args.format {
        Format::Text => driver.render_text(&mut out)?,
        Format::Json => driver.render_json(&mut out)?,
    }
    out.flush()?;

    Ok(())
}
