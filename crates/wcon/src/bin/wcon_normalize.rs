//! `wcon-normalize`: repair a vendor WCON file into canonical WCON.
//!
//! Usage:
//!   wcon-normalize [INPUT] [--output FILE] [--config FILE] [--dense]
//!                  [--extension-key KEY] [--pretty]
//!
//! The document is read from INPUT, or stdin when omitted, and written to
//! `--output`, or stdout. Flags override values from the config file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;
use wcon::cli::{init_tracing, normalize_json, read_input, write_output, Config};
use wcon::DataLayout;

#[derive(Parser, Debug)]
#[command(name = "wcon-normalize")]
#[command(about = "Repair vendor WCON dialects into canonical WCON")]
#[command(version)]
struct Args {
    /// WCON file to repair; stdin when omitted
    input: Option<PathBuf>,

    /// Where to write the repaired document; stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// TOML config file
    #[arg(short, long, env = "WCON_CONFIG")]
    config: Option<PathBuf>,

    /// Pack repaired records densely instead of keeping their indices
    #[arg(long)]
    dense: bool,

    /// Vendor extension object whose values are singleton-wrapped
    #[arg(long)]
    extension_key: Option<String>,

    /// Pretty-print the output
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if args.dense {
        config.normalize.data_layout = DataLayout::Dense;
    }
    if let Some(key) = args.extension_key {
        config.normalize.extension_key = key;
    }
    config.output.pretty |= args.pretty;
    debug!(?config, "effective config");

    let (text, source_name) = read_input(args.input.as_deref())?;
    let out = normalize_json(&text, &source_name, &config.normalize, config.output.pretty)?;
    write_output(args.output.as_deref(), &out)
        .with_context(|| format!("writing repaired {source_name}"))?;
    Ok(())
}
