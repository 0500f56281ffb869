//! `wcon-sparse-render`: print a WCON `data` section in sparse debug form.
//!
//! Usage:
//!   wcon-sparse-render [INPUT]
//!
//! Reads INPUT, or stdin when omitted.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use wcon::cli::{init_tracing, read_input, render_sparse_data, write_output};

#[derive(Parser, Debug)]
#[command(name = "wcon-sparse-render")]
#[command(about = "Show which record indices a WCON data section holds")]
#[command(version)]
struct Args {
    /// WCON file; stdin when omitted
    input: Option<PathBuf>,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let (text, source_name) = read_input(args.input.as_deref())?;
    let rendered = render_sparse_data(&text, &source_name)?;
    write_output(None, &rendered)?;
    Ok(())
}
