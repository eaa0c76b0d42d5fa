//! Bytepack CLI - Command-line tool for encoding and inspecting packed records.
//!
//! This is the main entry point for the bytepack command-line application.

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use bytepack::prelude::*;
use bytepack::stream::schema;

/// Bytepack - compact binary record tool
#[derive(Parser)]
#[command(name = "bytepack")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode a magnitude as a size prefix
    SizeEncode {
        /// Magnitude to encode
        value: u64,
    },

    /// Decode a size prefix given as hex
    SizeDecode {
        /// Prefix bytes, e.g. `42c0`
        hex: String,
    },

    /// Walk a packed record field by field
    Inspect {
        /// Packed record file
        #[arg(short, long, env = "BYTEPACK_INPUT")]
        input: PathBuf,

        /// Field types in wire order, e.g. "u8, guid, str, wstr, usize"
        #[arg(short, long)]
        schema: String,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Pack literal values into a record file
    Pack {
        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        /// Field types in wire order
        #[arg(short, long)]
        schema: String,

        /// One literal per field, in order
        #[arg(short = 'v', long = "value")]
        values: Vec<String>,
    },

    /// List the field types a schema may name
    Types,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("bytepack=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::SizeEncode { value } => cmd_size_encode(value)?,
        Commands::SizeDecode { hex } => cmd_size_decode(&hex)?,
        Commands::Inspect { input, schema, json } => cmd_inspect(&input, &schema, json)?,
        Commands::Pack { output, schema, values } => cmd_pack(&output, &schema, &values)?,
        Commands::Types => cmd_types(),
    }

    Ok(())
}

fn cmd_size_encode(value: u64) -> Result<()> {
    if value > varsize::MAX_MAGNITUDE {
        warn!(value, max = varsize::MAX_MAGNITUDE, "magnitude will not decode back");
    }

    let prefix = varsize::encode(value);
    println!("bytes:  {}", hex::encode(prefix.as_bytes()));
    println!("length: {}", prefix.len());
    println!("tag:    {:#05b}", prefix.wire_tag());
    Ok(())
}

fn cmd_size_decode(text: &str) -> Result<()> {
    let bytes = schema::parse_hex(text).context("Prefix is not valid hex")?;
    let (value, consumed) = varsize::decode(&bytes).context("Failed to decode size prefix")?;

    println!("value:  {}", value);
    println!("length: {}", consumed);
    if consumed < bytes.len() {
        println!("({} trailing bytes ignored)", bytes.len() - consumed);
    }
    Ok(())
}

fn cmd_inspect(input: &PathBuf, schema: &str, json: bool) -> Result<()> {
    let schema: Schema = schema.parse().context("Invalid schema")?;
    let data = fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;
    let total = data.len();

    info!(file = %input.display(), bytes = total, fields = schema.len(), "inspecting");

    let entries = schema.decode(data).context("Record does not match schema")?;
    let end = entries.last().map_or(0, |e| e.offset + e.len);

    if json {
        let fields: Vec<_> = schema
            .fields()
            .iter()
            .zip(&entries)
            .map(|(spec, entry)| {
                serde_json::json!({
                    "type": spec.name(),
                    "category": spec.category().to_string(),
                    "offset": entry.offset,
                    "len": entry.len,
                    "value": entry.value,
                })
            })
            .collect();
        let report = serde_json::json!({
            "size": total,
            "fields": fields,
            "trailing": total - end,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{:>8}  {:>6}  {:<6}  {:<14}  VALUE", "OFFSET", "LEN", "TYPE", "CATEGORY");
    for (spec, entry) in schema.fields().iter().zip(&entries) {
        println!(
            "{:>8}  {:>6}  {:<6}  {:<14}  {}",
            entry.offset,
            entry.len,
            spec.name(),
            spec.category().to_string(),
            entry.value
        );
    }

    if end < total {
        println!("\n{} trailing bytes after the last field", total - end);
    }
    println!("\nTotal: {} bytes, {} fields", total, entries.len());
    Ok(())
}

fn cmd_pack(output: &PathBuf, schema: &str, values: &[String]) -> Result<()> {
    let schema: Schema = schema.parse().context("Invalid schema")?;
    if schema.is_empty() {
        bail!("Schema names no fields");
    }

    let values = schema.parse_values(values).context("Values do not match schema")?;
    let bytes = schema.encode(&values).context("Failed to encode record")?;
    debug!(hex = %hex::encode(&bytes), "encoded");

    fs::write(output, &bytes)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!("Wrote {} bytes ({}) to {}", bytes.len(), schema, output.display());
    Ok(())
}

fn cmd_types() {
    for spec in FieldSpec::ALL {
        println!("{:<6}  {}", spec.name(), spec.category());
    }
}

