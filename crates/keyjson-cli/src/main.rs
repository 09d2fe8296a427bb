//! `keyjson` CLI: minify, validate and inspect JSON documents from the command line.
//!
//! ## Usage
//!
//! ```sh
//! # Minify (stdin → stdout)
//! echo '{ "name": "Alice", "age": 30 }' | keyjson minify
//!
//! # Minify from file to file
//! keyjson minify -i data.json -o data.min.json
//!
//! # Validate; prints the error position and exits non-zero on failure
//! keyjson check -i data.json
//!
//! # Document statistics and key-cache counters
//! keyjson stats -i data.json
//!
//! # Debug logging (or set KEYJSON_LOG=debug)
//! keyjson -v minify -i data.json
//! ```

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use keyjson_core::{DecodeOptions, KeyCache, Value, DEFAULT_MAX_DEPTH};
use std::fmt::Write as _;
use std::io::{self, Read, Write};
use std::process;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "keyjson",
    version,
    about = "Compact JSON minifier and validator with key interning"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log at debug level (overrides KEYJSON_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Args)]
struct Files {
    /// Input file (reads from stdin if omitted)
    #[arg(short, long)]
    input: Option<String>,
    /// Output file (writes to stdout if omitted)
    #[arg(short, long)]
    output: Option<String>,
}

#[derive(Args)]
struct Decode {
    /// Maximum nesting depth of arrays and objects
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,
    /// Build every object key fresh instead of using the key cache
    #[arg(long)]
    no_intern: bool,
}

impl Decode {
    fn options(&self) -> DecodeOptions {
        DecodeOptions::new()
            .max_depth(self.max_depth)
            .intern_keys(!self.no_intern)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Parse and re-serialize compactly
    Minify {
        #[command(flatten)]
        files: Files,
        #[command(flatten)]
        decode: Decode,
    },
    /// Validate a document and report the first error
    Check {
        #[command(flatten)]
        files: Files,
        #[command(flatten)]
        decode: Decode,
    },
    /// Show document statistics and key-cache counters
    Stats {
        #[command(flatten)]
        files: Files,
        #[command(flatten)]
        decode: Decode,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Minify { files, decode } => {
            let input = read_input(files.input.as_deref())?;
            let started = Instant::now();
            let value = parse_or_exit(&input, &decode.options());
            let json = keyjson_core::serialize_to_string(&value)
                .context("Failed to serialize document")?;
            tracing::info!(
                input_bytes = input.len(),
                output_bytes = json.len(),
                elapsed_us = started.elapsed().as_micros() as u64,
                "minified"
            );
            write_output(files.output.as_deref(), &json)?;
        }
        Commands::Check { files, decode } => {
            let input = read_input(files.input.as_deref())?;
            let value = parse_or_exit(&input, &decode.options());
            tracing::debug!(kind = value.type_name(), "document is valid");
            write_output(files.output.as_deref(), "ok\n")?;
        }
        Commands::Stats { files, decode } => {
            let input = read_input(files.input.as_deref())?;
            let before = KeyCache::global().stats();
            let value = parse_or_exit(&input, &decode.options());
            let after = KeyCache::global().stats();
            let mut counts = Counts::default();
            counts.visit(&value);

            let json = keyjson_core::serialize_to_string(&value)
                .context("Failed to serialize document")?;

            let mut report = String::new();
            writeln!(report, "Input size:    {} bytes", input.len())?;
            writeln!(report, "Output size:   {} bytes", json.len())?;
            writeln!(report, "Objects:       {}", counts.objects)?;
            writeln!(report, "Arrays:        {}", counts.arrays)?;
            writeln!(report, "Keys:          {}", counts.keys)?;
            writeln!(report, "Strings:       {}", counts.strings)?;
            writeln!(report, "Integers:      {}", counts.ints)?;
            writeln!(report, "Floats:        {}", counts.floats)?;
            writeln!(report, "Booleans:      {}", counts.bools)?;
            writeln!(report, "Nulls:         {}", counts.nulls)?;
            writeln!(report, "Max depth:     {}", counts.max_depth)?;
            writeln!(report, "Cache hits:    {}", after.hits - before.hits)?;
            writeln!(report, "Cache misses:  {}", after.misses - before.misses)?;
            write_output(files.output.as_deref(), &report)?;
        }
    }

    Ok(())
}

/// Install the stderr subscriber. `-v` wins over `KEYJSON_LOG`; with neither,
/// only warnings are shown.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("KEYJSON_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Parse `input`, or print the error position and exit with status 1.
fn parse_or_exit(input: &[u8], options: &DecodeOptions) -> Value {
    match keyjson_core::parse_with(input, options) {
        Ok(value) => value,
        Err(err) => {
            tracing::debug!(offset = err.offset, "parse failed");
            eprintln!(
                "error: {} at line {}, column {}",
                err.kind, err.line, err.column
            );
            process::exit(1);
        }
    }
}

#[derive(Default)]
struct Counts {
    objects: usize,
    arrays: usize,
    keys: usize,
    strings: usize,
    ints: usize,
    floats: usize,
    bools: usize,
    nulls: usize,
    max_depth: usize,
}

impl Counts {
    /// Walks with an explicit stack; the tree can be as deep as `--max-depth`
    /// allows.
    fn visit(&mut self, root: &Value) {
        let mut stack = vec![(root, 0usize)];
        while let Some((value, depth)) = stack.pop() {
            match value {
                Value::Null => self.nulls += 1,
                Value::Bool(_) => self.bools += 1,
                Value::Int(_) => self.ints += 1,
                Value::Float(_) => self.floats += 1,
                Value::Text(_) => self.strings += 1,
                Value::Array(items) => {
                    self.arrays += 1;
                    self.max_depth = self.max_depth.max(depth + 1);
                    stack.extend(items.iter().map(|item| (item, depth + 1)));
                }
                Value::Object(map) => {
                    self.objects += 1;
                    self.keys += map.len();
                    self.max_depth = self.max_depth.max(depth + 1);
                    stack.extend(map.values().map(|item| (item, depth + 1)));
                }
            }
        }
    }
}

fn read_input(path: Option<&str>) -> Result<Vec<u8>> {
    match path {
        Some(path) => std::fs::read(path).with_context(|| format!("Failed to read file: {}", path)),
        None => {
            let mut buf = Vec::new();
            io::stdin()
                .read_to_end(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(content.as_bytes())
                .context("Failed to write to stdout")?;
            stdout.flush().context("Failed to write to stdout")?;
        }
    }
    Ok(())
}
