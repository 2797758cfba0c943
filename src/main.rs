//! # EncodingLens CLI - Text Representation Converter
//!
//! Command-line interface for converting text between plain text, hex,
//! binary and Unicode escape representations while debugging mojibake.

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use encoding_lens::{ConversionOutcome, Encoding, ErrorKind, convert, validate};

/// Sample rendered by `info`
const SAMPLE_TEXT: &str = "Aé日😀";

/// EncodingLens: convert text between textual representations
#[derive(Parser)]
#[command(name = "encoding-lens")]
#[command(version, about, long_about = None)]
#[command(author = "EncodingLens Contributors")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (text, json)
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert text from one representation to another
    Convert(ConvertArgs),

    /// Check that input matches the grammar of a representation
    Validate(ValidateArgs),

    /// List all supported encodings
    List(ListArgs),

    /// Display detailed information about an encoding
    Info(InfoArgs),
}

#[derive(Args)]
struct InputArgs {
    /// Input text (read from --input or stdin if omitted)
    text: Option<String>,

    /// Input file
    #[arg(short, long, conflicts_with = "text")]
    input: Option<PathBuf>,

    /// Keep the trailing newline of file or stdin input
    #[arg(long)]
    keep_newline: bool,
}

#[derive(Args)]
struct ConvertArgs {
    /// Source encoding
    #[arg(short = 'f', long = "from", value_parser = parse_encoding_arg)]
    from: Encoding,

    /// Target encoding
    #[arg(short = 't', long = "to", value_parser = parse_encoding_arg)]
    to: Encoding,

    #[command(flatten)]
    input: InputArgs,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct ValidateArgs {
    /// Expected encoding
    #[arg(short, long, value_parser = parse_encoding_arg)]
    encoding: Encoding,

    #[command(flatten)]
    input: InputArgs,
}

#[derive(Args)]
struct ListArgs {
    /// Show only lossy targets
    #[arg(long)]
    lossy: bool,

    /// Show encoding details
    #[arg(long)]
    details: bool,
}

#[derive(Args)]
struct InfoArgs {
    /// Encoding to describe
    #[arg(value_parser = parse_encoding_arg)]
    encoding: Encoding,
}

#[derive(Clone, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Serialize)]
struct ValidationReport {
    encoding: Encoding,
    valid: bool,
    error: Option<String>,
    kind: Option<ErrorKind>,
    characters: usize,
}

/// Parse an encoding argument, accepting the common spellings users type
fn parse_encoding_arg(s: &str) -> Result<Encoding> {
    let canonical = match s.trim().to_lowercase().as_str() {
        "utf-8" | "utf8" => "utf-8",
        "utf-16" | "utf16" => "utf-16",
        "ascii" | "us-ascii" => "ascii",
        "iso-8859-1" | "iso88591" | "latin1" => "iso-8859-1",
        "hex" => "hex",
        "binary" | "bin" => "binary",
        "unicode-escape" | "unicode" => "unicode-escape",
        _ => anyhow::bail!("Unknown encoding: {}", s),
    };

    Ok(canonical.parse()?)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Convert(ref args) => convert_command(args, &cli)?,
        Commands::Validate(ref args) => validate_command(args, &cli)?,
        Commands::List(ref args) => list_command(args, &cli)?,
        Commands::Info(ref args) => info_command(args, &cli)?,
    }

    Ok(())
}

/// Log to stderr, honoring `RUST_LOG` and defaulting to `debug` when verbose
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn read_input(args: &InputArgs) -> Result<String> {
    if let Some(ref text) = args.text {
        return Ok(text.clone());
    }

    let mut data = if let Some(ref input_path) = args.input {
        debug!("Reading from: {}", input_path.display());
        fs::read_to_string(input_path)
            .with_context(|| format!("Failed to read input file: {}", input_path.display()))?
    } else {
        debug!("Reading from stdin");
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        buffer
    };

    if !args.keep_newline && data.ends_with('\n') {
        data.pop();
        if data.ends_with('\r') {
            data.pop();
        }
    }

    Ok(data)
}

fn convert_command(args: &ConvertArgs, cli: &Cli) -> Result<()> {
    info!("Converting from {} to {}", args.from, args.to);

    let input = read_input(&args.input)?;
    let outcome = convert(&input, args.from, args.to);

    match cli.format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&outcome)?;
            write_output(args.output.as_deref(), &json)?;
        }
        OutputFormat::Text => match outcome {
            ConversionOutcome::Success {
                ref output,
                input_length,
                output_length,
                elapsed_micros,
            } => {
                write_output(args.output.as_deref(), output)?;

                if cli.verbose {
                    eprintln!(
                        "Converted {} chars -> {} chars in {}µs",
                        input_length, output_length, elapsed_micros
                    );
                }
            }
            ConversionOutcome::Failure { kind, ref message } => {
                eprintln!("✗ Conversion failed ({}): {}", kind, message);
            }
        },
    }

    if !outcome.is_success() {
        std::process::exit(1);
    }

    Ok(())
}

/// Write to the output file if one was given, otherwise to stdout
fn write_output(path: Option<&Path>, content: &str) -> Result<()> {
    if let Some(output_path) = path {
        fs::write(output_path, content)
            .with_context(|| format!("Failed to write output file: {}", output_path.display()))?;
        info!("Wrote to: {}", output_path.display());
    } else {
        let mut stdout = io::stdout();
        writeln!(stdout, "{}", content).context("Failed to write to stdout")?;
    }
    Ok(())
}

fn validate_command(args: &ValidateArgs, cli: &Cli) -> Result<()> {
    let input = read_input(&args.input)?;
    let result = validate(&input, args.encoding);

    match cli.format {
        OutputFormat::Json => {
            let report = ValidationReport {
                encoding: args.encoding,
                valid: result.ok,
                error: result.error.as_ref().map(|e| e.to_string()),
                kind: result.error.as_ref().map(|e| e.kind()),
                characters: input.chars().count(),
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => {
            if result.ok {
                println!("✓ Input is valid {}", args.encoding);
            } else {
                println!("✗ Input is not valid {}", args.encoding);
                if let Some(ref error) = result.error {
                    println!("  Error: {}", error);
                }
            }
        }
    }

    if !result.ok {
        std::process::exit(1);
    }

    Ok(())
}

fn list_command(args: &ListArgs, cli: &Cli) -> Result<()> {
    let encodings: Vec<Encoding> = Encoding::ALL
        .into_iter()
        .filter(|encoding| !args.lossy || encoding.is_lossy_target())
        .collect();

    match cli.format {
        OutputFormat::Json => {
            let encodings_info: Vec<_> = encodings
                .iter()
                .map(|encoding| {
                    serde_json::json!({
                        "name": encoding.name(),
                        "description": encoding.description(),
                        "text": encoding.is_text(),
                        "lossy": encoding.is_lossy_target()
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&encodings_info)?);
        }
        OutputFormat::Text => {
            println!("Supported Encodings ({} total):", encodings.len());
            println!();

            for encoding in encodings {
                println!("{:15} {}", encoding.name(), encoding.description());

                if args.details {
                    println!("                Plain text: {}", yes_no(encoding.is_text()));
                    println!(
                        "                Lossy target: {}",
                        yes_no(encoding.is_lossy_target())
                    );
                    println!();
                }
            }
        }
    }

    Ok(())
}

fn info_command(args: &InfoArgs, cli: &Cli) -> Result<()> {
    let encoding = args.encoding;
    let sample = convert(SAMPLE_TEXT, Encoding::Utf8, encoding);

    match cli.format {
        OutputFormat::Json => {
            let info = serde_json::json!({
                "name": encoding.name(),
                "description": encoding.description(),
                "text": encoding.is_text(),
                "lossy": encoding.is_lossy_target(),
                "sample": { "input": SAMPLE_TEXT, "output": sample.output() }
            });
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
        OutputFormat::Text => {
            println!("Encoding Information: {}", encoding.name());
            println!("Description: {}", encoding.description());
            println!("Plain text: {}", yes_no(encoding.is_text()));
            println!("Lossy target: {}", yes_no(encoding.is_lossy_target()));
            if let Some(output) = sample.output() {
                println!("\nSample:\n  {} -> {}", SAMPLE_TEXT, output);
            }
        }
    }

    Ok(())
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "Yes" } else { "No" }
}
