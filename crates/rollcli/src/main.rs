//! rollcli - encode and decode notes for piano-roll sequence models
//!
//! Subcommands:
//! - `rollcli encode <input>` - MIDI file or wire document → token array
//! - `rollcli decode <tokens> --output <file>` - token array → MIDI file or wire document
//! - `rollcli preprocess <midi_dir> [out_dir]` - tokenize every MIDI file under a directory
//! - `rollcli config` - print the effective configuration

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rollconf::{RollConfig, Scheme};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "rollcli")]
#[command(about = "Note <-> token codecs for piano-roll sequence models")]
#[command(version)]
struct Cli {
    /// Config file (replaces ./rollcodec.toml)
    #[arg(long, global = true, env = "ROLLCODEC_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Per-invocation codec overrides.
#[derive(clap::Args, Debug, Clone, Default)]
struct CodecArgs {
    /// Token scheme: delta or grid
    #[arg(long)]
    scheme: Option<Scheme>,

    /// Grid resolution (grid scheme only)
    #[arg(long)]
    steps_per_bar: Option<u32>,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode a MIDI file (.mid/.midi) or wire document (.json) to tokens
    Encode {
        /// Input file
        input: PathBuf,

        /// Write the token array here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        codec: CodecArgs,
    },

    /// Decode a JSON token array to a MIDI file or wire document
    Decode {
        /// JSON file holding a flat array of integers
        tokens: PathBuf,

        /// Output file; .mid/.midi writes MIDI, .json writes a wire document
        #[arg(short, long)]
        output: PathBuf,

        /// GM program for the decoded MIDI track
        #[arg(long, default_value = "0")]
        program: u8,

        #[command(flatten)]
        codec: CodecArgs,
    },

    /// Tokenize every .mid/.midi file under a directory
    Preprocess {
        /// Directory searched recursively for MIDI files
        midi_dir: PathBuf,

        /// Output directory (default: paths.output_dir from config)
        out_dir: Option<PathBuf>,

        #[command(flatten)]
        codec: CodecArgs,
    },

    /// Print the effective configuration and where it came from
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let (config, sources) = RollConfig::load_with_sources_from(cli.config.as_deref())
        .context("loading configuration")?;

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_new(&config.telemetry.log_level)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    if let Some(path) = &sources.missing_override {
        tracing::warn!(path = %path.display(), "config file not found, using defaults and discovered files");
    }

    match cli.command {
        Commands::Encode {
            input,
            output,
            codec,
        } => {
            let codec = commands::Codec::from_config(&config, codec.scheme, codec.steps_per_bar)?;
            commands::encode(&codec, &input, output.as_deref())?;
        }
        Commands::Decode {
            tokens,
            output,
            program,
            codec,
        } => {
            let codec = commands::Codec::from_config(&config, codec.scheme, codec.steps_per_bar)?;
            commands::decode(&codec, &tokens, &output, program)?;
        }
        Commands::Preprocess {
            midi_dir,
            out_dir,
            codec,
        } => {
            let codec = commands::Codec::from_config(&config, codec.scheme, codec.steps_per_bar)?;
            let out_dir = out_dir.unwrap_or_else(|| config.paths.output_dir.clone());
            commands::preprocess(&codec, &midi_dir, &out_dir, &config.paths.token_extension)?;
        }
        Commands::Config => {
            print!("{}", config.to_toml());
            for file in &sources.files {
                eprintln!("loaded: {}", file.display());
            }
            for var in &sources.env_overrides {
                eprintln!("env override: {}", var);
            }
        }
    }

    Ok(())
}
