//! tracevis CLI
//!
//! Converts simulator instruction traces into Trace Event Format JSON
//! for viewing in a trace viewer.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use tracevis::commands::{
    display_version, execute_convert, validate_args, validate_trace_file, ConvertArgs,
};
use tracevis::utils::config::{DEFAULT_ADDR2LINE, DEFAULT_OUTPUT};

/// tracevis - instruction traces to Trace Event Format
#[derive(Parser, Debug)]
#[command(name = "tracevis")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert traces into a trace viewer JSON file
    Convert {
        /// The binary executed to generate the traces
        elf: PathBuf,

        /// Traces to visualize
        #[arg(required = true)]
        traces: Vec<PathBuf>,

        /// Output JSON file
        #[arg(short, long, default_value = DEFAULT_OUTPUT)]
        output: PathBuf,

        /// `addr2line` binary to use for symbolication
        #[arg(long, default_value = DEFAULT_ADDR2LINE, env = "TRACEVIS_ADDR2LINE")]
        addr2line: PathBuf,

        /// Use the traces' time instead of cycles
        #[arg(short, long)]
        time: bool,

        /// Parse Banshee traces
        #[arg(short, long)]
        banshee: bool,

        /// Disable addr2line caching (slow but might give better traces in some cases)
        #[arg(long)]
        no_cache: bool,

        /// First line to parse
        #[arg(short, long, default_value = "0")]
        start: usize,

        /// Line after the last one to parse
        #[arg(short, long)]
        end: Option<usize>,
    },

    /// Validate a trace JSON file
    Validate {
        /// Path to trace JSON file
        file: PathBuf,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    // Execute command
    match cli.command {
        Commands::Convert {
            elf,
            traces,
            output,
            addr2line,
            time,
            banshee,
            no_cache,
            start,
            end,
        } => {
            let args = ConvertArgs {
                elf,
                traces,
                output,
                addr2line,
                use_time: time,
                banshee,
                no_cache,
                start,
                end,
            };

            // Validate args first
            validate_args(&args)?;

            execute_convert(args)?;
        }

        Commands::Validate { file } => {
            validate_trace_file(file)?;
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
