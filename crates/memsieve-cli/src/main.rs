mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use memsieve::ScanConfig;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use commands::set::SetOp;

#[derive(Parser)]
#[command(name = "memsieve")]
#[command(about = "Memory cheat search over emulator memory dumps")]
struct Args {
    #[arg(short, long, default_value = "memsieve.toml")]
    config: PathBuf,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

/// Region dump arguments shared by every command that reads memory
#[derive(clap::Args, Debug, Clone)]
pub struct RegionArgs {
    /// Raw memory dump file
    #[arg(short, long)]
    region: PathBuf,

    /// Address of the dump's first byte (hex)
    #[arg(short, long, default_value = "0")]
    base: String,
}

#[derive(Subcommand)]
enum Command {
    /// Compare every address of a dump against a value or another dump
    Scan {
        #[command(flatten)]
        region: RegionArgs,

        /// Comparison operator (<, <=, >, >=, ==, !=)
        #[arg(short, long, default_value = "==")]
        op: String,

        /// Constant to compare against (decimal, 0x hex, or negative)
        #[arg(long, conflicts_with = "against")]
        value: Option<String>,

        /// Dump or saved snapshot to compare against
        #[arg(long)]
        against: Option<PathBuf>,

        /// Operand spec, e.g. ub, swl, udb (defaults to config)
        #[arg(short, long)]
        spec: Option<String>,

        /// Intersect with a previously saved candidate set
        #[arg(long)]
        within: Option<PathBuf>,

        /// Save the resulting set as JSON
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Combine saved candidate sets
    Set {
        #[arg(value_enum)]
        op: SetOp,

        /// Input set files (one for complement, two otherwise)
        #[arg(required = true, num_args = 1..=2)]
        inputs: Vec<PathBuf>,

        /// Output set file
        #[arg(long)]
        output: PathBuf,
    },
    /// List the addresses of a saved candidate set
    Show {
        set: PathBuf,

        /// Restrict a complemented set to this range start (hex)
        #[arg(long, requires = "size")]
        base: Option<String>,

        /// Restrict a complemented set to this many bytes (hex)
        #[arg(long, requires = "base")]
        size: Option<String>,

        /// Maximum number of addresses to print (defaults to config)
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Search a dump for a byte pattern
    Find {
        #[command(flatten)]
        region: RegionArgs,

        /// Hex bytes, e.g. "05 00 10"
        pattern: String,

        /// Address to start from (hex, defaults to base)
        #[arg(long)]
        start: Option<String>,

        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
    /// Dump raw bytes in hexdump format
    Hexdump {
        #[command(flatten)]
        region: RegionArgs,

        /// Address to start at (hex)
        address: String,

        #[arg(short = 'n', long, default_value = "256")]
        size: usize,

        /// Show ASCII column
        #[arg(long)]
        ascii: bool,
    },
    /// Save a dump as a snapshot (image plus metadata) in the session directory
    Snapshot {
        #[command(flatten)]
        region: RegionArgs,

        /// Output image path (defaults to <session_dir>/<name>.snap)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let default_level = if args.verbose {
        "memsieve=debug"
    } else {
        "memsieve=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(default_level.parse()?))
        .with_writer(std::io::stderr)
        .init();

    let config = match ScanConfig::load(&args.config) {
        Ok(c) => {
            info!("Loaded config from {:?}", args.config);
            c
        }
        Err(e) if e.is_not_found() => {
            warn!("{:?} not found, using default config", args.config);
            ScanConfig::default()
        }
        Err(e) => {
            warn!("Failed to load config: {}, using defaults", e);
            ScanConfig::default()
        }
    };

    match args.command {
        Command::Scan {
            region,
            op,
            value,
            against,
            spec,
            within,
            output,
        } => commands::scan::run(
            &config,
            &region,
            commands::scan::ScanRequest {
                op,
                value,
                against,
                spec,
                within,
                output,
            },
        ),
        Command::Set { op, inputs, output } => commands::set::run(op, &inputs, &output),
        Command::Show {
            set,
            base,
            size,
            limit,
        } => commands::show::run(
            &set,
            base.as_deref(),
            size.as_deref(),
            limit.unwrap_or(config.display_limit),
        ),
        Command::Find {
            region,
            pattern,
            start,
            limit,
        } => commands::find::run(&region, &pattern, start.as_deref(), limit),
        Command::Hexdump {
            region,
            address,
            size,
            ascii,
        } => commands::hexdump::run(&region, &address, size, ascii),
        Command::Snapshot { region, output } => {
            commands::snapshot::run(&config, &region, output.as_deref())
        }
    }
}
