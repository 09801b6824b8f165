//! DRAM simulator core CLI.
//!
//! This binary provides a single entry point for the core's two surfaces:
//! 1. **Decode:** Decompose physical addresses into device coordinates under
//!    the configured mapper strategy.
//! 2. **Run:** Replay a read/write trace through one channel controller with
//!    optional command-trace recording and a row-hit breakdown.

mod channel;

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use dramsim_core::config::Config;
use dramsim_core::controller::{AccessKind, RowHitCounter, TraceRecorder};
use dramsim_core::dram::Organization;
use dramsim_core::frontend::{self, TracePlayer};
use dramsim_core::AddrMapper;

use channel::Channel;

#[derive(Parser, Debug)]
#[command(
    name = "dramsim",
    author,
    version,
    about = "Cycle-level DRAM address-mapping and scheduling simulator",
    long_about = "Decode physical addresses into device coordinates, or replay a R/W trace \
                  through a single channel controller.\n\nConfiguration is JSON \
                  (organization, mapper, scheduler, model, frontend sections); built-in \
                  defaults model a single-channel DDR4-style device.\n\nExamples:\n  \
                  dramsim decode 0x1000 0x2040\n  \
                  dramsim decode -c ddr4.json --mapper RoBaRaCoCh 0x1000\n  \
                  dramsim run -c ddr4.json -t access.trace --record cmds.log"
)]
struct Cli {
    /// JSON configuration file; built-in defaults when omitted.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decompose physical addresses into device coordinates.
    Decode {
        /// Override the configured mapper strategy
        /// (ChRaBaRoCo, RoBaRaCoCh, MOP4CLXOR, Custom).
        #[arg(long)]
        mapper: Option<String>,

        /// Addresses to decode, decimal or 0x-prefixed hexadecimal.
        #[arg(required = true)]
        addrs: Vec<String>,
    },

    /// Replay a read/write trace through one channel controller.
    Run {
        /// Trace file: one `R|W <addr> <size>` per line.
        #[arg(short, long)]
        trace: PathBuf,

        /// Record every issued command to this file.
        #[arg(long)]
        record: Option<PathBuf>,

        /// Write a per-bank row-hit breakdown to this file.
        #[arg(long)]
        row_hits: Option<PathBuf>,

        /// Stop after this many cycles even if the trace has not drained.
        #[arg(long, default_value_t = 10_000_000)]
        max_cycles: u64,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Decode { mapper, addrs } => cmd_decode(cli.config.as_deref(), mapper, &addrs),
        Commands::Run {
            trace,
            record,
            row_hits,
            max_cycles,
        } => cmd_run(cli.config.as_deref(), &trace, record, row_hits, max_cycles),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn load_config(path: Option<&std::path::Path>) -> Result<Config, String> {
    match path {
        None => Ok(Config::default()),
        Some(p) => {
            let text = fs::read_to_string(p).map_err(|e| format!("{}: {e}", p.display()))?;
            serde_json::from_str(&text).map_err(|e| format!("{}: {e}", p.display()))
        }
    }
}

fn parse_addr(token: &str) -> Result<u64, String> {
    let parsed = if let Some(hex) = token.strip_prefix("0x").or_else(|| token.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16)
    } else {
        token.parse()
    };
    parsed.map_err(|_| format!("invalid address \"{token}\""))
}

fn cmd_decode(
    config: Option<&std::path::Path>,
    mapper_override: Option<String>,
    addrs: &[String],
) -> Result<(), String> {
    let mut cfg = load_config(config)?;
    if let Some(name) = mapper_override {
        cfg.mapper.kind = serde_json::from_value(serde_json::Value::String(name.clone()))
            .map_err(|_| format!("unknown mapper strategy \"{name}\""))?;
    }

    let organization =
        Organization::from_config(&cfg.organization).map_err(|e| e.to_string())?;
    let mapper = AddrMapper::from_config(&cfg.mapper, &organization).map_err(|e| e.to_string())?;

    for token in addrs {
        let addr = parse_addr(token)?;
        let vec = mapper.apply(addr);
        println!("{addr:#x}:");
        for (level, &coord) in vec.iter().enumerate() {
            println!("  {:>10} = {coord}", organization.level_name(level));
        }
    }
    Ok(())
}

fn cmd_run(
    config: Option<&std::path::Path>,
    trace: &std::path::Path,
    record: Option<PathBuf>,
    row_hits: Option<PathBuf>,
    max_cycles: u64,
) -> Result<(), String> {
    let cfg = load_config(config)?;
    let organization =
        Organization::from_config(&cfg.organization).map_err(|e| e.to_string())?;

    let entries = frontend::load_path(trace).map_err(|e| e.to_string())?;
    let mut player = TracePlayer::new(&entries, &cfg.frontend).map_err(|e| e.to_string())?;
    let mut channel = Channel::new(&cfg, &organization).map_err(|e| e.to_string())?;

    if let Some(path) = record {
        let sink = BufWriter::new(create_output(&path)?);
        channel.add_plugin(Box::new(TraceRecorder::new(&organization, sink)));
    }
    if let Some(path) = row_hits {
        let sink = BufWriter::new(create_output(&path)?);
        let counter = RowHitCounter::new(&organization, sink).map_err(|e| e.to_string())?;
        channel.add_plugin(Box::new(counter));
    }

    let mut cycles = 0u64;
    while !(player.is_finished() && channel.is_drained()) {
        if cycles >= max_cycles {
            eprintln!("warning: cycle limit {max_cycles} reached before the trace drained");
            break;
        }
        player.tick(&mut channel);
        if let Some(served) = channel.tick() {
            if served.kind == AccessKind::Read {
                player.complete_read();
            }
        }
        cycles += 1;
    }

    channel.finalize().map_err(|e| e.to_string())?;
    print!("{}", channel.stats().report());
    Ok(())
}

fn create_output(path: &std::path::Path) -> Result<File, String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| format!("{}: {e}", parent.display()))?;
        }
    }
    File::create(path).map_err(|e| format!("{}: {e}", path.display()))
}
