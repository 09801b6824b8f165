//! Read/write trace front end.
//!
//! This module provides:
//! 1. **Parsing:** The `R|W <addr> <size>` trace line format, with eager and
//!    position-aware configuration errors.
//! 2. **Splitting:** Requests larger than the unit transfer size become
//!    aligned unit-sized pieces ("tracelets").
//! 3. **Replay:** [`TracePlayer`] launches one request per configured period
//!    and retries rejected sends with a bounded or unbounded budget.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{debug, info, warn};

use crate::common::{Addr, Clk, ConfigError};
use crate::config::FrontendConfig;
use crate::controller::{AccessKind, Request};

/// One parsed trace line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TraceEntry {
    /// Read or write.
    pub kind: AccessKind,
    /// Linear byte address of the access.
    pub addr: Addr,
    /// Access size in bytes.
    pub size: u64,
}

/// One unit-transfer-sized piece of a trace entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tracelet {
    /// Index of the trace entry this piece belongs to.
    pub trace_id: usize,
    /// Read or write, inherited from the entry.
    pub kind: AccessKind,
    /// Unit-aligned linear address of this piece.
    pub addr: Addr,
}

/// Destination for launched requests; rejects sends under back-pressure.
pub trait RequestSink {
    /// Attempts to admit `request`; returns `false` when the buffer is full.
    fn try_send(&mut self, request: Request) -> bool;
}

/// Parses a trace from a buffered reader.
///
/// Lines are `R|W <addr> <size>`, whitespace-separated; addresses and sizes
/// are decimal or `0x`-prefixed hexadecimal. Blank lines and lines starting
/// with `#` are skipped.
///
/// # Errors
///
/// [`ConfigError::TraceParse`] with the one-based line number for any
/// malformed line; [`ConfigError::EmptyTrace`] if no requests remain.
pub fn parse_trace(reader: impl BufRead) -> Result<Vec<TraceEntry>, ConfigError> {
    let mut entries = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = idx + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let tokens: Vec<&str> = trimmed.split_whitespace().collect();
        if tokens.len() != 3 {
            return Err(ConfigError::TraceParse {
                line: line_no,
                reason: format!("expected 3 fields, found {}", tokens.len()),
            });
        }

        let kind = match tokens[0] {
            "R" => AccessKind::Read,
            "W" => AccessKind::Write,
            other => {
                return Err(ConfigError::TraceParse {
                    line: line_no,
                    reason: format!("expected R or W, found \"{other}\""),
                });
            }
        };
        let addr = parse_u64(tokens[1]).ok_or_else(|| ConfigError::TraceParse {
            line: line_no,
            reason: format!("invalid address \"{}\"", tokens[1]),
        })?;
        let size = parse_u64(tokens[2]).ok_or_else(|| ConfigError::TraceParse {
            line: line_no,
            reason: format!("invalid size \"{}\"", tokens[2]),
        })?;

        entries.push(TraceEntry { kind, addr, size });
    }

    if entries.is_empty() {
        return Err(ConfigError::EmptyTrace);
    }
    Ok(entries)
}

/// Loads and parses a trace file.
///
/// # Errors
///
/// I/O failures plus everything [`parse_trace`] rejects.
pub fn load_path(path: impl AsRef<Path>) -> Result<Vec<TraceEntry>, ConfigError> {
    let path = path.as_ref();
    info!(path = %path.display(), "loading trace file");
    let entries = parse_trace(BufReader::new(File::open(path)?))?;
    info!(requests = entries.len(), "trace loaded");
    Ok(entries)
}

fn parse_u64(token: &str) -> Option<u64> {
    if let Some(hex) = token.strip_prefix("0x").or_else(|| token.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16).ok()
    } else {
        token.parse().ok()
    }
}

/// Splits trace entries into unit-aligned tracelets.
///
/// Each entry covers the unit-aligned window `[addr & !(unit-1),
/// round_up(addr + size))`; one tracelet is emitted per unit inside it.
/// Zero-size entries touch no bytes and emit nothing. `unit` must be a
/// power of two.
pub fn split_into_tracelets(entries: &[TraceEntry], unit: u64) -> Vec<Tracelet> {
    debug_assert!(unit.is_power_of_two());
    let mask = !(unit - 1);
    let mut tracelets = Vec::new();

    for (trace_id, entry) in entries.iter().enumerate() {
        if entry.size == 0 {
            continue;
        }
        let start = entry.addr & mask;
        let end = (entry.addr + entry.size + unit - 1) & mask;
        let mut addr = start;
        while addr < end {
            tracelets.push(Tracelet {
                trace_id,
                kind: entry.kind,
                addr,
            });
            addr += unit;
        }
    }
    tracelets
}

/// Replays a trace against a request sink, one launch attempt per period.
///
/// Rejected sends are retried up to the configured budget (or forever when
/// the budget is unset); an exhausted budget skips the piece. Reads stay
/// pending until the driver reports their completion, and the player is
/// finished only when every piece has been launched and no read is pending.
#[derive(Debug)]
pub struct TracePlayer {
    tracelets: Vec<Tracelet>,
    cursor: usize,
    period: Clk,
    cycles_to_launch: Clk,
    retry_budget: Option<u64>,
    retries_left: Option<u64>,
    pending_reads: usize,
    clk: Clk,
}

impl TracePlayer {
    /// Builds a player over `entries` with the front-end configuration.
    ///
    /// # Errors
    ///
    /// [`ConfigError::EmptyTrace`] if the entries split into no tracelets.
    pub fn new(entries: &[TraceEntry], cfg: &FrontendConfig) -> Result<Self, ConfigError> {
        let tracelets = split_into_tracelets(entries, cfg.unit_transfer_size);
        if tracelets.is_empty() {
            return Err(ConfigError::EmptyTrace);
        }
        debug!(
            pieces = tracelets.len(),
            unit = cfg.unit_transfer_size,
            "trace split into unit transfers"
        );
        Ok(Self {
            tracelets,
            cursor: 0,
            period: cfg.period.max(1),
            cycles_to_launch: 0,
            retry_budget: cfg.retries,
            retries_left: cfg.retries,
            pending_reads: 0,
            clk: 0,
        })
    }

    /// Advances the player one cycle, attempting at most one launch.
    pub fn tick(&mut self, sink: &mut impl RequestSink) {
        self.clk += 1;
        if self.cycles_to_launch > 0 {
            self.cycles_to_launch -= 1;
            return;
        }
        self.cycles_to_launch = self.period - 1;

        let Some(piece) = self.tracelets.get(self.cursor).copied() else {
            return;
        };

        let request = Request::new(piece.addr, piece.kind, piece.trace_id);
        if sink.try_send(request) {
            if piece.kind == AccessKind::Read {
                self.pending_reads += 1;
            }
            self.advance();
            return;
        }

        match &mut self.retries_left {
            None => {} // Unbounded budget: keep retrying this piece.
            Some(0) => {
                warn!(
                    trace_id = piece.trace_id,
                    addr = piece.addr,
                    "retry budget exhausted, dropping trace piece"
                );
                self.advance();
            }
            Some(n) => *n -= 1,
        }
    }

    fn advance(&mut self) {
        self.cursor += 1;
        self.retries_left = self.retry_budget;
    }

    /// Reports the completion of one outstanding read.
    pub fn complete_read(&mut self) {
        debug_assert!(self.pending_reads > 0);
        self.pending_reads = self.pending_reads.saturating_sub(1);
    }

    /// Returns `true` once every piece is launched and no read is pending.
    pub fn is_finished(&self) -> bool {
        self.cursor >= self.tracelets.len() && self.pending_reads == 0
    }

    /// Total number of unit-sized pieces in this trace.
    pub fn num_tracelets(&self) -> usize {
        self.tracelets.len()
    }

    /// Number of reads awaiting completion.
    pub fn pending_reads(&self) -> usize {
        self.pending_reads
    }
}
