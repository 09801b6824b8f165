//! Controller plugins: passive observers of scheduling decisions.
//!
//! Plugins are invoked by the issuer once per scheduling opportunity with
//! the chosen request (if any) and the device oracle. They never influence
//! the decision; they exist for statistics and command-trace capture.

use std::io::{self, Write};

use crate::common::Clk;
use crate::controller::request::Request;
use crate::dram::{DramModel, Organization};

/// Observer of accepted and serviced requests.
pub trait ControllerPlugin {
    /// Called once per scheduling opportunity.
    ///
    /// `chosen` is the request whose command was issued this cycle, or
    /// `None` when the issuer idled. The device oracle reflects the state
    /// the decision was made against.
    fn update(&mut self, clk: Clk, chosen: Option<&Request>, model: &dyn DramModel);

    /// Called once after the simulation finishes; flushes any output.
    ///
    /// # Errors
    ///
    /// Returns the first I/O failure encountered while writing output.
    fn finalize(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Records every issued command as one line: clock, command mnemonic, and
/// the coordinate vector, column-aligned per the organization's level sizes.
#[derive(Debug)]
pub struct TraceRecorder<W: Write> {
    sink: W,
    widths: Vec<usize>,
    error: Option<io::Error>,
}

impl<W: Write> TraceRecorder<W> {
    /// Creates a recorder writing to `sink`, sized for `organization`.
    pub fn new(organization: &Organization, sink: W) -> Self {
        let widths = organization
            .levels()
            .iter()
            .map(|level| decimal_width(level.count.saturating_sub(1)).max(2))
            .collect();
        Self {
            sink,
            widths,
            error: None,
        }
    }

    /// Consumes the recorder and returns its sink.
    pub fn into_sink(self) -> W {
        self.sink
    }
}

impl<W: Write> ControllerPlugin for TraceRecorder<W> {
    fn update(&mut self, clk: Clk, chosen: Option<&Request>, _model: &dyn DramModel) {
        if self.error.is_some() {
            return;
        }
        let Some(request) = chosen else { return };
        let Some(command) = request.command else {
            return;
        };

        let mut line = format!("{clk:>7}, {:>6}", command.name());
        for (level, &coord) in request.addr_vec.iter().enumerate() {
            let width = self.widths.get(level).copied().unwrap_or(2);
            line.push_str(&format!(", {coord:>width$}"));
        }
        if let Err(e) = writeln!(self.sink, "{line}") {
            self.error = Some(e);
        }
    }

    fn finalize(&mut self) -> io::Result<()> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }
        self.sink.flush()
    }
}

/// Counts row-buffer hits for data-transfer commands, broken down per
/// (channel, rank, [bank group,] bank).
#[derive(Debug)]
pub struct RowHitCounter<W: Write> {
    sink: W,
    level_idxs: Vec<usize>,
    level_names: Vec<String>,
    dims: Vec<u64>,
    counts: Vec<u64>,
    total: u64,
}

impl<W: Write> RowHitCounter<W> {
    /// Creates a counter for `organization`, writing its summary to `sink`.
    ///
    /// Channel, rank, and bank levels are required; a bank-group level is
    /// included in the breakdown when the organization has one.
    ///
    /// # Errors
    ///
    /// Returns [`crate::common::ConfigError::MissingLevel`] if a required
    /// level is absent.
    pub fn new(
        organization: &Organization,
        sink: W,
    ) -> Result<Self, crate::common::ConfigError> {
        let mut level_idxs = vec![
            organization.level_index("channel")?,
            organization.level_index("rank")?,
        ];
        if let Ok(bg) = organization.level_index("bankgroup") {
            level_idxs.push(bg);
        }
        level_idxs.push(organization.level_index("bank")?);

        let level_names = level_idxs
            .iter()
            .map(|&i| organization.level_name(i).to_owned())
            .collect();
        let dims: Vec<u64> = level_idxs.iter().map(|&i| organization.count(i)).collect();
        let slots = dims.iter().product::<u64>() as usize;

        Ok(Self {
            sink,
            level_idxs,
            level_names,
            dims,
            counts: vec![0; slots],
            total: 0,
        })
    }

    fn slot(&self, request: &Request) -> usize {
        let mut idx = 0u64;
        for (&level, &dim) in self.level_idxs.iter().zip(&self.dims) {
            idx = idx * dim + request.addr_vec[level];
        }
        idx as usize
    }

    /// Total row-buffer hits observed so far.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Consumes the counter and returns its sink.
    pub fn into_sink(self) -> W {
        self.sink
    }
}

impl<W: Write> ControllerPlugin for RowHitCounter<W> {
    fn update(&mut self, _clk: Clk, chosen: Option<&Request>, model: &dyn DramModel) {
        let Some(request) = chosen else { return };
        let Some(command) = request.command else {
            return;
        };
        if !command.is_data_transfer() {
            return;
        }
        if model.check_rowbuffer_hit(command, &request.addr_vec) {
            self.total += 1;
            let slot = self.slot(request);
            self.counts[slot] += 1;
        }
    }

    fn finalize(&mut self) -> io::Result<()> {
        writeln!(self.sink, "Total row hit count: {}", self.total)?;
        writeln!(self.sink, "{}: row hit", self.level_names.join(", "))?;

        for (slot, &count) in self.counts.iter().enumerate() {
            // Decompose the flat slot back into per-level indices.
            let mut coords = vec![0u64; self.dims.len()];
            let mut rest = slot as u64;
            for (i, &dim) in self.dims.iter().enumerate().rev() {
                coords[i] = rest % dim;
                rest /= dim;
            }
            let row = coords
                .iter()
                .map(|c| format!("{c:2}"))
                .collect::<Vec<_>>()
                .join(", ");
            writeln!(self.sink, "{row}: {count:6}")?;
        }
        self.sink.flush()
    }
}

/// Number of decimal digits needed to print `value`.
fn decimal_width(value: u64) -> usize {
    if value == 0 {
        1
    } else {
        (value.ilog10() + 1) as usize
    }
}
