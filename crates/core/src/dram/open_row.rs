//! Minimal per-bank open-row device model.
//!
//! This is a legality oracle, not a timing model: each bank tracks its open
//! row and a single busy-until clock, enough to drive the scheduler's
//! readiness tier and the row-hit plugin during trace replay. Full timing
//! parameter tables are deliberately out of scope.

use crate::common::{AddrVec, Clk, ConfigError};
use crate::dram::{DramModel, MemCommand, Organization};

/// Cycle costs charged per command class by the open-row model.
#[derive(Clone, Copy, Debug)]
pub struct RowTiming {
    /// Cycles a bank stays busy after an activate.
    pub t_act: Clk,
    /// Cycles a bank stays busy after a precharge.
    pub t_pre: Clk,
    /// Cycles a bank stays busy after a column access.
    pub t_cas: Clk,
}

impl Default for RowTiming {
    fn default() -> Self {
        Self {
            t_act: 14,
            t_pre: 14,
            t_cas: 14,
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct Bank {
    open_row: Option<u64>,
    busy_until: Clk,
}

/// Open-page device model: one open row and one busy window per bank.
///
/// Banks are addressed by the coordinate levels above "row"; the model works
/// for any organization that contains a row level, regardless of whether a
/// bank-group level is present.
#[derive(Debug)]
pub struct OpenRowModel {
    banks: Vec<Bank>,
    bank_dims: Vec<u64>,
    row_idx: usize,
    timing: RowTiming,
    clk: Clk,
}

impl OpenRowModel {
    /// Builds the model for `organization`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingLevel`] if the organization has no level
    /// named `"row"`.
    pub fn new(organization: &Organization, timing: RowTiming) -> Result<Self, ConfigError> {
        let row_idx = organization.level_index("row")?;
        let bank_dims: Vec<u64> = (0..row_idx).map(|i| organization.count(i)).collect();
        let num_banks = bank_dims.iter().product::<u64>() as usize;
        Ok(Self {
            banks: vec![Bank::default(); num_banks.max(1)],
            bank_dims,
            row_idx,
            timing,
            clk: 0,
        })
    }

    /// Advances the model clock by one cycle.
    pub fn tick(&mut self) {
        self.clk += 1;
    }

    /// Applies the state change of issuing `command` to `coords`.
    ///
    /// The caller is expected to have checked readiness first; issuing an
    /// out-of-order command simply overwrites bank state the same way the
    /// device would.
    pub fn issue(&mut self, command: MemCommand, coords: &AddrVec) {
        let t = self.timing;
        let clk = self.clk;
        let row = coords_row(coords, self.row_idx);
        let bank = self.bank_mut(coords);
        match command {
            MemCommand::Activate => {
                bank.open_row = Some(row);
                bank.busy_until = clk + t.t_act;
            }
            MemCommand::Precharge | MemCommand::Refresh => {
                bank.open_row = None;
                bank.busy_until = clk + t.t_pre;
            }
            MemCommand::Read | MemCommand::Write => {
                bank.busy_until = clk + t.t_cas;
            }
            MemCommand::ReadAutoPre | MemCommand::WriteAutoPre => {
                bank.open_row = None;
                bank.busy_until = clk + t.t_cas + t.t_pre;
            }
        }
    }

    fn bank_index(&self, coords: &AddrVec) -> usize {
        let mut idx = 0u64;
        for (level, &dim) in self.bank_dims.iter().enumerate() {
            idx = idx * dim + coords[level];
        }
        idx as usize
    }

    fn bank(&self, coords: &AddrVec) -> &Bank {
        &self.banks[self.bank_index(coords)]
    }

    fn bank_mut(&mut self, coords: &AddrVec) -> &mut Bank {
        let idx = self.bank_index(coords);
        &mut self.banks[idx]
    }
}

fn coords_row(coords: &AddrVec, row_idx: usize) -> u64 {
    coords[row_idx]
}

impl DramModel for OpenRowModel {
    fn clk(&self) -> Clk {
        self.clk
    }

    fn check_ready(&self, command: MemCommand, coords: &AddrVec) -> bool {
        let bank = self.bank(coords);
        if self.clk < bank.busy_until {
            return false;
        }
        match command {
            MemCommand::Activate | MemCommand::Refresh => bank.open_row.is_none(),
            MemCommand::Precharge => bank.open_row.is_some(),
            MemCommand::Read
            | MemCommand::Write
            | MemCommand::ReadAutoPre
            | MemCommand::WriteAutoPre => bank.open_row == Some(coords_row(coords, self.row_idx)),
        }
    }

    fn preq_command(&self, final_command: MemCommand, coords: &AddrVec) -> MemCommand {
        let bank = self.bank(coords);
        match bank.open_row {
            None => MemCommand::Activate,
            Some(row) if row == coords_row(coords, self.row_idx) => final_command,
            Some(_) => MemCommand::Precharge,
        }
    }

    fn check_rowbuffer_hit(&self, command: MemCommand, coords: &AddrVec) -> bool {
        command.is_data_transfer()
            && self.bank(coords).open_row == Some(coords_row(coords, self.row_idx))
    }
}
