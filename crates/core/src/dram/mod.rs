//! Device organization and the oracle interface to the device model.
//!
//! This module provides:
//! 1. **Organization:** The ordered hierarchy of addressing levels (channel,
//!    rank, bank group, bank, row, column) with per-level unit counts and the
//!    global burst constants, validated at construction.
//! 2. **Commands:** The [`MemCommand`] vocabulary shared by the scheduler,
//!    plugins, and device models.
//! 3. **Oracles:** The [`DramModel`] trait — readiness, next-command, and
//!    row-buffer-hit predicates consumed by the scheduler and its observers.
//! 4. **Reference model:** A minimal per-bank open-row model
//!    ([`OpenRowModel`]) used by the CLI replay path and the test suite.

pub mod open_row;

pub use open_row::{OpenRowModel, RowTiming};

use crate::common::{AddrVec, Clk, ConfigError};
use crate::config::OrganizationConfig;

/// One tier of device addressing, ordered outermost to innermost.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Level {
    /// Human-readable level name (e.g. `"bank"`, `"row"`).
    pub name: String,
    /// Number of addressable units at this level. Always a power of two.
    pub count: u64,
}

/// The device addressing hierarchy plus global burst constants.
///
/// Construction validates the power-of-two invariant for every level and the
/// prefetch-versus-column-count constraint; an `Organization` that exists is
/// safe to derive bit widths from.
#[derive(Clone, Debug)]
pub struct Organization {
    levels: Vec<Level>,
    prefetch_size: u64,
    channel_width_bits: u64,
}

impl Organization {
    /// Builds and validates an organization.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotPowerOfTwo`] if any level count is not a
    /// power of two, [`ConfigError::InvalidPrefetch`] or
    /// [`ConfigError::InvalidTransferSize`] if the burst constants do not
    /// yield power-of-two widths, and
    /// [`ConfigError::PrefetchExceedsColumns`] if the innermost level holds
    /// fewer units than one prefetch transfers.
    pub fn new(
        levels: Vec<Level>,
        prefetch_size: u64,
        channel_width_bits: u64,
    ) -> Result<Self, ConfigError> {
        for level in &levels {
            if !level.count.is_power_of_two() {
                return Err(ConfigError::NotPowerOfTwo {
                    level: level.name.clone(),
                    count: level.count,
                });
            }
        }
        // The geometry derivation takes log2 of both of these; anything that
        // is zero or not a power of two has to be refused here, eagerly.
        if !prefetch_size.is_power_of_two() {
            return Err(ConfigError::InvalidPrefetch {
                prefetch: prefetch_size,
            });
        }
        let tx_bytes = prefetch_size * channel_width_bits / 8;
        if !tx_bytes.is_power_of_two() {
            return Err(ConfigError::InvalidTransferSize {
                prefetch: prefetch_size,
                width: channel_width_bits,
                bytes: tx_bytes,
            });
        }
        if let Some(innermost) = levels.last() {
            if innermost.count < prefetch_size {
                return Err(ConfigError::PrefetchExceedsColumns {
                    columns: innermost.count,
                    prefetch: prefetch_size,
                });
            }
        }
        Ok(Self {
            levels,
            prefetch_size,
            channel_width_bits,
        })
    }

    /// Builds an organization from its configuration section.
    ///
    /// # Errors
    ///
    /// Same validation failures as [`Organization::new`].
    pub fn from_config(cfg: &OrganizationConfig) -> Result<Self, ConfigError> {
        let levels = cfg
            .levels
            .iter()
            .map(|l| Level {
                name: l.name.clone(),
                count: l.count,
            })
            .collect();
        Self::new(levels, cfg.prefetch_size, cfg.channel_width)
    }

    /// Number of hierarchy levels.
    pub fn num_levels(&self) -> usize {
        self.levels.len()
    }

    /// The ordered levels, outermost first.
    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    /// Unit count of the level at `index`.
    pub fn count(&self, index: usize) -> u64 {
        self.levels[index].count
    }

    /// Name of the level at `index`.
    pub fn level_name(&self, index: usize) -> &str {
        &self.levels[index].name
    }

    /// Looks up the index of a level by name.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingLevel`] if no level carries that name.
    pub fn level_index(&self, name: &str) -> Result<usize, ConfigError> {
        self.levels
            .iter()
            .position(|l| l.name == name)
            .ok_or_else(|| ConfigError::MissingLevel {
                name: name.to_owned(),
            })
    }

    /// Internal prefetch size in burst-granular column units.
    pub fn prefetch_size(&self) -> u64 {
        self.prefetch_size
    }

    /// Data bus width in bits.
    pub fn channel_width_bits(&self) -> u64 {
        self.channel_width_bits
    }

    /// Address bits needed to select one unit at level `index`.
    ///
    /// This is the raw `log2(count)` width; the column-level prefetch
    /// adjustment is the mapper geometry's concern.
    pub fn bit_width(&self, index: usize) -> u32 {
        // Counts are validated powers of two, so trailing_zeros is exact.
        self.levels[index].count.trailing_zeros()
    }
}

/// A device-level command as tracked by the scheduler and plugins.
///
/// The core treats commands as opaque goals and steps; only the distinction
/// between data transfers and preparation commands matters to it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MemCommand {
    /// Open a row into the bank's sense amplifiers.
    Activate,
    /// Close the currently open row of a bank.
    Precharge,
    /// Column read from the open row.
    Read,
    /// Column write into the open row.
    Write,
    /// Column read followed by an automatic precharge.
    ReadAutoPre,
    /// Column write followed by an automatic precharge.
    WriteAutoPre,
    /// Refresh command (issued by external maintenance logic, observed here).
    Refresh,
}

impl MemCommand {
    /// Returns `true` for commands that move data over the bus.
    pub fn is_data_transfer(self) -> bool {
        matches!(
            self,
            Self::Read | Self::Write | Self::ReadAutoPre | Self::WriteAutoPre
        )
    }

    /// Short mnemonic used in recorded traces.
    pub fn name(self) -> &'static str {
        match self {
            Self::Activate => "ACT",
            Self::Precharge => "PRE",
            Self::Read => "RD",
            Self::Write => "WR",
            Self::ReadAutoPre => "RDA",
            Self::WriteAutoPre => "WRA",
            Self::Refresh => "REF",
        }
    }
}

impl std::fmt::Display for MemCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Oracle interface onto the device timing/state model.
///
/// The scheduler and plugins receive an implementation as an explicit
/// capability parameter on every call; the core never reaches into ambient
/// device state. All methods are total over coordinate vectors produced by a
/// mapper set up against the same organization.
pub trait DramModel {
    /// Current device clock in cycle-equivalents.
    fn clk(&self) -> Clk;

    /// Returns `true` if `command` could be issued to `coords` this cycle.
    fn check_ready(&self, command: MemCommand, coords: &AddrVec) -> bool;

    /// Converts an intended final command into the next legal command to
    /// issue toward that goal (e.g. `Read` on a closed bank → `Activate`).
    fn preq_command(&self, final_command: MemCommand, coords: &AddrVec) -> MemCommand;

    /// Returns `true` if `command` targets the row currently held open in the
    /// addressed bank's sense amplifiers.
    fn check_rowbuffer_hit(&self, command: MemCommand, coords: &AddrVec) -> bool;
}
