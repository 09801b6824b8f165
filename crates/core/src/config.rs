//! Configuration system for the DRAM simulator core.
//!
//! This module defines all configuration structures and enums used to
//! parameterize the core. It provides:
//! 1. **Defaults:** Baseline device constants (organization, burst, timing).
//! 2. **Structures:** Hierarchical config for organization, mapper,
//!    scheduler, device model, and the trace front end.
//! 3. **Enums:** Address-mapper strategy selection.
//!
//! Configuration is supplied as JSON (see the CLI) or via [`Config::default`].

use serde::Deserialize;

/// Default configuration constants for the simulator core.
///
/// These values define the baseline device configuration when not explicitly
/// overridden in a configuration file.
mod defaults {
    /// Internal prefetch size in burst-granular column units (DDR4-style 8n).
    pub const PREFETCH_SIZE: u64 = 8;

    /// Data bus width in bits.
    pub const CHANNEL_WIDTH: u64 = 64;

    /// Starvation threshold in cycle-equivalents.
    ///
    /// A pending request older than this is granted unconditional priority
    /// over row-buffer locality.
    pub const STARVE_THRESHOLD: u64 = 200;

    /// Request buffer capacity per channel controller.
    pub const BUFFER_CAPACITY: usize = 32;

    /// Data size in bytes of a single read/write device operation.
    ///
    /// Front-end requests larger than this are split into unit-sized pieces.
    /// Must be a power of two.
    pub const UNIT_TRANSFER_SIZE: u64 = 512;

    /// The front end attempts to launch one request every `PERIOD` cycles.
    pub const PERIOD: u64 = 1;

    /// Cycles a bank stays busy after an activate.
    pub const T_ACT: u64 = 14;

    /// Cycles a bank stays busy after a precharge.
    pub const T_PRE: u64 = 14;

    /// Cycles a bank stays busy after a column access.
    pub const T_CAS: u64 = 14;

    /// Default addressing hierarchy, outermost to innermost.
    pub const LEVELS: [(&str, u64); 6] = [
        ("channel", 1),
        ("rank", 1),
        ("bankgroup", 4),
        ("bank", 4),
        ("row", 65536),
        ("column", 1024),
    ];
}

/// Root configuration for one simulated channel controller.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Device addressing hierarchy and burst constants.
    pub organization: OrganizationConfig,
    /// Address mapper strategy selection.
    pub mapper: MapperConfig,
    /// Scheduling policy parameters.
    pub scheduler: SchedulerConfig,
    /// Open-row reference model parameters.
    pub model: ModelConfig,
    /// Trace front-end parameters.
    pub frontend: FrontendConfig,
}

/// One addressing level: a name and an addressable-unit count.
#[derive(Clone, Debug, Deserialize)]
pub struct LevelConfig {
    /// Level name (e.g. `"bank"`, `"row"`). Linear mappers require a level
    /// literally named `"row"`; the column is always the last level.
    pub name: String,
    /// Addressable units at this level. Must be a power of two.
    pub count: u64,
}

/// Device organization section.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct OrganizationConfig {
    /// Ordered hierarchy levels, outermost first.
    pub levels: Vec<LevelConfig>,
    /// Internal prefetch size in column units.
    pub prefetch_size: u64,
    /// Data bus width in bits.
    pub channel_width: u64,
}

impl Default for OrganizationConfig {
    fn default() -> Self {
        Self {
            levels: defaults::LEVELS
                .iter()
                .map(|&(name, count)| LevelConfig {
                    name: name.to_owned(),
                    count,
                })
                .collect(),
            prefetch_size: defaults::PREFETCH_SIZE,
            channel_width: defaults::CHANNEL_WIDTH,
        }
    }
}

/// Address mapper strategy names.
///
/// All four strategies share the same setup (derived per-level bit widths,
/// prefetch adjustment, transfer offset) and differ only in how they carve
/// the remaining address bits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub enum MapperKind {
    /// Trivial hierarchical slicing, channel-rank-bank-row-column order.
    #[default]
    ChRaBaRoCo,
    /// Row-major reordering that keeps consecutive addresses in one row.
    RoBaRaCoCh,
    /// XOR-folded slicing that spreads strided accesses across banks.
    #[serde(alias = "MOP4CLXOR")]
    Mop4ClXor,
    /// Fully custom bit assignment compiled from a layout string.
    #[serde(alias = "CustomizedMapper")]
    Custom,
}

/// Address mapper section.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct MapperConfig {
    /// Strategy to instantiate.
    pub kind: MapperKind,
    /// Bit-layout string, e.g. `"16R-2B-1BG-7C-1BG-3C"`.
    ///
    /// Required when `kind` is [`MapperKind::Custom`], ignored otherwise.
    pub layout: Option<String>,
}

/// Scheduler section.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Cycles a request may wait before it outranks row-buffer locality.
    pub starve_threshold: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            starve_threshold: defaults::STARVE_THRESHOLD,
        }
    }
}

/// Open-row reference model section.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Bank busy cycles after an activate.
    pub t_act: u64,
    /// Bank busy cycles after a precharge.
    pub t_pre: u64,
    /// Bank busy cycles after a column access.
    pub t_cas: u64,
    /// Request buffer capacity of the channel controller.
    pub buffer_capacity: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            t_act: defaults::T_ACT,
            t_pre: defaults::T_PRE,
            t_cas: defaults::T_CAS,
            buffer_capacity: defaults::BUFFER_CAPACITY,
        }
    }
}

/// Trace front-end section.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct FrontendConfig {
    /// The front end tries to launch a request every `period` cycles.
    pub period: u64,
    /// Retries after a rejected send; `None` retries until accepted.
    pub retries: Option<u64>,
    /// Unit transfer size in bytes; larger requests are split into pieces.
    pub unit_transfer_size: u64,
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            period: defaults::PERIOD,
            retries: None,
            unit_transfer_size: defaults::UNIT_TRANSFER_SIZE,
        }
    }
}

impl From<ModelConfig> for crate::dram::RowTiming {
    fn from(cfg: ModelConfig) -> Self {
        Self {
            t_act: cfg.t_act,
            t_pre: cfg.t_pre,
            t_cas: cfg.t_cas,
        }
    }
}
