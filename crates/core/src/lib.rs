//! Cycle-level DRAM addressing and scheduling core.
//!
//! This crate implements the address-decomposition and command-ordering core
//! of a memory-device simulator:
//! 1. **Common:** Address, clock, and coordinate-vector types plus the
//!    configuration error taxonomy.
//! 2. **DRAM:** Device organization descriptor, command vocabulary, oracle
//!    trait, and a minimal open-row reference model.
//! 3. **Address mapper:** Four interchangeable strategies turning a linear
//!    physical address into hierarchical device coordinates, including a
//!    compact bit-layout DSL for fully custom mappings.
//! 4. **Controller:** Pending-request buffer, starvation-aware FR-FCFS
//!    scheduling, and observer plugins (command trace, row-hit breakdown).
//! 5. **Front end:** Read/write trace parsing, unit-transfer splitting, and
//!    a replay driver with retry handling.

/// Address decomposition strategies and the bit-layout DSL.
pub mod addr_mapper;
/// Common types and errors (addresses, coordinate vectors, config errors).
pub mod common;
/// Configuration structures (organization, mapper, scheduler, front end).
pub mod config;
/// Request buffer, scheduler, and controller plugins.
pub mod controller;
/// Device organization, commands, oracles, and the open-row model.
pub mod dram;
/// Trace parsing and replay.
pub mod frontend;
/// Per-channel simulation counters.
pub mod stats;

pub use crate::addr_mapper::AddrMapper;
pub use crate::common::{Addr, AddrVec, Clk, ConfigError};
pub use crate::config::Config;
pub use crate::controller::{ReqBuffer, Request, Scheduler};
pub use crate::dram::{DramModel, MemCommand, OpenRowModel, Organization};
pub use crate::stats::MemStats;
