//! Common types shared across the simulator core.
//!
//! This module provides:
//! 1. **Addressing:** Physical address and clock aliases, plus the decomposed
//!    coordinate vector ([`AddrVec`]).
//! 2. **Errors:** The configuration error taxonomy ([`ConfigError`]).

pub mod addr;
pub mod error;

pub use addr::{Addr, AddrVec, Clk};
pub use error::ConfigError;
