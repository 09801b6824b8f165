//! Pending-request bookkeeping and the command-ordering policy.
//!
//! This module provides:
//! 1. **Requests:** The pending operation record and the bounded request
//!    buffer ([`Request`], [`ReqBuffer`]).
//! 2. **Scheduler:** Starvation-aware FR-FCFS selection ([`Scheduler`]).
//! 3. **Plugins:** Observers of issued commands ([`ControllerPlugin`],
//!    [`TraceRecorder`], [`RowHitCounter`]).

pub mod plugin;
pub mod request;
pub mod scheduler;

pub use plugin::{ControllerPlugin, RowHitCounter, TraceRecorder};
pub use request::{AccessKind, ReqBuffer, Request};
pub use scheduler::Scheduler;
