//! Starvation-aware FR-FCFS request selection.
//!
//! The scheduler reduces the request buffer to a single winner with a
//! pairwise comparator applied as a left-to-right fold. Three tiers apply in
//! order: starvation (requests older than the threshold win outright, oldest
//! first), readiness (an immediately issuable command beats one that is not),
//! and arrival order (oldest first, left operand on exact ties).
//!
//! The comparator is not a total order; the fold order is part of the
//! policy's observable behavior, so the reduction must never be replaced by
//! a sort.

use crate::common::Clk;
use crate::dram::DramModel;

use super::request::ReqBuffer;

/// The command-ordering policy: FR-FCFS with a starvation escape hatch.
///
/// Starvation avoidance bounds worst-case latency under access patterns that
/// would otherwise starve non-row-hitting requests indefinitely; beneath it,
/// first-ready first-come-first-served exploits row-buffer locality with
/// arrival order as the fairness tiebreak.
#[derive(Clone, Copy, Debug)]
pub struct Scheduler {
    starve_threshold: Clk,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self {
            starve_threshold: 200,
        }
    }
}

impl Scheduler {
    /// Creates a scheduler with the given starvation threshold in cycles.
    pub fn new(starve_threshold: Clk) -> Self {
        Self { starve_threshold }
    }

    /// Selects the buffer index of the request to service next.
    ///
    /// Refreshes every request's next-command via the oracle first — the
    /// device's legal next command can change between scheduling calls —
    /// then folds the comparator across the buffer. Returns `None` only for
    /// an empty buffer; the buffer itself is never mutated beyond the
    /// command refresh, and eviction is the issuer's responsibility.
    pub fn select_best(
        &self,
        buffer: &mut ReqBuffer,
        clk: Clk,
        model: &impl DramModel,
    ) -> Option<usize> {
        if buffer.is_empty() {
            return None;
        }

        for request in buffer.iter_mut() {
            request.command = Some(model.preq_command(request.final_command(), &request.addr_vec));
        }

        let mut candidate = 0;
        for next in 1..buffer.len() {
            candidate = self.compare(buffer, candidate, next, clk, model);
        }
        Some(candidate)
    }

    /// Picks the winner between the requests at indices `a` and `b`.
    fn compare(
        &self,
        buffer: &ReqBuffer,
        a: usize,
        b: usize,
        clk: Clk,
        model: &impl DramModel,
    ) -> usize {
        let req_a = buffer.get(a);
        let req_b = buffer.get(b);

        if clk > self.starve_threshold {
            let starve_clk = clk - self.starve_threshold;
            let starving_a = req_a.arrive < starve_clk;
            let starving_b = req_b.arrive < starve_clk;
            if starving_a && starving_b {
                if req_a.arrive < req_b.arrive {
                    return a;
                }
                if req_a.arrive > req_b.arrive {
                    return b;
                }
                // Equal arrivals fall through to FR-FCFS.
            } else if starving_a {
                return a;
            } else if starving_b {
                return b;
            }
        }

        let ready_a = req_a
            .command
            .is_some_and(|cmd| model.check_ready(cmd, &req_a.addr_vec));
        let ready_b = req_b
            .command
            .is_some_and(|cmd| model.check_ready(cmd, &req_b.addr_vec));
        if ready_a != ready_b {
            return if ready_a { a } else { b };
        }

        // FCFS fallback; the left operand keeps exact ties.
        if req_a.arrive <= req_b.arrive { a } else { b }
    }
}
