//! Simulation statistics collection and reporting.
//!
//! Tracks per-channel counters for a replay run. It provides:
//! 1. **Front end:** Requests admitted and sends rejected by back-pressure.
//! 2. **Service:** Reads/writes completed and total service latency.
//! 3. **Locality:** Row-buffer hits and misses among data transfers.
//! 4. **Scheduler:** Idle and empty-buffer scheduling opportunities.

/// Counters for one simulated channel controller.
#[derive(Clone, Copy, Debug, Default)]
pub struct MemStats {
    /// Cycles simulated.
    pub cycles: u64,
    /// Requests admitted into the request buffer.
    pub requests_admitted: u64,
    /// Send attempts rejected because the buffer was full.
    pub sends_rejected: u64,
    /// Read requests fully serviced.
    pub reads_served: u64,
    /// Write requests fully serviced.
    pub writes_served: u64,
    /// Sum of (depart - arrive) over serviced requests.
    pub total_latency: u64,
    /// Data transfers that hit the open row.
    pub row_hits: u64,
    /// Data transfers that required activates or precharges first.
    pub row_misses: u64,
    /// Scheduling opportunities where the chosen command was not ready.
    pub idle_decisions: u64,
    /// Scheduling opportunities with an empty buffer.
    pub empty_decisions: u64,
    /// Commands issued for requests pending past the starvation threshold.
    pub starvation_escalations: u64,
}

impl MemStats {
    /// Average service latency in cycles, or 0 with nothing serviced.
    pub fn avg_latency(&self) -> f64 {
        let served = self.reads_served + self.writes_served;
        if served == 0 {
            0.0
        } else {
            self.total_latency as f64 / served as f64
        }
    }

    /// Row-hit rate among data transfers, or 0 with none observed.
    pub fn row_hit_rate(&self) -> f64 {
        let transfers = self.row_hits + self.row_misses;
        if transfers == 0 {
            0.0
        } else {
            self.row_hits as f64 / transfers as f64
        }
    }

    /// Renders a human-readable summary.
    pub fn report(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("cycles:             {}\n", self.cycles));
        out.push_str(&format!("requests admitted:  {}\n", self.requests_admitted));
        out.push_str(&format!("sends rejected:     {}\n", self.sends_rejected));
        out.push_str(&format!("reads served:       {}\n", self.reads_served));
        out.push_str(&format!("writes served:      {}\n", self.writes_served));
        out.push_str(&format!("avg latency:        {:.2}\n", self.avg_latency()));
        out.push_str(&format!(
            "row hits / misses:  {} / {}\n",
            self.row_hits, self.row_misses
        ));
        out.push_str(&format!("row hit rate:       {:.2}%\n", self.row_hit_rate() * 100.0));
        out.push_str(&format!("idle decisions:     {}\n", self.idle_decisions));
        out.push_str(&format!("empty decisions:    {}\n", self.empty_decisions));
        out.push_str(&format!(
            "starved escalations: {}\n",
            self.starvation_escalations
        ));
        out
    }
}
