//! Single-channel issuer glue for trace replay.
//!
//! Owns the request buffer, mapper, scheduler, device model, and plugins for
//! one channel and drives one scheduling decision per cycle. The core keeps
//! these components pure; the channel is the mutable integration point.

use std::io;

use dramsim_core::addr_mapper::AddrMapper;
use dramsim_core::common::Clk;
use dramsim_core::config::Config;
use dramsim_core::controller::{ControllerPlugin, ReqBuffer, Request, Scheduler};
use dramsim_core::dram::{DramModel, OpenRowModel, Organization};
use dramsim_core::frontend::RequestSink;
use dramsim_core::stats::MemStats;
use dramsim_core::ConfigError;

/// One simulated channel: buffer, mapper, scheduler, model, and plugins.
pub struct Channel {
    mapper: AddrMapper,
    scheduler: Scheduler,
    starve_threshold: Clk,
    model: OpenRowModel,
    buffer: ReqBuffer,
    plugins: Vec<Box<dyn ControllerPlugin>>,
    stats: MemStats,
}

impl Channel {
    /// Builds the channel from a validated configuration and organization.
    pub fn new(cfg: &Config, organization: &Organization) -> Result<Self, ConfigError> {
        let mapper = AddrMapper::from_config(&cfg.mapper, organization)?;
        let model = OpenRowModel::new(organization, cfg.model.into())?;
        Ok(Self {
            mapper,
            scheduler: Scheduler::new(cfg.scheduler.starve_threshold),
            starve_threshold: cfg.scheduler.starve_threshold,
            model,
            buffer: ReqBuffer::new(cfg.model.buffer_capacity),
            plugins: Vec::new(),
            stats: MemStats::default(),
        })
    }

    /// Attaches an observer plugin.
    pub fn add_plugin(&mut self, plugin: Box<dyn ControllerPlugin>) {
        self.plugins.push(plugin);
    }

    /// Advances one cycle: pick the best request, issue its command if the
    /// device is ready, and return the request if it departed.
    pub fn tick(&mut self) -> Option<Request> {
        self.model.tick();
        self.stats.cycles += 1;
        // The oracle's clock is the only clock; every decision this cycle is
        // stamped against it.
        let clk = self.model.clk();

        let Some(best) = self
            .scheduler
            .select_best(&mut self.buffer, clk, &self.model)
        else {
            self.stats.empty_decisions += 1;
            for plugin in &mut self.plugins {
                plugin.update(clk, None, &self.model);
            }
            return None;
        };

        let command = self.buffer.get(best).command?;
        let ready = self
            .model
            .check_ready(command, &self.buffer.get(best).addr_vec);
        if !ready {
            self.stats.idle_decisions += 1;
            for plugin in &mut self.plugins {
                plugin.update(clk, None, &self.model);
            }
            return None;
        }

        if clk > self.starve_threshold
            && self.buffer.get(best).arrive < clk - self.starve_threshold
        {
            self.stats.starvation_escalations += 1;
        }

        if command.is_data_transfer() {
            if self
                .model
                .check_rowbuffer_hit(command, &self.buffer.get(best).addr_vec)
            {
                self.stats.row_hits += 1;
            } else {
                self.stats.row_misses += 1;
            }
        }

        // Plugins observe the decision against the pre-issue device state.
        for plugin in &mut self.plugins {
            plugin.update(clk, Some(self.buffer.get(best)), &self.model);
        }

        self.model.issue(command, &self.buffer.get(best).addr_vec);

        if command == self.buffer.get(best).final_command() {
            let mut request = self.buffer.remove(best);
            request.depart = Some(clk);
            self.stats.total_latency += clk - request.arrive;
            match request.kind {
                dramsim_core::controller::AccessKind::Read => self.stats.reads_served += 1,
                dramsim_core::controller::AccessKind::Write => self.stats.writes_served += 1,
            }
            return Some(request);
        }
        None
    }

    /// Flushes plugin output.
    pub fn finalize(&mut self) -> io::Result<()> {
        for plugin in &mut self.plugins {
            plugin.finalize()?;
        }
        Ok(())
    }

    /// Counters accumulated so far.
    pub fn stats(&self) -> &MemStats {
        &self.stats
    }

    /// Returns `true` when no request is pending.
    pub fn is_drained(&self) -> bool {
        self.buffer.is_empty()
    }
}

impl RequestSink for Channel {
    fn try_send(&mut self, mut request: Request) -> bool {
        request.addr_vec = self.mapper.apply(request.addr);
        request.arrive = self.model.clk();
        match self.buffer.try_push(request) {
            Ok(()) => {
                self.stats.requests_admitted += 1;
                true
            }
            Err(_) => {
                self.stats.sends_rejected += 1;
                false
            }
        }
    }
}
