//! Pending operations and the bounded request buffer.

use crate::common::{Addr, AddrVec, Clk};
use crate::dram::MemCommand;

/// Whether a request reads from or writes to the device.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessKind {
    /// Data travels device → front end.
    Read,
    /// Data travels front end → device.
    Write,
}

/// One pending memory operation awaiting service.
///
/// The front end creates a request carrying only a linear address; the
/// address mapper decorates it with a coordinate vector once at admission.
/// `command` is the best-known next device command and is refreshed by the
/// scheduler every time the request is considered. The issuer removes the
/// request from the buffer once it is fully serviced.
#[derive(Clone, Debug)]
pub struct Request {
    /// Linear physical address.
    pub addr: Addr,
    /// Decomposed device coordinates; filled in exactly once at admission.
    pub addr_vec: AddrVec,
    /// Read or write.
    pub kind: AccessKind,
    /// Identifier of the front-end entry that spawned this request.
    pub source_id: usize,
    /// Admission timestamp; drives the FCFS and starvation tiers.
    pub arrive: Clk,
    /// Completion timestamp, set by the issuer when the request departs.
    pub depart: Option<Clk>,
    /// Next legal device command toward `final_command`, refreshed per
    /// scheduling call.
    pub command: Option<MemCommand>,
}

impl Request {
    /// Creates an unadmitted request; the mapper and buffer fill in the
    /// coordinates and arrival time.
    pub fn new(addr: Addr, kind: AccessKind, source_id: usize) -> Self {
        Self {
            addr,
            addr_vec: AddrVec::default(),
            kind,
            source_id,
            arrive: 0,
            depart: None,
            command: None,
        }
    }

    /// The command this request ultimately needs serviced.
    pub fn final_command(&self) -> MemCommand {
        match self.kind {
            AccessKind::Read => MemCommand::Read,
            AccessKind::Write => MemCommand::Write,
        }
    }
}

/// Bounded, ordered collection of pending requests.
///
/// Entry order is admission order and indices are stable for the duration of
/// one scheduling call; the issuer removes entries only after the chosen
/// command has been issued.
#[derive(Debug)]
pub struct ReqBuffer {
    entries: Vec<Request>,
    capacity: usize,
}

impl ReqBuffer {
    /// Creates a buffer holding at most `capacity` pending requests.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Number of pending requests.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no requests are pending.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` if the buffer cannot accept another request.
    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    /// Admits a request, or hands it back when the buffer is full.
    ///
    /// # Errors
    ///
    /// The rejected request is returned unchanged so the front end can retry.
    pub fn try_push(&mut self, request: Request) -> Result<(), Request> {
        if self.is_full() {
            return Err(request);
        }
        self.entries.push(request);
        Ok(())
    }

    /// Removes and returns the request at `index`, preserving the order of
    /// the remaining entries.
    pub fn remove(&mut self, index: usize) -> Request {
        self.entries.remove(index)
    }

    /// The request at `index`.
    pub fn get(&self, index: usize) -> &Request {
        &self.entries[index]
    }

    /// Iterates over pending requests in admission order.
    pub fn iter(&self) -> std::slice::Iter<'_, Request> {
        self.entries.iter()
    }

    /// Iterates mutably; used by the scheduler to refresh `command`.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Request> {
        self.entries.iter_mut()
    }
}
