pub mod memory;
pub mod stats;

use std::fmt;

use log::*;
use thiserror::Error;

use crate::request::Request;
use memory::{Block, Ledger, LedgerError};
use stats::Statistics;

/// Reason an allocation request was rejected. The ledger is
/// left untouched in every case.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocationError {
    /// No free block is large enough for the request.
    #[error("Insufficient Memory")]
    InsufficientMemory,
    /// The process already holds a block.
    #[error("Process already allocated")]
    DuplicateOwner,
    /// Zero-sized requests cannot be placed.
    #[error("Invalid size")]
    ZeroSize,
}

/// Reason a release request was rejected.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseError {
    #[error("Process not found")]
    ProcessNotFound,
}

/// Observable outcome of a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    AllocationSucceeded { owner: String, size: u64, start: u64 },
    AllocationFailed { owner: String, size: u64, reason: AllocationError },
    ReleaseSucceeded { owner: String },
    ReleaseFailed { owner: String, reason: ReleaseError },
}

impl Event {
    pub fn is_success(&self) -> bool {
        matches!(self, Event::AllocationSucceeded { .. } | Event::ReleaseSucceeded { .. })
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::AllocationSucceeded { owner, size, .. } => {
                write!(f, "REQUEST {} {} KB → SUCCESS", owner, size)
            }
            Event::AllocationFailed { owner, size, reason } => {
                write!(f, "REQUEST {} {} KB → FAILED ({})", owner, size, reason)
            }
            Event::ReleaseSucceeded { owner } => write!(f, "RELEASE {} → SUCCESS", owner),
            Event::ReleaseFailed { owner, reason } => {
                write!(f, "RELEASE {} → FAILED ({})", owner, reason)
            }
        }
    }
}

/// First-fit allocator over a fixed-size address space. Holds
/// the block ledger and the allocation counters of one run.
#[derive(Debug, Clone)]
pub struct Allocator {
    /// Blocks the address space is divided into.
    ledger: Ledger,
    /// Number of allocation requests that were satisfied.
    successful_allocations: u64,
    /// Number of allocation requests that were rejected.
    failed_allocations: u64,
}

impl Allocator {
    pub fn new(total_memory: u64) -> Result<Self, LedgerError> {
        Ok(Self {
            ledger: Ledger::new(total_memory)?,
            successful_allocations: 0,
            failed_allocations: 0,
        })
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn blocks(&self) -> &[Block] {
        self.ledger.blocks()
    }

    pub fn total_memory(&self) -> u64 {
        self.ledger.total()
    }

    pub fn successful_allocations(&self) -> u64 {
        self.successful_allocations
    }

    pub fn failed_allocations(&self) -> u64 {
        self.failed_allocations
    }

    pub fn statistics(&self) -> Statistics {
        Statistics::from_ledger(&self.ledger)
    }

    /// Gives `owner` a block of exactly `size` units, carved out
    /// of the first free block that is large enough.
    pub fn allocate(&mut self, owner: &str, size: u64) -> Result<Block, AllocationError> {
        let result = self.place(owner, size);

        // Every allocation request counts exactly once, whatever
        // its outcome.
        match &result {
            Ok(_) => self.successful_allocations += 1,
            Err(_) => self.failed_allocations += 1,
        }
        result
    }

    fn place(&mut self, owner: &str, size: u64) -> Result<Block, AllocationError> {
        if size == 0 {
            return Err(AllocationError::ZeroSize);
        }

        // A process holds at most one block, otherwise a
        // release could not tell which one to free.
        if self.ledger.find_owner(owner).is_some() {
            warn!("{} already holds a block, rejecting request.", owner);
            return Err(AllocationError::DuplicateOwner);
        }

        // First fit: take the lowest free block that is large
        // enough, even if a tighter one exists further up.
        let index = self.ledger
            .first_fit(size)
            .ok_or(AllocationError::InsufficientMemory)?;

        Ok(self.ledger.split(index, owner, size))
    }

    /// Frees the block held by `owner` and merges it with any
    /// adjacent free space. Releases are not counted.
    pub fn release(&mut self, owner: &str) -> Result<Block, ReleaseError> {
        let index = self.ledger
            .find_owner(owner)
            .ok_or(ReleaseError::ProcessNotFound)?;

        Ok(self.ledger.free(index))
    }

    /// Applies a request and reports what happened.
    pub fn handle(&mut self, request: &Request) -> Event {
        match request {
            Request::Allocate { owner, size } => match self.allocate(owner, *size) {
                Ok(block) => Event::AllocationSucceeded {
                    owner: owner.clone(),
                    size: *size,
                    start: block.start,
                },
                Err(reason) => Event::AllocationFailed {
                    owner: owner.clone(),
                    size: *size,
                    reason,
                },
            },
            Request::Release { owner } => match self.release(owner) {
                Ok(_) => Event::ReleaseSucceeded { owner: owner.clone() },
                Err(reason) => Event::ReleaseFailed {
                    owner: owner.clone(),
                    reason,
                },
            },
        }
    }
}
