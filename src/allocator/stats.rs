use super::memory::Ledger;

/// Aggregate usage figures folded over a ledger.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Statistics {
    /// Size of the whole address space.
    pub total: u64,
    /// Sum of the sizes of owned blocks.
    pub allocated: u64,
    /// Sum of the sizes of free blocks.
    pub free: u64,
    /// Number of owned blocks (one per process).
    pub num_processes: usize,
    pub num_free_blocks: usize,
    /// Size of the largest free block, 0 if there is none.
    pub largest_free: u64,
}

impl Statistics {
    pub fn from_ledger(ledger: &Ledger) -> Self {
        let mut stats = Self {
            total: ledger.total(),
            allocated: 0,
            free: 0,
            num_processes: 0,
            num_free_blocks: 0,
            largest_free: 0,
        };

        for block in ledger.blocks() {
            if block.is_free() {
                stats.free += block.size;
                stats.num_free_blocks += 1;
                stats.largest_free = stats.largest_free.max(block.size);
            } else {
                stats.allocated += block.size;
                stats.num_processes += 1;
            }
        }

        stats
    }

    pub fn allocated_pct(&self) -> f64 {
        self.allocated as f64 * 100.0 / self.total as f64
    }

    pub fn free_pct(&self) -> f64 {
        self.free as f64 * 100.0 / self.total as f64
    }

    /// Share of the free memory that lies outside the largest
    /// free block, in percent. A fully allocated space has no
    /// fragmentation.
    pub fn external_fragmentation(&self) -> f64 {
        if self.free == 0 {
            return 0.0;
        }
        (self.free - self.largest_free) as f64 * 100.0 / self.free as f64
    }
}
