use std::fmt;

use log::*;
use thiserror::Error;

/// Ownership state of a block of the address space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockState {
    /// The block is available for allocation.
    Free,
    /// The block is held by the named process.
    Owned(String),
}

/// Maximal contiguous range of the address space with uniform
/// ownership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Offset of the block from the start of the address space.
    pub start: u64,
    /// Size of the block in capacity units (KB). Never zero.
    pub size: u64,
    /// Whether the block is free or owned by a process.
    pub state: BlockState,
}

impl Block {
    pub fn free(start: u64, size: u64) -> Self {
        Self {
            start,
            size,
            state: BlockState::Free,
        }
    }

    /// Last offset covered by the block (inclusive).
    pub fn end(&self) -> u64 {
        self.start + self.size - 1
    }

    pub fn is_free(&self) -> bool {
        self.state == BlockState::Free
    }

    /// Name of the owning process, if any.
    pub fn owner(&self) -> Option<&str> {
        match &self.state {
            BlockState::Free => None,
            BlockState::Owned(name) => Some(name),
        }
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.state {
            BlockState::Free => write!(
                f, "[{}-{}]  FREE ({} KB)",
                self.start, self.end(), self.size,
            ),
            BlockState::Owned(name) => write!(
                f, "[{}-{}]  {} ({} KB) - ALLOCATED",
                self.start, self.end(), name, self.size,
            ),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Total memory must be at least 1 KB.")]
    EmptyAddressSpace,
}

/// Ordered list of the blocks the address space is comprised
/// of. The blocks are sorted by start offset, contiguous, and
/// together cover `[0, total)` exactly.
#[derive(Debug, Clone)]
pub struct Ledger {
    /// Size of the whole address space.
    total: u64,
    /// Blocks in ascending start order.
    blocks: Vec<Block>,
}

impl Ledger {
    pub fn new(total: u64) -> Result<Self, LedgerError> {
        if total == 0 {
            return Err(LedgerError::EmptyAddressSpace);
        }

        // At first nothing is allocated, so the ledger holds a
        // single free block that spans the whole address
        // space.
        Ok(Self {
            total,
            blocks: vec![Block::free(0, total)],
        })
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Index of the first free block that can hold `size`
    /// units, scanning from the lowest offset.
    pub fn first_fit(&self, size: u64) -> Option<usize> {
        self.blocks
            .iter()
            .position(|block| block.is_free() && block.size >= size)
    }

    /// Index of the block held by `owner`, if any.
    pub fn find_owner(&self, owner: &str) -> Option<usize> {
        self.blocks
            .iter()
            .position(|block| block.owner() == Some(owner))
    }

    /// Hands the free block at `index` over to `owner`,
    /// shrinking it to `size` units. Whatever is left of the
    /// block is inserted right after it as a new free block.
    pub(crate) fn split(&mut self, index: usize, owner: &str, size: u64) -> Block {
        let block = &mut self.blocks[index];
        debug_assert!(block.is_free() && block.size >= size && size > 0);

        let remaining = block.size - size;
        block.state = BlockState::Owned(owner.to_string());
        block.size = size;
        let owned = block.clone();

        // On an exact fit there is nothing left over, and we
        // must not create an empty block.
        if remaining > 0 {
            debug!(
                "Split block at {}: {} KB to {}, {} KB left free.",
                owned.start, size, owner, remaining,
            );
            self.blocks.insert(index + 1, Block::free(owned.start + size, remaining));
        } else {
            debug!("Exact fit at {} for {} ({} KB).", owned.start, owner, size);
        }

        owned
    }

    /// Marks the block at `index` as free, then merges it with
    /// its free neighbours. Returns the block as it was before
    /// being freed.
    pub(crate) fn free(&mut self, index: usize) -> Block {
        let released = self.blocks[index].clone();
        self.blocks[index].state = BlockState::Free;
        self.coalesce();
        released
    }

    /// Merges every run of adjacent free blocks into a single
    /// free block.
    pub(crate) fn coalesce(&mut self) {
        let mut i = 0;
        while i + 1 < self.blocks.len() {
            // Stay on the same index after a merge, since the
            // block after the removed one may be free too.
            if self.blocks[i].is_free() && self.blocks[i + 1].is_free() {
                let right = self.blocks.remove(i + 1);
                let left = &mut self.blocks[i];
                left.size += right.size;
                debug!(
                    "Merged free blocks at {} and {} into {} KB.",
                    left.start, right.start, left.size,
                );
            } else {
                i += 1;
            }
        }
    }

    /// Checks the structural invariants of the ledger, returning
    /// a description of the first violation found.
    pub fn check_invariants(&self) -> Result<(), String> {
        let first = self.blocks.first().ok_or("ledger has no blocks")?;
        if first.start != 0 {
            return Err(format!("first block starts at {}", first.start));
        }

        let mut owners = std::collections::HashSet::new();
        for (i, block) in self.blocks.iter().enumerate() {
            if block.size == 0 {
                return Err(format!("block {} has size 0", i));
            }
            if let Some(owner) = block.owner() {
                if !owners.insert(owner) {
                    return Err(format!("{} owns more than one block", owner));
                }
            }
        }

        for (i, pair) in self.blocks.windows(2).enumerate() {
            let (left, right) = (&pair[0], &pair[1]);
            if right.start != left.start + left.size {
                return Err(format!("gap or overlap between blocks {} and {}", i, i + 1));
            }
            if left.is_free() && right.is_free() {
                return Err(format!("blocks {} and {} are both free", i, i + 1));
            }
        }

        // Blocks are contiguous from 0, so the last one ends
        // where the address space does only if the sizes add up.
        let covered: u64 = self.blocks.iter().map(|block| block.size).sum();
        if covered != self.total {
            return Err(format!("blocks cover {} of {} KB", covered, self.total));
        }

        Ok(())
    }
}
