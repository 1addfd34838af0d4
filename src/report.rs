use std::io::Write;
use std::path::Path;

use anyhow::Result;

use crate::allocator::{Allocator, Event};

const RULE: &str = "========================================";
const THIN_RULE: &str = "----------------------------------------";

pub fn write_banner<W: Write>(out: &mut W) -> Result<()> {
    writeln!(out, "{}", RULE)?;
    writeln!(out, "Memory Allocation Simulator (First-Fit)")?;
    writeln!(out, "{}", RULE)?;
    writeln!(out)?;
    Ok(())
}

/// Header printed once the script has been read, before any
/// request runs.
pub fn write_header<W: Write>(out: &mut W, source: &Path, total_memory: u64) -> Result<()> {
    writeln!(out, "Reading from: {}", source.display())?;
    writeln!(out, "Total Memory: {} KB", total_memory)?;
    writeln!(out, "{}", THIN_RULE)?;
    writeln!(out)?;
    writeln!(out, "Processing requests...")?;
    writeln!(out)?;
    Ok(())
}

pub fn write_event<W: Write>(out: &mut W, event: &Event) -> Result<()> {
    writeln!(out, "{}", event)?;
    Ok(())
}

/// Final memory map followed by the usage statistics and the
/// allocation counters.
pub fn write_report<W: Write>(out: &mut W, allocator: &Allocator) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", RULE)?;
    writeln!(out, "Final Memory State")?;
    writeln!(out, "{}", RULE)?;

    // Blocks are numbered from 1 in address order.
    for (index, block) in allocator.blocks().iter().enumerate() {
        writeln!(out, "Block {}: {}", index + 1, block)?;
    }

    let stats = allocator.statistics();

    writeln!(out)?;
    writeln!(out, "{}", RULE)?;
    writeln!(out, "Memory Statistics")?;
    writeln!(out, "{}", RULE)?;
    writeln!(out, "Total Memory:           {} KB", stats.total)?;
    writeln!(out, "Allocated Memory:       {} KB ({:.2}%)", stats.allocated, stats.allocated_pct())?;
    writeln!(out, "Free Memory:            {} KB ({:.2}%)", stats.free, stats.free_pct())?;
    writeln!(out, "Number of Processes:    {}", stats.num_processes)?;
    writeln!(out, "Number of Free Blocks:  {}", stats.num_free_blocks)?;
    writeln!(out, "Largest Free Block:     {} KB", stats.largest_free)?;
    writeln!(out, "External Fragmentation: {:.2}%", stats.external_fragmentation())?;
    writeln!(out)?;
    writeln!(out, "Successful Allocations: {}", allocator.successful_allocations())?;
    writeln!(out, "Failed Allocations:     {}", allocator.failed_allocations())?;
    writeln!(out, "{}", RULE)?;
    Ok(())
}
