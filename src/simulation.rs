use std::fs;
use std::io::Write;

use anyhow::{Context, Result};
use log::*;

use crate::allocator::{Allocator, Event};
use crate::config::Config;
use crate::report;
use crate::request::Script;

/// One run of a request script against a fresh allocator.
#[derive(Debug)]
pub struct Simulation {
    allocator: Allocator,
    events: Vec<Event>,
}

impl Simulation {
    pub fn new(total_memory: u64) -> Result<Self> {
        Ok(Self {
            allocator: Allocator::new(total_memory)?,
            events: Vec::new(),
        })
    }

    /// Runs every request of the script in order, calling
    /// `on_event` after each one.
    pub fn run<F>(script: &Script, mut on_event: F) -> Result<Self>
    where
        F: FnMut(&Event) -> Result<()>,
    {
        let mut simulation = Self::new(script.total_memory)?;
        info!(
            "Running {} requests over {} KB.",
            script.requests.len(), script.total_memory,
        );

        for request in &script.requests {
            let event = simulation.allocator.handle(request);
            if event.is_success() {
                debug!("{:?}", event);
            } else {
                info!("Rejected: {}", event);
            }
            on_event(&event)?;
            simulation.events.push(event);
        }

        info!(
            "Finished: {} allocations succeeded, {} failed.",
            simulation.allocator.successful_allocations(),
            simulation.allocator.failed_allocations(),
        );
        Ok(simulation)
    }

    pub fn allocator(&self) -> &Allocator {
        &self.allocator
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }
}

/// Reads the script named by the configuration, runs it, and
/// writes the full report to `out`.
pub fn run_file<W: Write>(config: &Config, out: &mut W) -> Result<Simulation> {
    let text = fs::read_to_string(&config.input)
        .with_context(|| format!("Error reading file: {}", config.input.display()))?;
    let script: Script = text
        .parse()
        .with_context(|| format!("Invalid request script: {}", config.input.display()))?;

    report::write_banner(out)?;
    report::write_header(out, &config.input, script.total_memory)?;

    let simulation = Simulation::run(&script, |event| {
        if config.quiet {
            Ok(())
        } else {
            report::write_event(&mut *out, event)
        }
    })?;

    report::write_report(out, simulation.allocator())?;
    Ok(simulation)
}
