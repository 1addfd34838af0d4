use anyhow::Result;
use clap::Parser;
use log::*;

use firstfit::{config::Config, simulation};

fn main() -> Result<()> {
    let config = Config::parse();
    config.init_logging();

    // The report goes to stdout, logs to stderr.
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    simulation::run_file(&config, &mut out)?;

    info!("Done.");
    Ok(())
}
