use std::path::PathBuf;

use clap::Parser;

/// Command line options of the simulator.
#[derive(Parser, Debug, Clone)]
#[command(name = "firstfit")]
#[command(about = "Simulates first-fit contiguous memory allocation from a request script")]
#[command(version)]
pub struct Config {
    /// Request script: total memory on the first line, then
    /// `REQUEST <name> <size>` and `RELEASE <name>` lines.
    pub input: PathBuf,

    /// Log level used when RUST_LOG is not set.
    #[arg(long, default_value = "info")]
    pub log_level: log::LevelFilter,

    /// Only print the final memory state and statistics.
    #[arg(short, long)]
    pub quiet: bool,
}

impl Config {
    /// Points the logger at the configured level, unless the
    /// environment already asks for one.
    pub fn init_logging(&self) {
        if std::env::var_os("RUST_LOG").is_none() {
            std::env::set_var("RUST_LOG", self.log_level.to_string());
        }
        pretty_env_logger::init();
    }
}
