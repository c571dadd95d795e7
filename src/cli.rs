use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config/config.toml")]
    pub config: PathBuf,

    /// Symbol list CSV, overrides scan.symbols_path
    #[arg(short, long)]
    pub symbols: Option<PathBuf>,

    /// Run a single scan cycle and exit
    #[arg(long)]
    pub once: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,

    /// Append logs to this file instead of stderr
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}
