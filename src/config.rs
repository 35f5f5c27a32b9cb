use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::history::DEFAULT_HISTORY_FILE;

/// Compare French real-estate tax regimes computed by a simulation workbook.
#[derive(Debug, Clone, Parser)]
#[command(name = "immofisc", version, about)]
pub struct Config {
    /// Workbook to open at start-up.
    #[arg(short, long, env = "IMMO_WORKBOOK")]
    pub workbook: Option<PathBuf>,

    /// Simulation history file.
    #[arg(long, env = "IMMO_HISTORY", default_value = DEFAULT_HISTORY_FILE)]
    pub history: PathBuf,

    /// Address of the local web view.
    #[arg(long, env = "IMMO_BIND", default_value = "127.0.0.1:5000")]
    pub bind: SocketAddr,

    /// Start the web view right away.
    #[arg(long)]
    pub serve: bool,

    /// Do not read commands from stdin; keep serving until interrupted.
    #[arg(long, requires = "serve")]
    pub no_console: bool,
}
