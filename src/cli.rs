//! `clap`-derive CLI for the `bulkcached` server binary.

use crate::bulk::EngineKind;
use crate::config::CliOverrides;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliEngineKind {
    Ordered,
    Unordered,
}

impl From<CliEngineKind> for EngineKind {
    fn from(kind: CliEngineKind) -> Self {
        match kind {
            CliEngineKind::Ordered => Self::Ordered,
            CliEngineKind::Unordered => Self::Unordered,
        }
    }
}

/// Command-line flags for the `bulkcached` server binary.
#[derive(Debug, Parser)]
#[command(name = "bulkcached", about = "In-memory TTL-based bulk cache server")]
pub struct Cli {
    /// Port for the Dage line protocol server.
    #[arg(long)]
    pub dage_port: Option<u16>,

    /// Port for the HTTP/JSON server.
    #[arg(long)]
    pub http_port: Option<u16>,

    /// Storage engine for newly created bulks.
    #[arg(long, value_enum)]
    pub engine: Option<CliEngineKind>,

    /// Name of the process-wide container.
    #[arg(long)]
    pub container_name: Option<String>,

    /// Path to a `bulkcache.toml` configuration file.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Cli {
    #[must_use]
    pub fn into_overrides(self) -> CliOverrides {
        CliOverrides {
            dage_port: self.dage_port,
            http_port: self.http_port,
            engine: self.engine.map(Into::into),
            container_name: self.container_name,
            config_path: self.config,
        }
    }
}
