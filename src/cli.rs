//! Command-line interface

use crate::config::Overrides;
use clap::Parser;
use std::path::PathBuf;

/// Serve a directory of web build output, announcing `.gz` assets as
/// gzip-encoded so browsers decompress them.
#[derive(Debug, Parser)]
#[command(name = "gzserve", version, about)]
pub struct Cli {
    /// Port to listen on [default: 8888]
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Address to bind [default: 0.0.0.0]
    #[arg(long)]
    pub host: Option<String>,

    /// Directory to serve [default: docs]
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Configuration file, extension optional
    #[arg(short, long, default_value = "config")]
    pub config: String,

    /// Tokio worker threads [default: CPU cores]
    #[arg(long)]
    pub workers: Option<usize>,
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            host: self.host.clone(),
            port: self.port,
            root: self.root.clone(),
            workers: self.workers,
        }
    }
}
