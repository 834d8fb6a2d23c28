//! Command-line and environment configuration for the binaries.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use crate::network::DEFAULT_PORT;

fn default_addr() -> String {
    format!("127.0.0.1:{DEFAULT_PORT}")
}

/// Fleet server options.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Drone fleet server (newline-delimited JSON over TCP)")]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(long, env = "DRONE_BIND", default_value_t = default_addr())]
    pub bind: String,

    /// Directory holding one JSON history file per drone
    #[arg(long, env = "DRONE_HISTORY_DIR", default_value = "drone-history")]
    pub history_dir: PathBuf,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        self.bind.parse()
    }
}

/// Console client options.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Command-line client for the drone fleet server")]
pub struct ConsoleArgs {
    /// Server address
    #[arg(long, env = "DRONE_SERVER", default_value_t = default_addr())]
    pub server: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Register a drone on a free cell
    Register {
        x: i32,
        y: i32,
        /// NORTH, EAST, SOUTH or WEST (any case)
        direction: String,
    },
    /// Move a drone and print the trace
    Move {
        id: Uuid,
        x: i32,
        y: i32,
    },
    /// Show one drone
    Get(DroneRef),
    /// Show every recorded state of a drone
    History(DroneRef),
    /// Draw the field with every drone on it
    Field,
}

#[derive(Args, Debug, Clone)]
pub struct DroneRef {
    pub id: Uuid,
}

/// Installs the fmt subscriber, filtered by `RUST_LOG` (default `info`).
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
