use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod commands;

use commands::serve;

#[derive(Parser)]
#[command(name = "fintrack")]
#[command(about = "Personal-finance bookkeeping backend")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server
    Serve {
        /// Bind address for the web server
        ///
        /// Format: IP:PORT (e.g., 0.0.0.0:3000, 127.0.0.1:8080).
        /// Falls back to BIND_ADDRESS, then to 0.0.0.0:3000.
        #[arg(short, long)]
        bind_address: Option<String>,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::Serve { bind_address } => {
                let bind_address =
                    bind_address.unwrap_or_else(crate::config::get_bind_address);
                serve(&bind_address).await?;
            }
        }
        Ok(())
    }
}
