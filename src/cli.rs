use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sentry-feishu")]
#[command(about = "Relay Sentry webhooks to Feishu/Lark bots", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Settings file (default: <config dir>/sentry-feishu/settings.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the webhook relay server
    Serve {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Feishu bot webhook URL
        #[arg(long)]
        webhook_url: Option<String>,
    },

    /// Render a Sentry payload file to card JSON (no network)
    Render {
        /// Payload file, or "-" for stdin
        payload: PathBuf,

        /// Compact single-line output
        #[arg(long)]
        compact: bool,
    },

    /// Render a Sentry payload file and deliver it once
    Send {
        /// Payload file, or "-" for stdin
        payload: PathBuf,

        /// Feishu bot webhook URL
        #[arg(long)]
        webhook_url: Option<String>,
    },

    /// Show configuration status
    Config {
        /// Write a commented settings file if none exists
        #[arg(long)]
        init: bool,
    },
}
