mod card;
mod cli;
mod config;
mod feishu;
mod sentry;
mod server;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use serde_json::Value;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{Cli, Command};
use config::{Overrides, Settings};
use feishu::{CardSender, FeishuClient};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let config_path = cli.config.as_deref();

    match command {
        Command::Serve {
            host,
            port,
            webhook_url,
        } => {
            let settings = load(config_path)?;
            cmd_serve(
                settings,
                Overrides {
                    webhook_url,
                    host,
                    port,
                },
            )
            .await
        }
        Command::Render { payload, compact } => {
            load(config_path)?;
            cmd_render(&payload, compact)
        }
        Command::Send {
            payload,
            webhook_url,
        } => {
            let settings = load(config_path)?;
            cmd_send(
                settings,
                &payload,
                Overrides {
                    webhook_url,
                    ..Overrides::default()
                },
            )
            .await
        }
        Command::Config { init } => cmd_config(config_path, init),
    }
}

/// Load settings and start logging
fn load(config_path: Option<&Path>) -> Result<Settings> {
    let settings = config::load_settings(config_path)?;
    init_logging(&settings.log.level)?;
    Ok(settings)
}

/// Initialize the tracing subscriber; `RUST_LOG` wins over the configured level
fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| anyhow::anyhow!("invalid log level: {}", e))?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();

    Ok(())
}

/// Read a JSON payload from a file, or stdin for "-"
fn read_payload(path: &Path) -> Result<Value> {
    let content = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read payload from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?
    };
    serde_json::from_str(&content).context("Payload is not valid JSON")
}

/// Build the card for a raw payload
fn build_card(raw: Value) -> card::CardDocument {
    let variant = sentry::classify(raw);
    tracing::debug!(kind = variant.kind(), "classified payload");
    card::render(&sentry::extract(variant, chrono::Utc::now()))
}

fn feishu_client(settings: &Settings) -> Result<FeishuClient> {
    FeishuClient::new(settings.webhook_url()?, settings.timeout())
}

/// Run the relay server
#[cfg(not(tarpaulin_include))]
async fn cmd_serve(mut settings: Settings, overrides: Overrides) -> Result<()> {
    settings.apply_overrides(overrides);
    let sender: Arc<dyn CardSender> = Arc::new(feishu_client(&settings)?);
    server::serve(&settings.bind_addr(), server::AppState::new(sender)).await
}

/// Print the rendered card
fn cmd_render(payload: &Path, compact: bool) -> Result<()> {
    let card = build_card(read_payload(payload)?);
    let json = if compact {
        serde_json::to_string(&card)
    } else {
        serde_json::to_string_pretty(&card)
    }
    .context("Failed to serialize card")?;
    println!("{json}");
    Ok(())
}

/// Render and deliver one payload
#[cfg(not(tarpaulin_include))]
async fn cmd_send(mut settings: Settings, payload: &Path, overrides: Overrides) -> Result<()> {
    settings.apply_overrides(overrides);
    let client = feishu_client(&settings)?;
    let card = build_card(read_payload(payload)?);
    client.send(&card).await?;
    println!("Sent to Feishu");
    Ok(())
}

/// Show config status
fn cmd_config(explicit: Option<&Path>, init: bool) -> Result<()> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => config::settings_path()?,
    };

    if init {
        if config::init_settings_file(&path)? {
            println!("Wrote {}", path.display());
        } else {
            println!("{} already exists", path.display());
        }
    }

    let settings = config::load_settings(explicit)?;

    println!("sentry-feishu Configuration");
    println!("{}", "-".repeat(40));
    println!("Settings:     {}", path.display());
    println!(
        "Webhook URL:  {}",
        if settings.is_configured() {
            "Yes"
        } else {
            "No"
        }
    );
    println!("Listen:       {}", settings.bind_addr());
    println!("Timeout:      {}s", settings.timeout().as_secs());
    println!("Log level:    {}", settings.log.level);
    Ok(())
}
