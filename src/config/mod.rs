//! Relay configuration
//!
//! Loads settings from `<config_dir>/sentry-feishu/settings.toml`, then
//! applies environment variables, then CLI flags.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[cfg(test)]
mod tests;

/// Default settings.toml content with all options commented out
pub const DEFAULT_SETTINGS: &str = r#"# sentry-feishu settings
# Location: ~/Library/Application Support/sentry-feishu/settings.toml (macOS)
#           ~/.config/sentry-feishu/settings.toml (Linux)

# ============================================================================
# Feishu bot
# ============================================================================

[feishu]
# Custom bot webhook URL (env: FEISHU_WEBHOOK_URL)
# webhook_url = "https://open.feishu.cn/open-apis/bot/v2/hook/<token>"

# Delivery timeout in seconds (env: FEISHU_TIMEOUT_SECS)
# timeout_secs = 5

# ============================================================================
# HTTP server
# ============================================================================

[server]
# Address to bind (env: HOST)
# host = "0.0.0.0"

# Port to listen on (env: PORT)
# port = 3000

# ============================================================================
# Logging
# ============================================================================

[log]
# trace, debug, info, warn, error (env: LOG_LEVEL, RUST_LOG wins over both)
# level = "info"
"#;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub feishu: FeishuSettings,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub log: LogSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeishuSettings {
    pub webhook_url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for FeishuSettings {
    fn default() -> Self {
        Self {
            webhook_url: None,
            timeout_secs: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    pub level: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub webhook_url: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
}

impl Settings {
    /// Check if a webhook URL is set
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.feishu
            .webhook_url
            .as_deref()
            .is_some_and(|url| !url.trim().is_empty())
    }

    /// Webhook URL, or an error explaining how to set it
    pub fn webhook_url(&self) -> Result<&str> {
        self.feishu
            .webhook_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Feishu webhook URL not configured. Set FEISHU_WEBHOOK_URL, pass --webhook-url, \
                    or add webhook_url under [feishu] in settings.toml"
                )
            })
    }

    /// Delivery deadline
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.feishu.timeout_secs.max(1))
    }

    /// `host:port` to bind
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Apply environment variables through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("FEISHU_WEBHOOK_URL") {
            self.feishu.webhook_url = Some(url);
        }
        if let Some(secs) = lookup("FEISHU_TIMEOUT_SECS") {
            self.feishu.timeout_secs = secs
                .trim()
                .parse()
                .with_context(|| format!("Invalid FEISHU_TIMEOUT_SECS: {}", secs))?;
        }
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .with_context(|| format!("Invalid PORT: {}", port))?;
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            self.log.level = level;
        }
        Ok(())
    }

    /// Apply command line flags
    pub fn apply_overrides(&mut self, overrides: Overrides) {
        if let Some(url) = overrides.webhook_url {
            self.feishu.webhook_url = Some(url);
        }
        if let Some(host) = overrides.host {
            self.server.host = host;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
    }
}

/// Get the path to the settings file
pub fn settings_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir().context("Could not determine config directory")?;
    Ok(config_dir.join("sentry-feishu").join("settings.toml"))
}

/// Parse settings from TOML
pub fn parse_settings(contents: &str) -> Result<Settings> {
    toml::from_str(contents).context("Failed to parse settings.toml")
}

/// Load settings from a file, `None` meaning the default location
///
/// A missing default file is fine; a missing explicit file is an error.
pub fn load_settings_file(path: Option<&Path>) -> Result<Settings> {
    let (path, required) = match path {
        Some(p) => (p.to_path_buf(), true),
        None => match settings_path() {
            Ok(p) => (p, false),
            Err(_) => return Ok(Settings::default()),
        },
    };

    if !path.exists() {
        if required {
            anyhow::bail!("Settings file not found: {}", path.display());
        }
        return Ok(Settings::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read settings from {:?}", path))?;
    parse_settings(&content)
}

/// Load settings from file and process environment
pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let mut settings = load_settings_file(path)?;
    settings.apply_env(|key| std::env::var(key).ok())?;
    Ok(settings)
}

/// Write the commented default settings file if none exists
pub fn init_settings_file(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
    }
    std::fs::write(path, DEFAULT_SETTINGS)
        .with_context(|| format!("Failed to write default settings to {:?}", path))?;
    Ok(true)
}
