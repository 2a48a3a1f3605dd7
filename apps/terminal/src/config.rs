use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use shared::domain::StockSheet;

pub const DEFAULT_CONFIG_FILE: &str = "glass_quote.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub server_url: String,
    pub download_dir: PathBuf,
    /// `None` keeps the HTTP client's own default.
    pub request_timeout_secs: Option<u64>,
    pub default_stock: StockSheet,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5000".into(),
            download_dir: PathBuf::from("."),
            request_timeout_secs: None,
            default_stock: StockSheet::default(),
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Overrides fields from a flat `key = "value"` TOML table.
    pub fn apply_file(&mut self, raw: &str) -> Result<()> {
        let file_cfg: HashMap<String, String> =
            toml::from_str(raw).context("config file must be a flat table of strings")?;

        if let Some(v) = file_cfg.get("server_url") {
            self.server_url = v.clone();
        }
        if let Some(v) = file_cfg.get("download_dir") {
            self.download_dir = PathBuf::from(v);
        }
        if let Some(v) = file_cfg.get("request_timeout_secs") {
            self.request_timeout_secs = Some(parse_timeout(v)?);
        }
        if let Some(v) = file_cfg.get("default_stock") {
            self.default_stock = v.parse()?;
        }
        Ok(())
    }

    /// Overrides fields from environment variables, read through `var`.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(v) = var("GLASS_QUOTE_SERVER_URL") {
            self.server_url = v;
        }
        if let Some(v) = var("APP__SERVER_URL") {
            self.server_url = v;
        }

        if let Some(v) = var("APP__DOWNLOAD_DIR") {
            self.download_dir = PathBuf::from(v);
        }

        if let Some(v) = var("APP__REQUEST_TIMEOUT_SECS") {
            self.request_timeout_secs = Some(parse_timeout(&v)?);
        }

        if let Some(v) = var("APP__DEFAULT_STOCK") {
            self.default_stock = v.parse().context("APP__DEFAULT_STOCK")?;
        }
        Ok(())
    }
}

fn parse_timeout(raw: &str) -> Result<u64> {
    raw.trim()
        .parse::<u64>()
        .with_context(|| format!("invalid request timeout '{raw}', expected whole seconds"))
}

/// Defaults, then the config file, then the process environment.
///
/// A missing default config file is fine; a missing file that was asked for
/// explicitly is an error.
pub fn load_settings(config_path: Option<&Path>) -> Result<Settings> {
    let mut settings = Settings::default();

    let path = config_path.unwrap_or(Path::new(DEFAULT_CONFIG_FILE));
    match fs::read_to_string(path) {
        Ok(raw) => settings
            .apply_file(&raw)
            .with_context(|| format!("failed to load config file '{}'", path.display()))?,
        Err(err) if err.kind() == io::ErrorKind::NotFound && config_path.is_none() => {}
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read config file '{}'", path.display()))
        }
    }

    settings.apply_env(|key| std::env::var(key).ok())?;
    Ok(settings)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
