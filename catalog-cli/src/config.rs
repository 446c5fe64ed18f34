use anyhow::{Context, Result};
use catalog_core::{FormTimings, ZeroAmountPolicy};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::state::{catalog_home, ensure_catalog_home};

pub const API_URL_ENV: &str = "CATALOG_API_URL";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiSection,
    #[serde(default)]
    pub form: FormSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSection {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormSection {
    /// Pause between a successful save and the jump back to the product list.
    pub redirect_delay_ms: u64,
    pub error_clear_delay_ms: u64,
    pub zero_amount: ZeroAmountPolicy,
}

impl Default for FormSection {
    fn default() -> Self {
        let timings = FormTimings::default();
        Self {
            redirect_delay_ms: timings.redirect_delay.as_millis() as u64,
            error_clear_delay_ms: timings.error_clear_delay.as_millis() as u64,
            zero_amount: ZeroAmountPolicy::default(),
        }
    }
}

impl FormSection {
    pub fn timings(&self) -> FormTimings {
        FormTimings {
            redirect_delay: Duration::from_millis(self.redirect_delay_ms),
            error_clear_delay: Duration::from_millis(self.error_clear_delay_ms),
        }
    }
}

impl Config {
    /// Env var first, then the command-line flag; the flag wins.
    pub fn with_overrides(mut self, env_url: Option<String>, flag_url: Option<String>) -> Self {
        if let Some(url) = env_url.filter(|u| !u.trim().is_empty()) {
            self.api.base_url = url;
        }
        if let Some(url) = flag_url {
            self.api.base_url = url;
        }
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(catalog_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

/// Loaded config with `CATALOG_API_URL` and `--api-url` applied.
pub fn resolve_config(flag_url: Option<String>) -> Result<Config> {
    Ok(load_config()?.with_overrides(std::env::var(API_URL_ENV).ok(), flag_url))
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = ensure_catalog_home()?.join("config.toml");
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}

pub fn show_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    let source = if p.exists() { p.display().to_string() } else { "defaults".to_string() };
    println!("# source: {source}");
    print!("{}", toml::to_string_pretty(cfg).context("serialize config")?);
    Ok(())
}
