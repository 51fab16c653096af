use std::{path::PathBuf, time::Duration};

use anyhow::{anyhow, Context, Result};

use crate::scan::ScanTiming;

pub const ENV_DATA_DIR: &str = "AGRISCAN_DATA_DIR";
pub const ENV_TICK_MS: &str = "AGRISCAN_TICK_MS";
pub const ENV_SETTLE_MS: &str = "AGRISCAN_SETTLE_MS";
pub const ENV_DEBUG: &str = "AGRISCAN_DEBUG";

const DATABASE_FILE: &str = "agriscan.sqlite3";
const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub timing: ScanTiming,
    pub debug: bool,
}

impl AppConfig {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            timing: ScanTiming::default(),
            debug: false,
        }
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process
    /// environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let data_dir = match lookup(ENV_DATA_DIR).filter(|value| !value.trim().is_empty()) {
            Some(dir) => PathBuf::from(dir),
            None => default_data_dir()?,
        };

        let defaults = ScanTiming::default();
        let timing = ScanTiming {
            tick_interval: millis_var(&lookup, ENV_TICK_MS)?.unwrap_or(defaults.tick_interval),
            settle_delay: millis_var(&lookup, ENV_SETTLE_MS)?.unwrap_or(defaults.settle_delay),
        };

        let debug = lookup(ENV_DEBUG)
            .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Ok(Self {
            data_dir,
            timing,
            debug,
        })
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE)
    }

    pub fn settings_path(&self) -> PathBuf {
        self.data_dir.join(SETTINGS_FILE)
    }
}

fn default_data_dir() -> Result<PathBuf> {
    dirs::data_dir()
        .map(|dir| dir.join("agriscan"))
        .ok_or_else(|| anyhow!("no platform data directory; set {ENV_DATA_DIR}"))
}

fn millis_var(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<Duration>> {
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };

    let millis: u64 = raw
        .trim()
        .parse()
        .with_context(|| format!("{key} must be a whole number of milliseconds, got '{raw}'"))?;
    if millis == 0 {
        return Err(anyhow!("{key} must be greater than zero"));
    }
    Ok(Some(Duration::from_millis(millis)))
}
