use anyhow::{Context, Result};
use cardwise_core::CanonicalCategory;
use cardwise_engine::{SpendEstimates, DEFAULT_MONTHLY_SPEND};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::state::{cardwise_home, ensure_cardwise_home};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogSection,
    #[serde(default)]
    pub spend: SpendSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CatalogSection {
    /// JSON card catalog; the built-in snapshot is used when unset
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpendSection {
    /// Monthly dollars for categories without an estimate
    #[serde(default = "default_spend")]
    pub default: f64,
    /// category name -> monthly dollars
    #[serde(default)]
    pub estimates: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingSection {
    /// env_logger filter used when RUST_LOG is unset
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_spend() -> f64 {
    DEFAULT_MONTHLY_SPEND
}

fn default_level() -> String {
    "warn".to_string()
}

impl Default for SpendSection {
    fn default() -> Self {
        Self {
            default: DEFAULT_MONTHLY_SPEND,
            estimates: BTreeMap::new(),
        }
    }
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

impl SpendSection {
    /// Typed spend table. Unknown category names are a config error.
    pub fn to_estimates(&self) -> Result<SpendEstimates> {
        let mut out = SpendEstimates::new().with_default(self.default);
        for (name, monthly) in &self.estimates {
            let category: CanonicalCategory = name
                .parse()
                .with_context(|| format!("[spend.estimates] key {:?}", name))?;
            out = out.with_estimate(category, *monthly);
        }
        Ok(out)
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(cardwise_home()?.join("config.toml"))
}

/// Load `path`, or the default location. Missing file = defaults.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let p = match path {
        Some(p) => p.to_path_buf(),
        None => config_path()?,
    };
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    parse_config(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn parse_config(s: &str) -> Result<Config> {
    toml::from_str(s).context("parse config.toml")
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = ensure_cardwise_home()?.join("config.toml");
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
    let mut cfg = Config::default();
    // seed a couple of examples so the table shape is obvious
    cfg.spend.estimates.insert("dining".to_string(), 400.0);
    cfg.spend.estimates.insert("grocery".to_string(), 550.0);
    save_config(&cfg)?;
    println!("Wrote {}", p.display());
    Ok(())
}
