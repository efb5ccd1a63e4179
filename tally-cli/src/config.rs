use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Same ceiling the upload form enforces.
pub const DEFAULT_MAX_FILE_BYTES: u64 = 5 * 1024 * 1024;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub general: GeneralSection,
    pub import: ImportSection,
    pub report: ReportSection,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeneralSection {
    /// Used when `TALLY_LOG` is unset, e.g. "warn" or "tally=debug"
    pub log_level: String,
    /// Profile id used when a command gets no `--profile`
    pub default_profile: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ImportMode {
    #[default]
    Replace,
    Merge,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ImportSection {
    pub max_file_bytes: u64,
    pub mode: ImportMode,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReportSection {
    /// All, Deposit or Withdrawal
    pub default_kind: String,
    /// Display only; amounts are never converted
    pub currency_symbol: String,
    /// 0 prints every insight
    pub insight_limit: usize,
}

impl Default for GeneralSection {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            default_profile: None,
        }
    }
}

impl Default for ImportSection {
    fn default() -> Self {
        Self {
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            mode: ImportMode::Replace,
        }
    }
}

impl Default for ReportSection {
    fn default() -> Self {
        Self {
            default_kind: "All".to_string(),
            currency_symbol: "€".to_string(),
            insight_limit: 0,
        }
    }
}

pub fn config_path(home: &Path) -> PathBuf {
    home.join("config.toml")
}

pub fn load_config(home: &Path) -> Result<Config> {
    let p = config_path(home);
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_config(home: &Path, cfg: &Config) -> Result<()> {
    fs::create_dir_all(home).with_context(|| format!("create {}", home.display()))?;
    let p = config_path(home);
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config(home: &Path) -> Result<()> {
    let p = config_path(home);
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(home, &Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config(dir.path()).unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.import.max_file_bytes, 5 * 1024 * 1024);
        assert_eq!(cfg.report.currency_symbol, "€");
    }

    #[test]
    fn test_partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            config_path(dir.path()),
            "[import]\nmode = \"merge\"\n\n[report]\ninsight_limit = 3\n",
        )
        .unwrap();
        let cfg = load_config(dir.path()).unwrap();
        assert_eq!(cfg.import.mode, ImportMode::Merge);
        assert_eq!(cfg.import.max_file_bytes, DEFAULT_MAX_FILE_BYTES);
        assert_eq!(cfg.report.insight_limit, 3);
        assert_eq!(cfg.general.log_level, "warn");
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = Config::default();
        cfg.general.default_profile = Some("weekend".into());
        save_config(dir.path(), &cfg).unwrap();
        assert_eq!(load_config(dir.path()).unwrap(), cfg);
    }

    #[test]
    fn test_bad_toml_names_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(config_path(dir.path()), "[import\n").unwrap();
        let err = load_config(dir.path()).unwrap_err();
        assert!(format!("{err:#}").contains("config.toml"));
    }
}
