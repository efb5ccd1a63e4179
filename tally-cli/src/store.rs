//! On-disk profile store under the tally home directory.
//!
//!   profiles.json          index of profiles, in creation order
//!   profiles/<id>.json     raw rows of one profile

use anyhow::{Context, Result, bail};
use chrono::Utc;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tally_core::RawRow;
use tracing::{debug, info};

pub const DEFAULT_PROFILE_NAME: &str = "Main";

/// `$TALLY_HOME`, falling back to `~/.tally`
pub fn tally_home() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os("TALLY_HOME").filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".tally"))
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    pub id: String,
    pub name: String,
    /// RFC 3339, UTC
    pub created_at: String,
}

pub struct Store {
    root: PathBuf,
}

impl Store {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let rows_dir = root.join("profiles");
        fs::create_dir_all(&rows_dir).with_context(|| format!("create {}", rows_dir.display()))?;
        Ok(Self { root })
    }

    fn index_path(&self) -> PathBuf {
        self.root.join("profiles.json")
    }

    fn rows_path(&self, id: &str) -> PathBuf {
        self.root.join("profiles").join(format!("{id}.json"))
    }

    pub fn list(&self) -> Result<Vec<Profile>> {
        read_json_or_default(&self.index_path())
    }

    fn write_index(&self, profiles: &[Profile]) -> Result<()> {
        write_json(&self.index_path(), profiles)
    }

    pub fn get(&self, id: &str) -> Result<Profile> {
        self.list()?
            .into_iter()
            .find(|p| p.id == id)
            .with_context(|| format!("no profile with id '{id}' (see: tally profile list)"))
    }

    pub fn create(&self, name: &str) -> Result<Profile> {
        let name = name.trim();
        if name.is_empty() {
            bail!("profile name must not be empty");
        }
        let mut profiles = self.list()?;

        let base = slugify(name)?;
        let mut id = base.clone();
        let mut n = 2;
        while profiles.iter().any(|p| p.id == id) {
            id = format!("{base}-{n}");
            n += 1;
        }

        let profile = Profile {
            id,
            name: name.to_string(),
            created_at: Utc::now().to_rfc3339(),
        };
        profiles.push(profile.clone());
        self.write_index(&profiles)?;
        info!(id = %profile.id, "profile created");
        Ok(profile)
    }

    pub fn rename(&self, id: &str, name: &str) -> Result<Profile> {
        let name = name.trim();
        if name.is_empty() {
            bail!("profile name must not be empty");
        }
        let mut profiles = self.list()?;
        let profile = profiles
            .iter_mut()
            .find(|p| p.id == id)
            .with_context(|| format!("no profile with id '{id}'"))?;
        profile.name = name.to_string();
        let renamed = profile.clone();
        self.write_index(&profiles)?;
        Ok(renamed)
    }

    /// Rows go first so a failure never leaves rows without an index entry.
    pub fn delete(&self, id: &str) -> Result<()> {
        let mut profiles = self.list()?;
        let before = profiles.len();
        profiles.retain(|p| p.id != id);
        if profiles.len() == before {
            bail!("no profile with id '{id}'");
        }

        let rows = self.rows_path(id);
        if rows.exists() {
            fs::remove_file(&rows).with_context(|| format!("remove {}", rows.display()))?;
        }
        self.write_index(&profiles)?;
        info!(id, "profile deleted");
        Ok(())
    }

    /// First profile in creation order, creating `Main` on an empty store.
    pub fn get_or_create_default(&self) -> Result<Profile> {
        match self.list()?.into_iter().next() {
            Some(p) => Ok(p),
            None => self.create(DEFAULT_PROFILE_NAME),
        }
    }

    /// Replace every row stored for `id`.
    pub fn save_rows(&self, id: &str, rows: &[RawRow]) -> Result<()> {
        self.get(id)?;
        write_json(&self.rows_path(id), rows)?;
        debug!(id, rows = rows.len(), "rows saved");
        Ok(())
    }

    pub fn load_rows(&self, id: &str) -> Result<Vec<RawRow>> {
        self.get(id)?;
        read_json_or_default(&self.rows_path(id))
    }

    /// Rows of every profile, concatenated in profile order
    pub fn load_all_rows(&self) -> Result<Vec<RawRow>> {
        let mut all = Vec::new();
        for p in self.list()? {
            all.extend(read_json_or_default::<Vec<RawRow>>(&self.rows_path(&p.id))?);
        }
        Ok(all)
    }
}

fn slugify(name: &str) -> Result<String> {
    let re = Regex::new(r"[^a-z0-9]+")?;
    let lowered = name.to_lowercase();
    let slug = re.replace_all(&lowered, "-");
    let slug = slug.trim_matches('-');
    Ok(if slug.is_empty() {
        "profile".to_string()
    } else {
        slug.to_string()
    })
}

fn read_json_or_default<T: Default + for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Ok(T::default());
    }
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&s).with_context(|| format!("parse {}", path.display()))
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}
