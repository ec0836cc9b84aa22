use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use vibemap_core::{KeyValueStore, VibeError};

/// `$VIBEMAP_HOME`, else `~/.vibemap`.
pub fn vibemap_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("VIBEMAP_HOME") {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".vibemap"))
}

pub fn ensure_vibemap_home() -> Result<PathBuf> {
    let dir = vibemap_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

/// One JSON file per key under `<home>/store/`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn open_default() -> Result<Self> {
        Self::open(ensure_vibemap_home()?.join("store"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') { c } else { '_' })
            .collect();
        self.dir.join(format!("{file}.json"))
    }
}

fn store_err(action: &str, path: &Path, e: std::io::Error) -> VibeError {
    VibeError::Store(format!("{action} {}: {e}", path.display()))
}

impl KeyValueStore for FileStore {
    fn load(&self, key: &str) -> vibemap_core::Result<Option<String>> {
        let p = self.path_for(key);
        match fs::read_to_string(&p) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(store_err("read", &p, e)),
        }
    }

    fn save(&mut self, key: &str, value: String) -> vibemap_core::Result<()> {
        let p = self.path_for(key);
        // Readers never observe a partial document.
        let tmp = p.with_extension("json.tmp");
        fs::write(&tmp, value).map_err(|e| store_err("write", &tmp, e))?;
        fs::rename(&tmp, &p).map_err(|e| store_err("rename", &p, e))
    }

    fn remove(&mut self, key: &str) -> vibemap_core::Result<()> {
        let p = self.path_for(key);
        match fs::remove_file(&p) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(store_err("remove", &p, e)),
        }
    }
}
