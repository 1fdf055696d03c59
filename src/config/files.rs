//! Reading and writing configuration files.
//!
//! Files hold a single JSON object. Anything else is a parse error.

use crate::error::ConfigError;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the configuration file in the home and working directories.
pub const CONFIG_FILE_NAME: &str = ".latz.json";

/// Where a configuration layer came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileSource {
    /// `~/.latz.json`
    Home,
    /// `$CWD/.latz.json`
    Cwd,
    /// Passed with `--config`
    Explicit,
}

impl std::fmt::Display for FileSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileSource::Home => write!(f, "home"),
            FileSource::Cwd => write!(f, "cwd"),
            FileSource::Explicit => write!(f, "explicit"),
        }
    }
}

/// A candidate configuration file and its tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    pub path: PathBuf,
    pub source: FileSource,
}

impl ConfigFile {
    pub fn new(path: impl Into<PathBuf>, source: FileSource) -> Self {
        Self {
            path: path.into(),
            source,
        }
    }
}

/// Read `path` and parse it as a JSON object.
///
/// The error is a user-facing message naming the file.
pub fn read_config_object(path: &Path) -> Result<Map<String, Value>, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|err| format!("Unable to read {}: {err}", path.display()))?;

    match serde_json::from_str::<Value>(&content) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(format!(
            "Unable to parse {}: JSON not correctly formatted",
            path.display()
        )),
        Err(err) => Err(format!("Unable to parse {}: {err}", path.display())),
    }
}

/// Read `path` as a JSON object, treating a missing file as empty.
pub fn read_config_object_or_empty(path: &Path) -> Result<Map<String, Value>, String> {
    if path.exists() {
        read_config_object(path)
    } else {
        Ok(Map::new())
    }
}

/// Write `data` to `path` as indented JSON, creating parent directories.
pub fn write_config_file(path: &Path, data: &Map<String, Value>) -> Result<(), ConfigError> {
    let write_err = |source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(write_err)?;
    }

    let mut content = serde_json::to_string_pretty(data)
        .map_err(|err| write_err(std::io::Error::other(err)))?;
    content.push('\n');
    std::fs::write(path, content).map_err(write_err)?;

    debug!(path = %path.display(), "Wrote configuration file");
    Ok(())
}
