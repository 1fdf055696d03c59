//! Configuration loader with layered merging and aggregated errors.
//!
//! Candidate files are read in order (home, then working directory, then an
//! explicit `--config` file), followed by `LATZ_*` environment overrides.
//! Every layer is parsed and validated before any merge happens; if any layer
//! is broken the whole load fails with one error block per offending layer.

use super::env::{ENV_SOURCE, env_patch, env_vars};
use super::files::{CONFIG_FILE_NAME, ConfigFile, FileSource, read_config_object};
use super::merge::deep_merge_all;
use super::schema::CompositeSchema;
use super::types::Configuration;
use crate::error::{CONFIG_ERROR_PREFIX, ConfigError};
use crate::plugins::PluginRegistry;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable overriding the home directory used for `~/.latz.json`.
pub const HOME_DIR_ENV: &str = "LATZ_HOME";

/// Locations of the configuration layers, plus the environment overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    /// Home directory (`LATZ_HOME` or the user's home)
    pub home_dir: Option<PathBuf>,
    /// Working directory
    pub cwd: PathBuf,
    /// File passed with `--config`, the last file layer
    pub explicit: Option<PathBuf>,
    /// `LATZ_*` variables, applied after every file
    pub env: Vec<(String, String)>,
}

impl Default for ConfigPaths {
    fn default() -> Self {
        Self::discover()
    }
}

impl ConfigPaths {
    /// Discover configuration paths from environment and defaults.
    pub fn discover() -> Self {
        let home_dir = std::env::var_os(HOME_DIR_ENV)
            .map(PathBuf::from)
            .or_else(dirs::home_dir);

        let cwd = std::env::current_dir().unwrap_or_else(|err| {
            warn!(error = %err, "Cannot determine working directory, using '.'");
            PathBuf::from(".")
        });

        Self {
            home_dir,
            cwd,
            explicit: None,
            env: env_vars(),
        }
    }

    /// Create paths with explicit directories and no environment overrides.
    pub fn with_dirs(home_dir: Option<PathBuf>, cwd: PathBuf) -> Self {
        Self {
            home_dir,
            cwd,
            explicit: None,
            env: Vec::new(),
        }
    }

    /// Replace the environment overrides.
    pub fn with_env<K: Into<String>, V: Into<String>>(
        mut self,
        vars: impl IntoIterator<Item = (K, V)>,
    ) -> Self {
        self.env = vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        self
    }

    /// Add an explicit configuration file as the highest-priority layer.
    pub fn with_explicit(mut self, path: Option<PathBuf>) -> Self {
        self.explicit = path;
        self
    }

    pub fn home_file(&self) -> Option<PathBuf> {
        self.home_dir.as_ref().map(|dir| dir.join(CONFIG_FILE_NAME))
    }

    pub fn cwd_file(&self) -> PathBuf {
        self.cwd.join(CONFIG_FILE_NAME)
    }

    /// Candidate files in load order (lowest priority first).
    ///
    /// When the working directory is the home directory the file is listed once.
    pub fn candidates(&self) -> Vec<ConfigFile> {
        let mut files: Vec<ConfigFile> = Vec::new();
        let mut push = |path: PathBuf, source: FileSource| {
            if !files.iter().any(|f| f.path == path) {
                files.push(ConfigFile::new(path, source));
            }
        };

        if let Some(home) = self.home_file() {
            push(home, FileSource::Home);
        }
        push(self.cwd_file(), FileSource::Cwd);
        if let Some(ref explicit) = self.explicit {
            push(explicit.clone(), FileSource::Explicit);
        }
        files
    }

    pub fn candidate_paths(&self) -> Vec<PathBuf> {
        self.candidates().into_iter().map(|f| f.path).collect()
    }
}

/// Outcome of reading and validating one candidate file.
#[derive(Debug, Clone)]
pub struct ParsedConfigFile {
    pub path: PathBuf,
    pub raw_data: Option<Map<String, Value>>,
    pub parse_error: Option<String>,
    pub validated_model: Option<Configuration>,
    pub validation_error: Option<String>,
}

impl ParsedConfigFile {
    /// Read and parse `path`. Validation is a separate step.
    pub fn parse(path: &Path) -> Self {
        let (raw_data, parse_error) = match read_config_object(path) {
            Ok(map) => (Some(map), None),
            Err(err) => (None, Some(err)),
        };
        Self {
            path: path.to_path_buf(),
            raw_data,
            parse_error,
            validated_model: None,
            validation_error: None,
        }
    }

    /// Validate the parsed data. Does nothing if parsing failed.
    pub fn validate(&mut self, schema: &CompositeSchema, registry: &PluginRegistry) {
        let Some(ref data) = self.raw_data else {
            return;
        };
        match schema.validate(&Value::Object(data.clone()), registry) {
            Ok(config) => self.validated_model = Some(config),
            Err(err) => {
                self.validation_error = Some(err.render(&self.path.display().to_string()));
            }
        }
    }

    /// The error block for this file, if any.
    pub fn error(&self) -> Option<&str> {
        self.parse_error
            .as_deref()
            .or(self.validation_error.as_deref())
    }
}

/// Loads the composed configuration from a list of candidate files.
#[derive(Debug, Clone, Copy)]
pub struct ConfigLoader<'a> {
    schema: &'a CompositeSchema,
    registry: &'a PluginRegistry,
}

impl<'a> ConfigLoader<'a> {
    pub fn new(schema: &'a CompositeSchema, registry: &'a PluginRegistry) -> Self {
        Self { schema, registry }
    }

    /// Read, parse and validate every existing candidate, in order.
    pub fn parse_files<P: AsRef<Path>>(&self, paths: &[P]) -> Vec<ParsedConfigFile> {
        paths
            .iter()
            .map(|path| <P as AsRef<Path>>::as_ref(path))
            .filter(|path| path.is_file())
            .map(|path| {
                debug!(path = %path.display(), "Reading configuration file");
                let mut parsed = ParsedConfigFile::parse(path);
                parsed.validate(self.schema, self.registry);
                parsed
            })
            .collect()
    }

    /// Load and merge the configuration from `paths`.
    ///
    /// Missing files are skipped; no files at all yields the defaults. Any
    /// malformed or invalid file fails the whole load.
    pub fn load<P: AsRef<Path>>(&self, paths: &[P]) -> Result<Configuration, ConfigError> {
        self.load_with_env::<P, &str, &str>(paths, &[])
    }

    /// Like [`load`](Self::load), with `env` applied as the final layer.
    pub fn load_with_env<P, K, V>(
        &self,
        paths: &[P],
        env: &[(K, V)],
    ) -> Result<Configuration, ConfigError>
    where
        P: AsRef<Path>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let parsed = self.parse_files(paths);

        let mut errors: Vec<String> = parsed
            .iter()
            .filter_map(|file| file.error().map(str::to_string))
            .collect();
        let env_layer = match self.env_layer(env) {
            Ok(layer) => layer,
            Err(block) => {
                errors.push(block);
                None
            }
        };
        if !errors.is_empty() {
            return Err(ConfigError::Invalid(errors));
        }

        let mut layers: Vec<Value> = parsed
            .into_iter()
            .filter_map(|file| file.validated_model)
            .map(|config| Value::Object(config.explicit().clone()))
            .collect();
        layers.extend(env_layer.map(Value::Object));
        debug!(layers = layers.len(), "Merging configuration layers");

        let merged = match deep_merge_all(layers) {
            Value::Null => Value::Object(Map::new()),
            merged => merged,
        };

        self.schema
            .validate(&merged, self.registry)
            .map_err(|err| {
                ConfigError::Invalid(vec![err.render("merged configuration")])
            })
    }

    /// Load from the standard candidate locations and the environment.
    pub fn load_from(&self, paths: &ConfigPaths) -> Result<Configuration, ConfigError> {
        self.load_with_env(paths.candidate_paths().as_slice(), &paths.env)
    }

    /// Validate the environment overrides on their own.
    ///
    /// `Ok(None)` when no variable names a field; the error is a rendered block.
    fn env_layer<K, V>(&self, env: &[(K, V)]) -> Result<Option<Map<String, Value>>, String>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let patch = env_patch(self.schema, env);
        if patch.is_empty() {
            return Ok(None);
        }
        self.schema
            .normalize(patch.as_value(), self.registry)
            .map(Some)
            .map_err(|err| err.render(ENV_SOURCE))
    }

    /// The all-defaults configuration.
    pub fn defaults(&self) -> Result<Configuration, ConfigError> {
        self.schema
            .validate(&self.schema.defaults(), self.registry)
            .map_err(|err| ConfigError::Invalid(vec![err.render("defaults")]))
    }
}

/// Whether an error block came from a validation failure rather than a parse failure.
pub fn is_validation_block(block: &str) -> bool {
    block.starts_with(CONFIG_ERROR_PREFIX)
}
