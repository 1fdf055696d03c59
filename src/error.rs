//! Error taxonomy for the application.
//!
//! Every failure a user can see is one of these types. The CLI renders them as
//! a single line (usage problems) or as multi-block text (configuration
//! problems) and maps them to exit codes via [`LatzError::exit_code`].

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::plugins::BackendError;

/// Prefix of every per-file configuration error block.
pub const CONFIG_ERROR_PREFIX: &str = "Unable to parse configuration file";

/// Exit code for recoverable application errors.
pub const EXIT_APP_ERROR: u8 = 1;

/// Exit code for command line usage errors.
pub const EXIT_USAGE_ERROR: u8 = 2;

/// Fatal errors raised while assembling the plugin registry.
///
/// These indicate a packaging defect rather than bad user input, so the
/// process stops before any command runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StartupError {
    #[error(
        "Duplicate values for the hook 'search_backend' found: {}. \
         Please make sure to define a unique 'name' field",
        .0.join(", ")
    )]
    DuplicateBackends(Vec<String>),

    #[error("A search backend was registered with an empty name")]
    EmptyBackendName,
}

/// A selected backend name that is not registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendSelectionError {
    /// Every candidate that is not a registered name, in input order.
    pub invalid: Vec<String>,
    /// All registered names, in registration order.
    pub permitted: Vec<String>,
}

impl fmt::Display for BackendSelectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let quoted: Vec<String> = self.invalid.iter().map(|v| format!("'{v}'")).collect();
        let noun = if self.invalid.len() == 1 {
            "is not a valid choice"
        } else {
            "are not valid choices"
        };
        write!(
            f,
            "{} {} for a search backend. Available choices: {}",
            quoted.join(", "),
            noun,
            self.permitted.join(", ")
        )
    }
}

impl std::error::Error for BackendSelectionError {}

/// A single schema violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Dotted path of the offending field (empty for the document root).
    pub path: String,
    pub message: String,
    /// The offending value as provided, when it can be shown.
    pub given: Option<String>,
    /// The permitted values, when the field has a closed set of choices.
    pub permitted: Option<Vec<String>>,
}

impl FieldError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            given: None,
            permitted: None,
        }
    }

    pub fn with_given(mut self, given: impl Into<String>) -> Self {
        self.given = Some(given.into());
        self
    }

    pub fn with_permitted(mut self, permitted: Vec<String>) -> Self {
        self.permitted = Some(permitted);
        self
    }
}

/// All schema violations found in one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    pub fn new(errors: Vec<FieldError>) -> Self {
        Self { errors }
    }

    /// Field paths of every violation, in discovery order.
    pub fn paths(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.path.as_str()).collect()
    }

    /// Render one error block attributed to `source`.
    pub fn render(&self, source: &str) -> String {
        let mut out = format!("{CONFIG_ERROR_PREFIX}: {source}\n");
        out.push_str(&self.render_fields());
        out
    }

    fn render_fields(&self) -> String {
        let mut out = String::new();
        for err in &self.errors {
            let loc = if err.path.is_empty() { "__root__" } else { err.path.as_str() };
            out.push_str(&format!("\n  {loc}:\n"));
            out.push_str(&format!("    {}\n", err.message));
            if let (Some(given), Some(_)) = (&err.given, &err.permitted) {
                out.push_str(&format!("    provided_value: '{given}'\n"));
            }
        }
        out
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid configuration\n{}", self.render_fields())
    }
}

impl std::error::Error for ValidationError {}

/// Errors from loading, validating or persisting configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// One or more candidate files failed to parse or validate.
    /// Each entry is a fully rendered block for one file.
    #[error("{}", .0.join("\n\n"))]
    Invalid(Vec<String>),

    /// A configuration value (merged, or produced by an edit) failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Unable to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Malformed or unresolvable `config set` input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BadInputError {
    #[error("'{0}' does not conform to the correct format. Please use the 'param=value' format.")]
    MalformedToken(String),

    #[error("'{0}' is not a valid configuration parameter")]
    UnknownParameter(String),

    #[error("No configuration values given. Please provide at least one 'param=value' pair.")]
    NoValues,
}

/// An individual backend's search failed.
#[derive(Debug, Error)]
pub enum BackendCallError {
    #[error("backend '{backend}' failed: {source}")]
    Failed {
        backend: String,
        #[source]
        source: BackendError,
    },

    #[error("backend '{0}' panicked during search")]
    Panicked(String),

    #[error("backend '{0}' did not complete")]
    Aborted(String),

    #[error("backend '{0}' is not registered")]
    NotRegistered(String),
}

impl BackendCallError {
    /// Name of the backend this error belongs to.
    pub fn backend(&self) -> &str {
        match self {
            BackendCallError::Failed { backend, .. } => backend,
            BackendCallError::Panicked(name)
            | BackendCallError::Aborted(name)
            | BackendCallError::NotRegistered(name) => name,
        }
    }
}

/// Top-level application error.
#[derive(Debug, Error)]
pub enum LatzError {
    #[error(transparent)]
    Startup(#[from] StartupError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    BadInput(#[from] BadInputError),

    #[error("{} search backend(s) failed", .0.len())]
    Search(Vec<BackendCallError>),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<ValidationError> for LatzError {
    fn from(err: ValidationError) -> Self {
        LatzError::Config(ConfigError::Validation(err))
    }
}

impl LatzError {
    pub fn exit_code(&self) -> u8 {
        match self {
            LatzError::BadInput(_) => EXIT_USAGE_ERROR,
            _ => EXIT_APP_ERROR,
        }
    }
}

/// Result type for application operations.
pub type Result<T> = std::result::Result<T, LatzError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_error_names_candidates_and_choices() {
        let err = BackendSelectionError {
            invalid: vec!["does_not_exist".into()],
            permitted: vec!["unsplash".into(), "placeholder".into()],
        };
        assert_eq!(
            err.to_string(),
            "'does_not_exist' is not a valid choice for a search backend. \
             Available choices: unsplash, placeholder"
        );
    }

    #[test]
    fn validation_block_includes_provided_value_for_choices() {
        let err = ValidationError::new(vec![
            FieldError::new(
                "search_backend_settings.placeholder.type",
                "unexpected value; permitted: 'bear', 'kitten'",
            )
            .with_given("cat")
            .with_permitted(vec!["bear".into(), "kitten".into()]),
            FieldError::new("does_not_exist", "extra fields not permitted"),
        ]);
        let block = err.render("/tmp/.latz.json");

        assert!(block.starts_with("Unable to parse configuration file: /tmp/.latz.json\n"));
        assert!(block.contains("\n  search_backend_settings.placeholder.type:\n"));
        assert!(block.contains("    provided_value: 'cat'\n"));
        assert!(block.contains("\n  does_not_exist:\n    extra fields not permitted\n"));
    }

    #[test]
    fn duplicate_backends_lists_every_name() {
        let err = StartupError::DuplicateBackends(vec!["a".into(), "b".into()]);
        assert!(err.to_string().contains("found: a, b."));
    }

    #[test]
    fn exit_codes() {
        assert_eq!(LatzError::from(BadInputError::NoValues).exit_code(), 2);
        assert_eq!(
            LatzError::from(ConfigError::Invalid(vec!["x".into()])).exit_code(),
            1
        );
        assert_eq!(LatzError::Search(Vec::new()).exit_code(), 1);
    }
}
