//! Search subcommand for latz CLI
//!
//! Sends the query to every configured backend at once and renders whatever
//! came back, even when some backends failed.

use crate::app::App;
use crate::config::ConfigPaths;
use crate::error::{BackendCallError, LatzError, Result};
use crate::fetch::{DEFAULT_TIMEOUT, build_client};
use crate::format::{OutputFormat, format_results};
use crate::image::SearchResultSet;
use clap::Args;
use tracing::{info, warn};

/// Arguments for the search subcommand
#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Search query
    pub query: String,

    /// Output format: table (default) or json
    #[arg(short, long, default_value = "table", value_parser = parse_format)]
    pub format: OutputFormat,
}

fn parse_format(value: &str) -> std::result::Result<OutputFormat, String> {
    OutputFormat::from_str(value).ok_or_else(|| format!("unknown format '{value}'"))
}

/// Rendered results plus the backends that failed.
#[derive(Debug)]
pub struct SearchOutput {
    pub sets: Vec<SearchResultSet>,
    pub errors: Vec<BackendCallError>,
    pub rendered: String,
}

impl SearchOutput {
    /// `Err` when at least one backend failed.
    pub fn into_result(self) -> Result<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(LatzError::Search(self.errors))
        }
    }
}

/// Load the configuration from `paths` and run the search.
pub async fn run(app: &App, paths: &ConfigPaths, args: &SearchArgs) -> Result<SearchOutput> {
    let config = app.loader().load_from(paths)?;
    let client = build_client(DEFAULT_TIMEOUT)?;

    if config.search_backends().is_empty() {
        warn!("No search backends configured; set search_backends to select one");
    }
    info!(query = %args.query, backends = ?config.search_backends(), "Searching");
    let report = app
        .orchestrator()
        .dispatch(&client, &config, &args.query)
        .await;
    let (sets, errors) = report.into_parts();

    let rendered = if sets.is_empty() && !errors.is_empty() {
        String::new()
    } else {
        format_results(&sets, args.format)
    };

    Ok(SearchOutput {
        sets,
        errors,
        rendered,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins;
    use tempfile::TempDir;

    #[tokio::test]
    async fn placeholder_search_from_cwd_config() {
        let home = TempDir::new().unwrap();
        let cwd = TempDir::new().unwrap();
        std::fs::write(
            cwd.path().join(".latz.json"),
            r#"{"search_backends": ["placeholder"]}"#,
        )
        .unwrap();

        let app = App::bootstrap(plugins::builtin()).unwrap();
        let paths = ConfigPaths::with_dirs(Some(home.path().into()), cwd.path().into());
        let args = SearchArgs {
            query: "cats".into(),
            format: OutputFormat::Markdown,
        };

        let output = run(&app, &paths, &args).await.unwrap();
        assert!(output.errors.is_empty());
        assert_eq!(output.sets.len(), 1);
        assert!(output.rendered.contains("| 1 | https://placekitten.com/200/300 | placeholder |"));
        assert!(output.into_result().is_ok());
    }

    #[tokio::test]
    async fn missing_unsplash_key_is_a_backend_failure() {
        let home = TempDir::new().unwrap();
        let cwd = TempDir::new().unwrap();
        std::fs::write(
            cwd.path().join(".latz.json"),
            r#"{"search_backends": ["unsplash", "placeholder"]}"#,
        )
        .unwrap();

        let app = App::bootstrap(plugins::builtin()).unwrap();
        let paths = ConfigPaths::with_dirs(Some(home.path().into()), cwd.path().into());
        let args = SearchArgs {
            query: "cats".into(),
            format: OutputFormat::Markdown,
        };

        let output = run(&app, &paths, &args).await.unwrap();
        assert_eq!(output.sets.len(), 1);
        assert_eq!(output.errors.len(), 1);
        assert_eq!(output.errors[0].backend(), "unsplash");

        let err = output.into_result().unwrap_err();
        assert_eq!(err.exit_code(), 1);
    }
}
