//! Config subcommand for latz CLI
//!
//! `config show` prints the composed configuration; `config set` applies
//! `path=value` edits and persists them to one configuration file.

use crate::app::App;
use crate::config::{ConfigPaths, read_config_object_or_empty, write_config_file};
use crate::error::{ConfigError, LatzError, Result};
use anyhow::anyhow;
use clap::{Args, Subcommand};
use std::path::PathBuf;
use tracing::info;

/// Arguments for the config subcommand
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the composed configuration as JSON
    Show,

    /// Set one or more values, e.g. `search_backends=placeholder`
    Set(SetArgs),
}

/// Arguments for `config set`
#[derive(Args, Debug)]
pub struct SetArgs {
    /// Write to the home configuration file instead of the working directory's
    #[arg(long)]
    pub home: bool,

    /// Values to set, as dotted `path=value` pairs
    #[arg(required = true, value_name = "PATH=VALUE")]
    pub values: Vec<String>,
}

impl SetArgs {
    /// The file edits are written to: `--home`, else `--config`, else the working directory.
    pub fn target(&self, paths: &ConfigPaths) -> Result<PathBuf> {
        if self.home {
            return paths
                .home_file()
                .ok_or_else(|| LatzError::Other(anyhow!("Unable to determine home directory")));
        }
        Ok(paths.explicit.clone().unwrap_or_else(|| paths.cwd_file()))
    }
}

pub fn run(app: &App, paths: &ConfigPaths, args: &ConfigArgs) -> Result<String> {
    match &args.command {
        ConfigCommand::Show => show(app, paths),
        ConfigCommand::Set(set_args) => set(app, paths, set_args).map(|_| String::new()),
    }
}

/// The composed configuration as sorted, indented JSON.
pub fn show(app: &App, paths: &ConfigPaths) -> Result<String> {
    let config = app.loader().load_from(paths)?;
    Ok(config.to_pretty_json())
}

/// Apply `args.values` and write them to the target file.
///
/// The edit must produce a valid composed configuration and a valid file
/// layer; otherwise nothing is written. Returns the path written.
pub fn set(app: &App, paths: &ConfigPaths, args: &SetArgs) -> Result<PathBuf> {
    let current = app.loader().load_from(paths)?;
    let editor = app.editor();
    let patch = editor.build_patch(args.values.as_slice())?;
    editor.apply_patch(&current, &patch)?;

    let target = args.target(paths)?;
    let raw = read_config_object_or_empty(&target)
        .map_err(|msg| ConfigError::Invalid(vec![msg]))?;
    let layer = app
        .schema()
        .validate(&patch.apply_to(&raw), app.registry())
        .map_err(|err| ConfigError::Invalid(vec![err.render(&target.display().to_string())]))?;

    write_config_file(&target, layer.explicit())?;
    info!(path = %target.display(), "Configuration updated");
    Ok(target)
}
