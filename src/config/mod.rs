//! Layered, plugin-extensible configuration.
//!
//! The schema is composed at startup from base fields plus one settings
//! fragment per registered backend:
//! 1. **Defaults** - from the composed schema
//! 2. **Home** - `~/.latz.json` (`LATZ_HOME` overrides the directory)
//! 3. **Working directory** - `$CWD/.latz.json`
//! 4. **Explicit** - the file passed with `--config`
//! 5. **Environment** - `LATZ_*` variables, `__` separating nested keys
//!
//! ## Merge Strategy
//! Each file is parsed and validated on its own. Only the fields a file sets
//! take part in the merge; defaults are applied once, after merging.
//!
//! ## Editing
//! [`DottedPathEditor`] turns `path=value` tokens into a nested patch that is
//! validated as a whole before it can be persisted.

mod editor;
mod env;
mod files;
mod loader;
mod merge;
mod schema;
mod types;
mod validate;

pub use editor::{
    ConfigEdit, DottedPathEditor, EditError, LIST_SEPARATOR, NestedPatch, split_list,
};
pub use env::{ENV_NESTED_DELIMITER, ENV_PREFIX, ENV_SOURCE, env_patch, env_var_path, env_vars};
pub use files::{
    CONFIG_FILE_NAME, ConfigFile, FileSource, read_config_object, read_config_object_or_empty,
    write_config_file,
};
pub use loader::{ConfigLoader, ConfigPaths, HOME_DIR_ENV, ParsedConfigFile, is_validation_block};
pub use merge::{deep_merge, deep_merge_all};
pub use schema::{
    CompositeSchema, DEFAULT_RESULTS_PER_PAGE, FieldNotFound, FieldSpec, FieldType,
    RESULTS_PER_PAGE_KEY, SEARCH_BACKEND_SETTINGS_KEY, SEARCH_BACKENDS_KEY, SchemaFragment,
    base_fields,
};
pub use types::Configuration;
