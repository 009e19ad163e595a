//! Publisher configuration.
//!
//! Every setting has a stock default, so a run with no config file behaves
//! exactly like the conventional `avatar/ → gravatar/` layout. A
//! `gravatar.toml` file (or one named with `--config`) overrides any subset of
//! keys; it is merged key-by-key over the stock defaults before being
//! deserialized. Unknown keys are rejected to catch typos early.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! source_dir = "avatar"         # Input avatars, one file per user
//! output_dir = "gravatar"       # Published files (created if absent)
//! suffixes = ["@circlecat.org", "@u.circlecat.org"]
//! schemes = ["sha256", "md5"]   # Also available: "md5-jpg"
//! canonical_name = true         # Also write <user>.png
//!
//! [avatar]
//! size = 256                    # Output edge length in pixels
//! crop = "square"               # "square" or "thumbnail"
//!
//! [processing]
//! max_processes = 4             # Max parallel workers (omit for auto = CPU cores)
//! ```

use crate::identity::HashScheme;
use crate::imaging::{CropPolicy, NormalizeConfig};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File picked up from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "gravatar.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Settings for one publishing run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PublishConfig {
    /// Directory of source avatars, one file per user name.
    pub source_dir: PathBuf,
    /// Directory the hashed files are written to.
    pub output_dir: PathBuf,
    /// Appended to each user name to form the email that gets hashed.
    pub suffixes: Vec<String>,
    /// Active hash schemes, applied to every suffix in order.
    pub schemes: Vec<HashScheme>,
    /// Also write each avatar as `<user>.png`.
    pub canonical_name: bool,
    /// Output geometry.
    pub avatar: AvatarConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("avatar"),
            output_dir: PathBuf::from("gravatar"),
            suffixes: vec!["@circlecat.org".to_string(), "@u.circlecat.org".to_string()],
            schemes: vec![HashScheme::Sha256, HashScheme::Md5],
            canonical_name: true,
            avatar: AvatarConfig::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl PublishConfig {
    /// Validate values and reject configurations whose target sets would
    /// collide with themselves.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.avatar.size == 0 {
            return Err(ConfigError::Validation(
                "avatar.size must be non-zero".into(),
            ));
        }
        if self.suffixes.is_empty() {
            return Err(ConfigError::Validation("suffixes must not be empty".into()));
        }
        if self.schemes.is_empty() {
            return Err(ConfigError::Validation("schemes must not be empty".into()));
        }
        if let Some(dup) = first_duplicate(&self.suffixes) {
            return Err(ConfigError::Validation(format!(
                "duplicate suffix {dup:?}"
            )));
        }
        if let Some(dup) = first_duplicate(&self.schemes) {
            return Err(ConfigError::Validation(format!(
                "duplicate scheme {dup}"
            )));
        }
        if self.source_dir == self.output_dir {
            return Err(ConfigError::Validation(
                "output_dir must differ from source_dir".into(),
            ));
        }
        Ok(())
    }

    pub fn normalize_config(&self) -> NormalizeConfig {
        NormalizeConfig {
            size: self.avatar.size,
            policy: self.avatar.crop,
        }
    }
}

fn first_duplicate<T: Eq + std::hash::Hash>(items: &[T]) -> Option<&T> {
    let mut seen = HashSet::new();
    items.iter().find(|item| !seen.insert(*item))
}

/// Output geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AvatarConfig {
    /// Edge length of the output square in pixels.
    pub size: u32,
    /// How non-square sources are fitted.
    pub crop: CropPolicy,
}

impl Default for AvatarConfig {
    fn default() -> Self {
        Self {
            size: 256,
            crop: CropPolicy::Square,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up), at least 1
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(PublishConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Merge an optional overlay onto the stock defaults, then deserialize and validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<PublishConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: PublishConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the configuration.
///
/// - `Some(path)`: the file must exist.
/// - `None`: [`DEFAULT_CONFIG_FILE`] in the working directory is used if
///   present, otherwise the stock defaults.
pub fn load_config(path: Option<&Path>) -> Result<PublishConfig, ConfigError> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            if !default.exists() {
                return resolve_config(None);
            }
            default
        }
    };
    let content = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    let value: toml::Value = toml::from_str(&content)?;
    resolve_config(Some(value))
}

/// Returns a fully-commented stock `gravatar.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# gravatar-gen configuration
# ==========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# Directory of source avatars. Each file is named after its user
# (carol.jpg -> user "carol"). Subdirectories are skipped. A file named
# 404.html is copied to the output unchanged.
source_dir = "avatar"

# Directory the published files are written to. Created if absent;
# existing files with the same name are overwritten.
output_dir = "gravatar"

# Each suffix is appended to the user name to form an email address
# (carol + @circlecat.org), which is then hashed.
suffixes = ["@circlecat.org", "@u.circlecat.org"]

# Hash schemes applied to every email address:
#   "sha256"  - lowercase hex SHA-256 (current Gravatar API)
#   "md5"     - lowercase hex MD5 (legacy Gravatar API)
#   "md5-jpg" - MD5 with ".jpg" appended (Gerrit avatars-gravatar plugin)
schemes = ["sha256", "md5"]

# Also write each avatar as <user>.png.
canonical_name = true

# ---------------------------------------------------------------------------
# Output geometry
# ---------------------------------------------------------------------------
[avatar]
# Edge length of the output square in pixels.
size = 256

# "square":    centered square crop on the shorter edge, scaled to size x size.
# "thumbnail": scale down (never up) to fit inside size x size; may be non-square.
crop = "square"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
