//! Layered configuration for exifsift.
//!
//! Sources, lowest to highest priority:
//! 1. compiled defaults ([`Config::default`]);
//! 2. a configuration file: the one given explicitly, otherwise
//!    `config.toml` in the user's config directory if it exists;
//! 3. `EXIFSIFT_*` environment variables;
//! 4. command-line [`Overrides`].
//!
//! The merged [`Config`] is loose (everything optional). [`Config::validate`]
//! checks it once and produces the [`Settings`] a run actually uses.

pub mod error;
mod list;
mod settings;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exifsift_pipeline::MatchPolicy;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use crate::list::split;
pub use crate::settings::Settings;

/// Prefix for environment variables, e.g. `EXIFSIFT_SOURCE`.
pub const ENV_PREFIX: &str = "EXIFSIFT_";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration as merged from every source, before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory to scan.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
    /// Directory to receive matching files.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<PathBuf>,
    /// Metadata key to look up, e.g. `Keywords`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Values to match against.
    #[serde(deserialize_with = "list::deserialize")]
    pub targets: Vec<String>,
    #[serde(deserialize_with = "list::deserialize")]
    pub extensions: Vec<String>,
    pub policy: MatchPolicy,
    /// Maximum candidates in flight.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<usize>,
    /// Explicit exiftool executable; otherwise looked up in `PATH`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exiftool: Option<PathBuf>,
    /// Seconds allowed for a single metadata lookup.
    pub timeout: u64,
    /// Log and skip unreadable directories instead of aborting.
    pub skip_unreadable: bool,
    pub dry_run: bool,
}
impl Default for Config {
    fn default() -> Self {
        Self {
            source: None,
            destination: None,
            key: None,
            targets: Vec::new(),
            extensions: vec![".jpg".to_string(), ".jpeg".to_string()],
            policy: MatchPolicy::default(),
            concurrency: None,
            exiftool: None,
            timeout: DEFAULT_TIMEOUT_SECS,
            skip_unreadable: false,
            dry_run: false,
        }
    }
}

/// Values given on the command line. Unset fields leave lower layers alone.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Overrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub targets: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy: Option<MatchPolicy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exiftool: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_unreadable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dry_run: Option<bool>,
}

impl Config {
    /// Defaults, configuration file and environment, in that order.
    ///
    /// # Errors
    /// [`NotFound`](ErrorKind::NotFound) if an explicit `file` doesn't exist,
    /// or [`UnknownFormat`](ErrorKind::UnknownFormat) if its extension isn't
    /// recognised. Parse errors only surface on extraction.
    pub fn figment(file: Option<&Path>) -> Result<Figment> {
        let figment = Figment::from(Serialized::defaults(Config::default()));
        let figment = match file {
            Some(path) => merge_file(figment, path)?,
            None => match default_file() {
                Some(path) if path.is_file() => {
                    tracing::debug!(path = %path.display(), "Using user configuration file");
                    figment.merge(Toml::file(path))
                },
                _ => figment,
            },
        };
        Ok(figment.merge(Env::prefixed(ENV_PREFIX)))
    }

    /// Load every layer, with `overrides` on top.
    pub fn load(file: Option<&Path>, overrides: &Overrides) -> Result<Self> {
        let figment = Self::figment(file)?.merge(Serialized::defaults(overrides));
        Self::extract(&figment)
    }

    pub fn extract(figment: &Figment) -> Result<Self> {
        figment.extract().or_raise(|| ErrorKind::Load)
    }
}

/// `config.toml` in the platform's per-user configuration directory.
pub fn default_file() -> Option<PathBuf> {
    ProjectDirs::from("", "", "exifsift").map(|dirs| dirs.config_dir().join("config.toml"))
}

fn merge_file(figment: Figment, path: &Path) -> Result<Figment> {
    if !path.is_file() {
        exn::bail!(ErrorKind::NotFound(path.to_path_buf()));
    }
    let extension = path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase);
    let figment = match extension.as_deref() {
        Some("toml") => figment.merge(Toml::file(path)),
        Some("yaml" | "yml") => figment.merge(Yaml::file(path)),
        Some("json") => figment.merge(Json::file(path)),
        _ => exn::bail!(ErrorKind::UnknownFormat(path.to_path_buf())),
    };
    tracing::debug!(path = %path.display(), "Using configuration file");
    Ok(figment)
}
