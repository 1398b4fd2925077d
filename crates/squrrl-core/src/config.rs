//! Configuration loader and path helpers.
//!
//! Uses Figment to merge the TOML file given on the command line with
//! `SQURRL_*` environment variables (`SQURRL_BASE__CHUNK_SIZE=500` overrides
//! `base.chunk_size`). Provides helpers to expand `~` and `${VAR}` and to
//! resolve relative paths against a known base directory.

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

pub const DEFAULT_MODEL: &str = "paraphrase-multilingual-MiniLM-L12-v2";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub base: BaseConfig,
    #[serde(default)]
    pub vector: VectorConfig,
    #[serde(default)]
    pub index: IndexConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseConfig {
    /// Directory holding both source files.
    pub directory: String,
    #[serde(default = "default_author_file")]
    pub author_file: String,
    #[serde(default = "default_works_file")]
    pub works_file: String,
    #[serde(default = "default_model")]
    pub transformer_model: String,
    /// Local directory with the model files; see `squrrl-embed` for the fallbacks.
    #[serde(default)]
    pub model_dir: Option<String>,
    /// Books per embed + insert batch.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Offset into the book list to resume an interrupted insert.
    #[serde(default)]
    pub insert_startpoint: usize,
}

fn default_author_file() -> String { "author_key.txt".to_string() }
fn default_works_file() -> String { "works_with_desc.txt".to_string() }
fn default_model() -> String { DEFAULT_MODEL.to_string() }
fn default_chunk_size() -> usize { 10_000 }

impl BaseConfig {
    pub fn new(directory: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            author_file: default_author_file(),
            works_file: default_works_file(),
            transformer_model: default_model(),
            model_dir: None,
            chunk_size: default_chunk_size(),
            insert_startpoint: 0,
        }
    }

    pub fn directory(&self) -> PathBuf { expand_path(&self.directory) }

    pub fn author_path(&self) -> PathBuf { resolve_with_base(&self.directory(), &self.author_file) }

    pub fn works_path(&self) -> PathBuf { resolve_with_base(&self.directory(), &self.works_file) }

    pub fn model_dir(&self) -> Option<PathBuf> { self.model_dir.as_deref().map(expand_path) }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorConfig {
    /// LanceDB database location.
    pub uri: String,
    pub collection: String,
}

impl Default for VectorConfig {
    fn default() -> Self {
        Self { uri: "data/lancedb".to_string(), collection: "open_library".to_string() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexKind {
    IvfFlat,
    IvfPq,
    /// Leave the collection unindexed (brute-force search).
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Cosine,
    L2,
    Dot,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    pub kind: IndexKind,
    pub metric: Metric,
    /// IVF partitions; derived from the row count when unset.
    pub num_partitions: Option<u32>,
    /// PQ sub-vectors for `ivf_pq`; derived from the dimension when unset.
    pub num_sub_vectors: Option<u32>,
    /// Collections smaller than this are left unindexed.
    pub min_rows: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self { kind: IndexKind::IvfFlat, metric: Metric::Cosine, num_partitions: None, num_sub_vectors: None, min_rows: 256 }
    }
}

impl Settings {
    /// Load `path`, apply `SQURRL_*` overrides, and validate.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::InvalidConfig(format!("config file {} does not exist", path.display())));
        }
        let figment = Figment::new().merge(Toml::file(path)).merge(Env::prefixed("SQURRL_").split("__"));
        Self::from_figment(&figment)
    }

    pub fn from_figment(figment: &Figment) -> Result<Self> {
        let settings: Self = figment.extract().map_err(|e| Error::InvalidConfig(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.base.directory.trim().is_empty() {
            return Err(Error::InvalidConfig("base.directory must not be empty".to_string()));
        }
        if self.base.chunk_size == 0 {
            return Err(Error::InvalidConfig("base.chunk_size must be greater than zero".to_string()));
        }
        if self.base.transformer_model.trim().is_empty() {
            return Err(Error::InvalidConfig("base.transformer_model must not be empty".to_string()));
        }
        if self.vector.collection.trim().is_empty() {
            return Err(Error::InvalidConfig("vector.collection must not be empty".to_string()));
        }
        if self.index.num_partitions == Some(0) {
            return Err(Error::InvalidConfig("index.num_partitions must be greater than zero".to_string()));
        }
        Ok(())
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
