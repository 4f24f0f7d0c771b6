use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name looked up in the working directory when no `--config` is given.
pub const CONFIG_FILE_NAME: &str = "sociogram.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub ingest: IngestConfig,
    #[serde(default)]
    pub influence: InfluenceConfig,
    #[serde(default)]
    pub community: CommunityConfig,
    #[serde(default)]
    pub fragmentation: FragmentationConfig,
    #[serde(default)]
    pub proximity: ProximityConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestConfig {
    #[serde(default = "default_unknown_identity")]
    pub unknown_identity: String,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            unknown_identity: default_unknown_identity(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfluenceConfig {
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl Default for InfluenceConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunityConfig {
    #[serde(default = "default_max_passes")]
    pub max_passes: usize,
    #[serde(default = "default_min_size")]
    pub min_size: usize,
}

impl Default for CommunityConfig {
    fn default() -> Self {
        Self {
            max_passes: default_max_passes(),
            min_size: default_min_size(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FragmentationConfig {
    /// Activity percentile (0-100) a vertex must reach to be tested.
    #[serde(default = "default_percentile")]
    pub percentile: f64,
    #[serde(default = "default_max_candidates")]
    pub max_candidates: usize,
    /// Test every qualifying vertex, ignoring `max_candidates`.
    #[serde(default)]
    pub exhaustive: bool,
}

impl Default for FragmentationConfig {
    fn default() -> Self {
        Self {
            percentile: default_percentile(),
            max_candidates: default_max_candidates(),
            exhaustive: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProximityConfig {
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default = "default_indirect_depth")]
    pub indirect_depth: usize,
}

impl Default for ProximityConfig {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            indirect_depth: default_indirect_depth(),
        }
    }
}

impl AnalysisConfig {
    /// Parse a TOML document; absent keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error when the text is not valid TOML for this schema.
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str::<Self>(text).context("Failed to parse analysis config")
    }
}

/// Load the config at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_config(path: &Path) -> Result<AnalysisConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<AnalysisConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Pick the config file: the explicit path, then `./sociogram.toml`, then
/// `<user config dir>/sociogram/config.toml`.
#[must_use]
pub fn discover_config(explicit: Option<&Path>, cwd: &Path) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let local = cwd.join(CONFIG_FILE_NAME);
    if local.exists() {
        return Some(local);
    }
    let user = dirs::config_dir()?.join("sociogram/config.toml");
    user.exists().then_some(user)
}

/// Resolve the effective config. Defaults apply when no file is found; an
/// explicitly named file must exist.
///
/// # Errors
///
/// Returns an error if the chosen file cannot be read or parsed.
pub fn resolve_config(explicit: Option<&Path>, cwd: &Path) -> Result<AnalysisConfig> {
    match discover_config(explicit, cwd) {
        Some(path) => {
            let config = load_config(&path)?;
            tracing::debug!(path = %path.display(), "loaded config");
            Ok(config)
        }
        None => Ok(AnalysisConfig::default()),
    }
}

fn default_unknown_identity() -> String {
    crate::model::UNKNOWN_IDENTITY.to_string()
}

const fn default_top_k() -> usize {
    5
}

const fn default_max_passes() -> usize {
    10
}

const fn default_min_size() -> usize {
    3
}

const fn default_percentile() -> f64 {
    75.0
}

const fn default_max_candidates() -> usize {
    50
}

const fn default_limit() -> usize {
    5
}

const fn default_indirect_depth() -> usize {
    3
}
