use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::aggregate::InsightRules;
use crate::data::filter::Thresholds;

/// Environment variable naming a settings file when no path is given.
pub const CONFIG_ENV: &str = "CINEMETRICS_CONFIG";

/// Process-wide settings, read once at start-up.
///
/// ```json
/// {
///   "data_path": "tmdb_movies_data.csv",
///   "thresholds": { "blockbuster_revenue": 500000000 },
///   "insights": { "top_rated_min_votes": 500 }
/// }
/// ```
///
/// Every key is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Dataset opened at start-up.
    pub data_path: PathBuf,
    pub thresholds: Thresholds,
    pub insights: InsightRules,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("tmdb_movies_data.csv"),
            thresholds: Thresholds::default(),
            insights: InsightRules::default(),
        }
    }
}

impl Settings {
    /// Read settings from `path`, or from [`CONFIG_ENV`] when `path` is
    /// `None`. With neither, defaults apply.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match std::env::var_os(CONFIG_ENV) {
                Some(p) => PathBuf::from(p),
                None => return Ok(Self::default()),
            },
        };
        Self::from_file(&path)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading settings file {}", path.display()))?;
        let settings: Settings = serde_json::from_str(&text)
            .with_context(|| format!("parsing settings file {}", path.display()))?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_files_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{ "data_path": "movies.parquet", "thresholds": { "blockbuster_revenue": 1e9 } }"#,
        )
        .unwrap();

        let s = Settings::from_file(&path).unwrap();
        assert_eq!(s.data_path, PathBuf::from("movies.parquet"));
        assert_eq!(s.thresholds.blockbuster_revenue, 1e9);
        assert_eq!(s.thresholds.hidden_gem_min_rating, 7.0);
        assert_eq!(s.insights, InsightRules::default());
    }

    #[test]
    fn malformed_files_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = Settings::from_file(&path).unwrap_err();
        assert!(format!("{err:#}").contains("parsing settings file"));
    }
}
