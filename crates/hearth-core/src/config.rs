use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{HearthError, Result};

/// Top-level configuration for the Hearth engine.
///
/// Loaded from `~/.hearth/config.toml` by default. Each section corresponds
/// to one pipeline stage or cross-cutting concern.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HearthConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub similarity: SimilarityConfig,
    #[serde(default)]
    pub insight: InsightConfig,
    #[serde(default)]
    pub suggestion: SuggestionConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
}

impl HearthConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: HearthConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| HearthError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Data directory for the SQLite database.
    pub data_dir: String,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: "~/.hearth/data".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Similarity detector weights and threshold.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarityConfig {
    /// Weight of title similarity in the combined score.
    pub title_weight: f64,
    /// Weight of metadata similarity in the combined score.
    pub metadata_weight: f64,
    /// Weight of content similarity in the combined score.
    pub content_weight: f64,
    /// Combined score must strictly exceed this to report a candidate.
    pub threshold: f64,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            title_weight: 0.4,
            metadata_weight: 0.3,
            content_weight: 0.3,
            threshold: 0.5,
        }
    }
}

/// Insight generation windows and TTLs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightConfig {
    /// Reject a same (type, title) insight generated within this window.
    pub dedup_window_hours: i64,
    /// Insights expire this many days after generation.
    pub insight_ttl_days: i64,
    /// Notifications projected from insights expire after this many days.
    pub notification_ttl_days: i64,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            dedup_window_hours: 24,
            insight_ttl_days: 30,
            notification_ttl_days: 7,
        }
    }
}

/// Suggestion engine windows and model thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestionConfig {
    /// Reject a same (type, title) suggestion generated within this window.
    pub dedup_window_days: i64,
    /// Queued feedback records that trigger a relevance model retrain.
    pub retrain_threshold: usize,
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            dedup_window_days: 7,
            retrain_threshold: 50,
        }
    }
}

/// Background schedule runner settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Fallback poll interval when no schedule is due, in seconds.
    pub poll_interval_secs: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 60,
        }
    }
}
