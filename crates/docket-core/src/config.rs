use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Location of the project config file relative to the tracker root.
pub const CONFIG_PATH: &str = ".docket/config.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub consolidation: ConsolidationConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the schedule buckets, relative to the root.
    #[serde(default = "default_items_dir")]
    pub items_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            items_dir: default_items_dir(),
        }
    }
}

/// Scoring weights for the four similarity dimensions. Must sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    #[serde(default = "default_summary_weight")]
    pub summary: f64,
    #[serde(default = "default_tags_weight")]
    pub tags: f64,
    #[serde(default = "default_content_weight")]
    pub content: f64,
    #[serde(default = "default_schedule_weight")]
    pub schedule: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            summary: default_summary_weight(),
            tags: default_tags_weight(),
            content: default_content_weight(),
            schedule: default_schedule_weight(),
        }
    }
}

impl Weights {
    #[must_use]
    pub fn total(&self) -> f64 {
        self.summary + self.tags + self.content + self.schedule
    }
}

/// Per-dimension thresholds above which a sub-score is explained in the
/// candidate's reason string.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisclosureThresholds {
    #[serde(default = "default_summary_disclosure")]
    pub summary: f64,
    #[serde(default = "default_half")]
    pub tags: f64,
    #[serde(default = "default_half")]
    pub content: f64,
    #[serde(default = "default_half")]
    pub schedule: f64,
}

impl Default for DisclosureThresholds {
    fn default() -> Self {
        Self {
            summary: default_summary_disclosure(),
            tags: default_half(),
            content: default_half(),
            schedule: default_half(),
        }
    }
}

/// Lower (exclusive) bounds of the strategy score bands.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrategyThresholds {
    #[serde(default = "default_merge_content_threshold")]
    pub merge_content: f64,
    #[serde(default = "default_combine_detailed_threshold")]
    pub combine_detailed: f64,
    #[serde(default = "default_combine_summary_threshold")]
    pub combine_summary: f64,
}

impl Default for StrategyThresholds {
    fn default() -> Self {
        Self {
            merge_content: default_merge_content_threshold(),
            combine_detailed: default_combine_detailed_threshold(),
            combine_summary: default_combine_summary_threshold(),
        }
    }
}

/// `[consolidation]` section of `.docket/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsolidationConfig {
    #[serde(default)]
    pub weights: Weights,
    #[serde(default)]
    pub disclosure: DisclosureThresholds,
    #[serde(default)]
    pub strategy: StrategyThresholds,
    /// Candidates must score strictly above this to be reported.
    #[serde(default = "default_acceptance_threshold")]
    pub acceptance_threshold: f64,
    /// Tokens shorter than this are dropped during normalization.
    #[serde(default = "default_min_token_len")]
    pub min_token_len: usize,
    /// Added to the built-in stop-word list.
    #[serde(default)]
    pub extra_stop_words: Vec<String>,
}

impl Default for ConsolidationConfig {
    fn default() -> Self {
        Self {
            weights: Weights::default(),
            disclosure: DisclosureThresholds::default(),
            strategy: StrategyThresholds::default(),
            acceptance_threshold: default_acceptance_threshold(),
            min_token_len: default_min_token_len(),
            extra_stop_words: Vec::new(),
        }
    }
}

impl ConsolidationConfig {
    /// Reject configurations that could push a composite score outside
    /// `[0, 1]` or make the strategy bands overlap.
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid setting found.
    pub fn validate(&self) -> Result<()> {
        let w = &self.weights;
        for (name, value) in [
            ("summary", w.summary),
            ("tags", w.tags),
            ("content", w.content),
            ("schedule", w.schedule),
        ] {
            if !(0.0..=1.0).contains(&value) {
                bail!("consolidation.weights.{name} must be within [0, 1], got {value}");
            }
        }
        if (w.total() - 1.0).abs() > 1e-6 {
            bail!(
                "consolidation.weights must sum to 1.0, got {:.4}",
                w.total()
            );
        }

        let s = &self.strategy;
        if !(s.merge_content >= s.combine_detailed && s.combine_detailed >= s.combine_summary) {
            bail!(
                "consolidation.strategy thresholds must be non-increasing: \
                 merge_content >= combine_detailed >= combine_summary"
            );
        }
        if self.min_token_len == 0 {
            bail!("consolidation.min_token_len must be at least 1");
        }
        if !(0.0..=1.0).contains(&self.acceptance_threshold) {
            bail!(
                "consolidation.acceptance_threshold must be within [0, 1], got {}",
                self.acceptance_threshold
            );
        }
        Ok(())
    }
}

/// Load `.docket/config.toml` under `project_root`, falling back to defaults
/// when the file does not exist.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read, parsed, or fails
/// validation.
pub fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
    let path = project_root.join(CONFIG_PATH);
    if !path.exists() {
        return Ok(ProjectConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let config = toml::from_str::<ProjectConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    config
        .consolidation
        .validate()
        .with_context(|| format!("Invalid settings in {}", path.display()))?;
    Ok(config)
}

fn default_items_dir() -> PathBuf {
    PathBuf::from("items")
}

const fn default_summary_weight() -> f64 {
    0.40
}

const fn default_tags_weight() -> f64 {
    0.25
}

const fn default_content_weight() -> f64 {
    0.25
}

const fn default_schedule_weight() -> f64 {
    0.10
}

const fn default_summary_disclosure() -> f64 {
    0.7
}

const fn default_half() -> f64 {
    0.5
}

const fn default_merge_content_threshold() -> f64 {
    0.9
}

const fn default_combine_detailed_threshold() -> f64 {
    0.8
}

const fn default_combine_summary_threshold() -> f64 {
    0.7
}

const fn default_acceptance_threshold() -> f64 {
    0.6
}

const fn default_min_token_len() -> usize {
    3
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    fn make_temp_dir(label: &str) -> std::path::PathBuf {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        let dir = std::env::temp_dir().join(format!(
            "docket-config-test-{label}-{}-{id}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(dir.join(".docket")).expect("temp dir must be created");
        dir
    }

    #[test]
    fn missing_project_config_uses_defaults() {
        let root = make_temp_dir("project-default");
        let cfg = load_project_config(&root).expect("load should succeed");
        assert_eq!(cfg.storage.items_dir, PathBuf::from("items"));
        assert!((cfg.consolidation.weights.total() - 1.0).abs() < 1e-9);
        assert!((cfg.consolidation.acceptance_threshold - 0.6).abs() < 1e-9);
        assert_eq!(cfg.consolidation.min_token_len, 3);
        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let root = make_temp_dir("partial");
        std::fs::write(
            root.join(CONFIG_PATH),
            "[consolidation]\nacceptance_threshold = 0.5\nextra_stop_words = [\"todo\"]\n\n\
             [consolidation.strategy]\nmerge_content = 0.95\n",
        )
        .expect("write config");

        let cfg = load_project_config(&root).expect("load should succeed");
        assert!((cfg.consolidation.acceptance_threshold - 0.5).abs() < 1e-9);
        assert_eq!(cfg.consolidation.extra_stop_words, vec!["todo".to_string()]);
        assert!((cfg.consolidation.strategy.merge_content - 0.95).abs() < 1e-9);
        assert!((cfg.consolidation.strategy.combine_detailed - 0.8).abs() < 1e-9);
        assert!((cfg.consolidation.weights.summary - 0.4).abs() < 1e-9);
        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn weights_not_summing_to_one_are_rejected() {
        let root = make_temp_dir("bad-weights");
        std::fs::write(
            root.join(CONFIG_PATH),
            "[consolidation.weights]\nsummary = 0.9\n",
        )
        .expect("write config");

        let err = load_project_config(&root).expect_err("weights sum to 1.5");
        assert!(format!("{err:#}").contains("sum to 1.0"));
        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn zero_min_token_len_is_rejected() {
        let config = ConsolidationConfig {
            min_token_len: 0,
            ..ConsolidationConfig::default()
        };
        let err = config.validate().expect_err("zero-length tokens");
        assert!(err.to_string().contains("min_token_len"));

        let config = ConsolidationConfig {
            min_token_len: 1,
            ..ConsolidationConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn overlapping_strategy_bands_are_rejected() {
        let cfg = ConsolidationConfig {
            strategy: StrategyThresholds {
                merge_content: 0.7,
                combine_detailed: 0.8,
                combine_summary: 0.6,
            },
            ..ConsolidationConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn malformed_toml_is_an_error() {
        let root = make_temp_dir("malformed");
        std::fs::write(root.join(CONFIG_PATH), "[consolidation\n").expect("write config");
        assert!(load_project_config(&root).is_err());
        let _ = std::fs::remove_dir_all(&root);
    }
}
