use crate::error::GranskaError;
use crate::extraction::lines::DEFAULT_BAND_WIDTH;
use crate::parsing::summary::ScoreStrategyKind;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Tunables of the extraction engine.
///
/// Every field has a default, so a config file only needs the keys it
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Height of the Y band that groups fragments into one line.
    pub band_width: f32,
    /// Score layouts to try, in order.
    pub score_strategies: Vec<ScoreStrategyKind>,
    /// Scan for `0/N` checklist questions when no numbered question is found.
    pub unnumbered_fallback: bool,
    pub comment_max_chars: usize,
    pub comment_max_lines: usize,
    /// Lines after a numbered question searched for its score.
    pub score_lookahead: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            band_width: DEFAULT_BAND_WIDTH,
            score_strategies: ScoreStrategyKind::ALL.to_vec(),
            unnumbered_fallback: true,
            comment_max_chars: 300,
            comment_max_lines: 20,
            score_lookahead: 4,
        }
    }
}

/// Load an engine config from a JSON file.
pub fn load_config(path: &Path) -> Result<EngineConfig, GranskaError> {
    let content = std::fs::read_to_string(path).map_err(|e| GranskaError::ConfigLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let config: EngineConfig =
        serde_json::from_str(&content).map_err(|e| GranskaError::ConfigLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    validate_config(&config)?;
    Ok(config)
}

/// Parse an engine config from a JSON string.
pub fn parse_config_str(json: &str) -> Result<EngineConfig, GranskaError> {
    let config: EngineConfig = serde_json::from_str(json)?;
    validate_config(&config)?;
    Ok(config)
}

pub fn validate_config(config: &EngineConfig) -> Result<(), GranskaError> {
    if !(config.band_width.is_finite() && config.band_width > 0.0) {
        return Err(GranskaError::ConfigInvalid(format!(
            "band_width must be positive, got {}",
            config.band_width
        )));
    }

    if config.score_strategies.is_empty() {
        return Err(GranskaError::ConfigInvalid(
            "score_strategies must not be empty".into(),
        ));
    }

    let mut seen = HashSet::new();
    for strategy in &config.score_strategies {
        if !seen.insert(strategy) {
            return Err(GranskaError::ConfigInvalid(format!(
                "score strategy '{strategy}' listed twice"
            )));
        }
    }

    if config.comment_max_chars < 4 {
        return Err(GranskaError::ConfigInvalid(format!(
            "comment_max_chars must be at least 4, got {}",
            config.comment_max_chars
        )));
    }

    Ok(())
}
