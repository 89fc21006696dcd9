use std::path::PathBuf;

use anyhow::{ensure, Context, Result};

use crate::pronunciation::ScoringConfig;

pub const DEFAULT_SAMPLE_RATE: u32 = 16_000;

pub const SAMPLE_RATE_VAR: &str = "SPOKEN_EVALUATE_SAMPLE_RATE";
pub const WHISPER_MODEL_VAR: &str = "SPOKEN_EVALUATE_WHISPER_MODEL";
pub const LANGUAGE_VAR: &str = "SPOKEN_EVALUATE_LANGUAGE";
pub const DISABLE_WHISPER_VAR: &str = "DISABLE_WHISPER";
pub const SCORING_VAR: &str = "SPOKEN_EVALUATE_SCORING";

/// Service-level settings. Scoring constants live in [`ScoringConfig`].
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub sample_rate: u32,
    pub whisper_model: Option<PathBuf>,
    pub language: Option<String>,
    pub whisper_disabled: bool,
    pub scoring_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            whisper_model: None,
            language: None,
            whisper_disabled: false,
            scoring_path: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup; blank values
    /// count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let sample_rate = match get(SAMPLE_RATE_VAR) {
            Some(raw) => raw
                .parse::<u32>()
                .with_context(|| format!("{SAMPLE_RATE_VAR} must be an integer, got {raw:?}"))?,
            None => DEFAULT_SAMPLE_RATE,
        };
        ensure!(sample_rate > 0, "{SAMPLE_RATE_VAR} must be positive");

        Ok(Self {
            sample_rate,
            whisper_model: get(WHISPER_MODEL_VAR).map(PathBuf::from),
            language: get(LANGUAGE_VAR),
            whisper_disabled: get(DISABLE_WHISPER_VAR).is_some_and(|raw| is_truthy(&raw)),
            scoring_path: get(SCORING_VAR).map(PathBuf::from),
        })
    }

    /// Scoring constants from `scoring_path`, or the defaults.
    pub fn scoring(&self) -> Result<ScoringConfig> {
        match &self.scoring_path {
            Some(path) => ScoringConfig::load_from_file(path)
                .with_context(|| format!("failed to load scoring config {}", path.display())),
            None => Ok(ScoringConfig::default()),
        }
    }
}

fn is_truthy(raw: &str) -> bool {
    matches!(
        raw.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
