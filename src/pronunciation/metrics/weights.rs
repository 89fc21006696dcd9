use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::pronunciation::{EvaluationError, Result};

/// Tunable constants of every scoring formula. Missing fields in a JSON
/// override keep their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Decay scale applied to per-character and per-word mean distances.
    pub segment_scale: f32,
    /// Decay scale of the informational articulation score.
    pub articulation_scale: f32,
    pub word: WordWeights,
    pub sentence: SentenceWeights,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WordWeights {
    pub mfcc_scale: f32,
    pub energy_scale: f32,
    /// Upper bound of the reported user/reference RMS ratio.
    pub energy_ratio_cap: f32,
    /// Ratio clamp applied before the energy penalty.
    pub energy_penalty_clamp: f32,
    pub energy_penalty_factor: f32,
    pub pitch_scale: f32,
    pub pitch_diff_factor: f32,
    /// Score used when either pitch estimate is undefined.
    pub neutral_pitch_score: f32,
    pub mfcc_weight: f32,
    pub energy_weight: f32,
    pub pitch_weight: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SentenceWeights {
    pub pronunciation_scale: f32,
    pub fluency_scale: f32,
    pub pause_penalty_factor: f32,
    /// Duration ratio clamp applied before the tempo penalty.
    pub tempo_ratio_clamp: f32,
    pub tempo_penalty_factor: f32,
    pub pronunciation_weight: f32,
    pub fluency_weight: f32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            segment_scale: 1.0,
            articulation_scale: 2.0,
            word: WordWeights::default(),
            sentence: SentenceWeights::default(),
        }
    }
}

impl Default for WordWeights {
    fn default() -> Self {
        Self {
            mfcc_scale: 2.0,
            energy_scale: 2.0,
            energy_ratio_cap: 10.0,
            energy_penalty_clamp: 5.0,
            energy_penalty_factor: 5.0,
            pitch_scale: 2.5,
            pitch_diff_factor: 10.0,
            neutral_pitch_score: 50.0,
            mfcc_weight: 0.6,
            energy_weight: 0.2,
            pitch_weight: 0.2,
        }
    }
}

impl Default for SentenceWeights {
    fn default() -> Self {
        Self {
            pronunciation_scale: 2.5,
            fluency_scale: 2.5,
            pause_penalty_factor: 5.0,
            tempo_ratio_clamp: 4.0,
            tempo_penalty_factor: 5.0,
            pronunciation_weight: 0.7,
            fluency_weight: 0.3,
        }
    }
}

impl ScoringConfig {
    /// Reads a JSON override from disk.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|err| {
            EvaluationError::config(format!(
                "failed to read scoring config {}: {err}",
                path.display()
            ))
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)
            .map_err(|err| EvaluationError::config(format!("malformed scoring config: {err}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        positive("segment_scale", self.segment_scale)?;
        positive("articulation_scale", self.articulation_scale)?;

        let word = &self.word;
        positive("word.mfcc_scale", word.mfcc_scale)?;
        positive("word.energy_scale", word.energy_scale)?;
        positive("word.energy_ratio_cap", word.energy_ratio_cap)?;
        positive("word.energy_penalty_clamp", word.energy_penalty_clamp)?;
        non_negative("word.energy_penalty_factor", word.energy_penalty_factor)?;
        positive("word.pitch_scale", word.pitch_scale)?;
        non_negative("word.pitch_diff_factor", word.pitch_diff_factor)?;
        non_negative("word.mfcc_weight", word.mfcc_weight)?;
        non_negative("word.energy_weight", word.energy_weight)?;
        non_negative("word.pitch_weight", word.pitch_weight)?;
        if !(0.0..=100.0).contains(&word.neutral_pitch_score) {
            return Err(EvaluationError::config(format!(
                "word.neutral_pitch_score must lie in [0, 100], got {}",
                word.neutral_pitch_score
            )));
        }

        let sentence = &self.sentence;
        positive("sentence.pronunciation_scale", sentence.pronunciation_scale)?;
        positive("sentence.fluency_scale", sentence.fluency_scale)?;
        non_negative("sentence.pause_penalty_factor", sentence.pause_penalty_factor)?;
        positive("sentence.tempo_ratio_clamp", sentence.tempo_ratio_clamp)?;
        non_negative("sentence.tempo_penalty_factor", sentence.tempo_penalty_factor)?;
        non_negative("sentence.pronunciation_weight", sentence.pronunciation_weight)?;
        non_negative("sentence.fluency_weight", sentence.fluency_weight)?;
        Ok(())
    }
}

fn positive(name: &str, value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(EvaluationError::config(format!(
            "{name} must be finite and positive, got {value}"
        )))
    }
}

fn non_negative(name: &str, value: f32) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(EvaluationError::config(format!(
            "{name} must be finite and non-negative, got {value}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(ScoringConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = ScoringConfig::from_json(r#"{"word": {"mfcc_weight": 0.8}}"#).unwrap();
        assert_eq!(config.word.mfcc_weight, 0.8);
        assert_eq!(config.word.pitch_scale, 2.5);
        assert_eq!(config.sentence, SentenceWeights::default());
    }

    #[test]
    fn rejects_non_positive_scale() {
        let err = ScoringConfig::from_json(r#"{"sentence": {"fluency_scale": 0.0}}"#).unwrap_err();
        assert!(err.to_string().contains("sentence.fluency_scale"));
    }

    #[test]
    fn rejects_negative_articulation_scale() {
        let err = ScoringConfig::from_json(r#"{"articulation_scale": -1.0}"#).unwrap_err();
        assert!(err.to_string().contains("articulation_scale"));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(ScoringConfig::from_json("{not json").is_err());
    }
}
