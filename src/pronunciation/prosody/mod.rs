//! Scalar prosodic signals derived directly from PCM.
//!
//! Pitch and pause estimation sit behind single-method traits so the scorer
//! can be handed alternative algorithms without further changes.

mod pause;
mod pitch;

use serde::{Deserialize, Serialize};

pub use pause::SilenceRatioEstimator;
pub use pitch::PyinPitchEstimator;

use crate::pronunciation::{EvaluationError, PcmTrack, Result};

/// Estimates a single fundamental frequency for a whole track.
pub trait PitchEstimator: Send + Sync {
    /// Representative pitch in Hz, `None` when no voiced frame was found.
    fn estimate_pitch(&self, track: &PcmTrack) -> Option<f32>;
}

/// Estimates the fraction of a track that is silence.
pub trait PauseEstimator: Send + Sync {
    /// Ratio in [0, 1].
    fn pause_ratio(&self, track: &PcmTrack) -> f32;
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PitchConfig {
    pub fmin: f64,
    pub fmax: f64,
    /// Analysis frame length in samples; matches the MFCC FFT size.
    pub frame_length: usize,
}

impl Default for PitchConfig {
    fn default() -> Self {
        Self {
            fmin: 80.0,
            fmax: 450.0,
            frame_length: 2048,
        }
    }
}

impl PitchConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.fmin.is_finite() && self.fmax.is_finite()) || self.fmin <= 0.0 {
            return Err(EvaluationError::config(
                "pitch range must be finite and positive",
            ));
        }
        if self.fmax <= self.fmin {
            return Err(EvaluationError::config(format!(
                "pitch fmax ({}) must exceed fmin ({})",
                self.fmax, self.fmin
            )));
        }
        if self.frame_length == 0 {
            return Err(EvaluationError::config("pitch frame_length must be positive"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PauseConfig {
    pub frame_ms: f64,
    /// Mean absolute amplitude below which a frame counts as silent.
    pub silence_threshold: f32,
}

impl Default for PauseConfig {
    fn default() -> Self {
        Self {
            frame_ms: 30.0,
            silence_threshold: 0.015,
        }
    }
}

impl PauseConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.frame_ms.is_finite() || self.frame_ms <= 0.0 {
            return Err(EvaluationError::config("pause frame_ms must be positive"));
        }
        if !self.silence_threshold.is_finite() || self.silence_threshold < 0.0 {
            return Err(EvaluationError::config(
                "silence_threshold must be finite and non-negative",
            ));
        }
        Ok(())
    }
}

/// `user_rms / reference_rms` clamped to `[0, cap]`; zero when the reference is silent.
pub fn energy_ratio(reference: &PcmTrack, user: &PcmTrack, cap: f32) -> f32 {
    if reference.rms == 0.0 {
        return 0.0;
    }
    let ratio = user.rms / reference.rms;
    if ratio.is_nan() {
        return 0.0;
    }
    ratio.clamp(0.0, cap)
}

/// `user.duration / reference.duration`; zero when the reference has no duration.
pub fn duration_ratio(reference: &PcmTrack, user: &PcmTrack) -> f32 {
    let reference_secs = reference.duration_secs();
    if reference_secs == 0.0 {
        return 0.0;
    }
    (user.duration_secs() / reference_secs) as f32
}
