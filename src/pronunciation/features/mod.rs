mod mel;
mod statistics;

use serde::{Deserialize, Serialize};
use tracing::debug;

use mel::compute_mel_spectrogram;
use statistics::{cepstral_coefficients, normalize_frames};

use crate::pronunciation::{EvaluationError, FeatureMatrix, PcmTrack, Result};

/// Short-time spectral analysis parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    pub n_mfcc: usize,
    pub hop_length: usize,
    pub n_fft: usize,
    pub fmin: f64,
    pub fmax: f64,
    pub mel_bands: usize,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            n_mfcc: 20,
            hop_length: 512,
            n_fft: 2048,
            fmin: 20.0,
            fmax: 7_000.0,
            mel_bands: 128,
        }
    }
}

impl FeatureConfig {
    pub fn validate(&self) -> Result<()> {
        if self.n_mfcc == 0 || self.mel_bands == 0 {
            return Err(EvaluationError::config(
                "n_mfcc and mel_bands must be positive",
            ));
        }
        if self.n_mfcc > self.mel_bands {
            return Err(EvaluationError::config(format!(
                "n_mfcc ({}) cannot exceed mel_bands ({})",
                self.n_mfcc, self.mel_bands
            )));
        }
        if self.hop_length == 0 || self.n_fft < 2 {
            return Err(EvaluationError::config(
                "hop_length must be positive and n_fft at least 2",
            ));
        }
        if !(self.fmin.is_finite() && self.fmax.is_finite()) || self.fmin < 0.0 {
            return Err(EvaluationError::config(
                "frequency band limits must be finite and non-negative",
            ));
        }
        if self.fmax <= self.fmin {
            return Err(EvaluationError::config(format!(
                "fmax ({}) must exceed fmin ({})",
                self.fmax, self.fmin
            )));
        }
        Ok(())
    }
}

/// Turns PCM tracks into per-frame normalised MFCC vectors.
#[derive(Debug, Clone, Default)]
pub struct FeatureExtractor {
    config: FeatureConfig,
}

impl FeatureExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: FeatureConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    /// Extracts the feature matrix for `track`. Identical input always yields
    /// identical output.
    pub fn extract(&self, track: &PcmTrack) -> Result<FeatureMatrix> {
        if track.sample_rate == 0 {
            return Err(EvaluationError::InvalidSampleRate(track.sample_rate));
        }
        if track.is_empty() {
            return Err(EvaluationError::EmptyAudio { track: "input" });
        }
        if track.sample_rate as f64 / 2.0 <= self.config.fmin {
            return Err(EvaluationError::Feature(format!(
                "sample rate {} Hz leaves no band above fmin {} Hz",
                track.sample_rate, self.config.fmin
            )));
        }

        let mel = compute_mel_spectrogram(track, &self.config);
        let mfcc = cepstral_coefficients(&mel, self.config.n_mfcc)?;
        let frames = normalize_frames(mfcc);
        debug!(
            samples = track.len(),
            frames = frames.nrows(),
            coefficients = frames.ncols(),
            "extracted mfcc features"
        );
        Ok(FeatureMatrix::from_frames(frames))
    }
}
