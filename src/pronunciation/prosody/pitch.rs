use aus::analysis;
use tracing::{debug, warn};

use crate::pronunciation::{PcmTrack, Result};

use super::{PitchConfig, PitchEstimator};

// Fixed by `aus::analysis::pyin_pitch_estimator`: 0.1 semitone resolution,
// hop of a quarter frame, half-frame autocorrelation window.
const PYIN_BINS_PER_SEMITONE: usize = 10;
const PYIN_MAX_TRANSITION_RATE: f64 = 35.92;

/// Probabilistic YIN tracker averaged over voiced frames.
#[derive(Debug, Clone, Default)]
pub struct PyinPitchEstimator {
    config: PitchConfig,
}

impl PyinPitchEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: PitchConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PitchConfig {
        &self.config
    }

    /// Whether the tracker can run at `sample_rate`. The underlying pYIN
    /// executor panics instead of erroring when its period range or pitch
    /// transition matrix cannot be built.
    pub fn supports_sample_rate(&self, sample_rate: u32) -> bool {
        pyin_supports(&self.config, sample_rate)
    }
}

impl PitchEstimator for PyinPitchEstimator {
    fn estimate_pitch(&self, track: &PcmTrack) -> Option<f32> {
        if track.len() < self.config.frame_length {
            return None;
        }
        if !self.supports_sample_rate(track.sample_rate) {
            warn!(
                sample_rate = track.sample_rate,
                frame_length = self.config.frame_length,
                "pitch tracking unsupported at this sample rate"
            );
            return None;
        }
        let audio: Vec<f64> = track.samples.iter().map(|&s| s as f64).collect();
        let (_timestamps, pitches, voiced_flags, _confidence) = analysis::pyin_pitch_estimator(
            &audio,
            track.sample_rate,
            self.config.fmin,
            self.config.fmax,
            self.config.frame_length,
        );
        let pitch = mean_voiced_pitch(&pitches, &voiced_flags);
        debug!(
            frames = pitches.len(),
            pitch_hz = pitch.unwrap_or(f32::NAN),
            "estimated track pitch"
        );
        pitch
    }
}

fn pyin_supports(config: &PitchConfig, sample_rate: u32) -> bool {
    let sr = sample_rate as f64;
    if sample_rate == 0 || !(config.fmin > 0.0 && config.fmin < config.fmax && config.fmax <= sr / 2.0) {
        return false;
    }

    let window = config.frame_length / 2;
    let hop = config.frame_length / 4;
    if window == 0 || hop == 0 {
        return false;
    }
    let min_period = ((sr / config.fmax).floor() as usize).max(1);
    let max_period =
        ((sr / config.fmin).ceil() as usize).min(config.frame_length - window - 1);
    if max_period < min_period + 2 {
        return false;
    }

    let pitch_bins =
        (12.0 * PYIN_BINS_PER_SEMITONE as f64 * (config.fmax / config.fmin).log2()).floor() as usize + 1;
    let semitones_per_hop = (PYIN_MAX_TRANSITION_RATE * 12.0 * hop as f64 / sr).round() as usize;
    let transition_width = semitones_per_hop * PYIN_BINS_PER_SEMITONE + 1;
    pitch_bins >= 2 && transition_width <= pitch_bins
}

fn mean_voiced_pitch(pitches: &[f64], voiced: &[bool]) -> Option<f32> {
    let (total, count) = pitches
        .iter()
        .zip(voiced.iter())
        .filter(|&(&pitch, &flag)| flag && pitch.is_finite() && pitch > 0.0)
        .fold((0.0_f64, 0_usize), |(total, count), (&pitch, _)| {
            (total + pitch, count + 1)
        });
    (count > 0).then(|| (total / count as f64) as f32)
}
