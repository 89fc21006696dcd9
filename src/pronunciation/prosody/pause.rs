use crate::pronunciation::{PcmTrack, Result};

use super::{PauseConfig, PauseEstimator};

/// Fraction of fixed-length frames whose mean absolute amplitude is below a
/// silence threshold.
#[derive(Debug, Clone, Default)]
pub struct SilenceRatioEstimator {
    config: PauseConfig,
}

impl SilenceRatioEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: PauseConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    fn frame_len(&self, sample_rate: u32) -> usize {
        ((self.config.frame_ms / 1000.0) * sample_rate as f64)
            .round()
            .max(1.0) as usize
    }
}

impl PauseEstimator for SilenceRatioEstimator {
    fn pause_ratio(&self, track: &PcmTrack) -> f32 {
        if track.is_empty() || track.sample_rate == 0 {
            return 0.0;
        }
        let frame_len = self.frame_len(track.sample_rate);
        let (silent, total) = track
            .samples
            .chunks(frame_len)
            .fold((0_usize, 0_usize), |(silent, total), frame| {
                let quiet = window_energy(frame) < self.config.silence_threshold;
                (silent + usize::from(quiet), total + 1)
            });
        silent as f32 / total as f32
    }
}

fn window_energy(window: &[f32]) -> f32 {
    if window.is_empty() {
        return 0.0;
    }
    let sum: f32 = window.iter().map(|sample| sample.abs()).sum();
    sum / window.len() as f32
}
