pub mod decoder;
pub mod resample;

use std::path::Path;

use anyhow::{ensure, Context, Result};
use tracing::debug;

use crate::pronunciation::prosody::energy_ratio;
use crate::pronunciation::{PcmTrack, WordWeights};

use decoder::DecodedAudio;

/// Turns uploaded or on-disk audio into mono tracks at a fixed sample rate.
#[derive(Debug, Clone, Copy)]
pub struct AudioLoader {
    target_sample_rate: u32,
}

impl AudioLoader {
    pub fn new(target_sample_rate: u32) -> Result<Self> {
        ensure!(
            target_sample_rate > 0,
            "target sample rate must be positive, got {target_sample_rate}"
        );
        Ok(Self { target_sample_rate })
    }

    pub fn target_sample_rate(&self) -> u32 {
        self.target_sample_rate
    }

    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> Result<PcmTrack> {
        let path = path.as_ref();
        let decoded = decoder::decode_file(path)?;
        self.finish(decoded)
            .with_context(|| format!("failed to load {}", path.display()))
    }

    pub fn load_bytes(&self, bytes: &[u8], extension: Option<&str>) -> Result<PcmTrack> {
        let decoded = decoder::decode_bytes(bytes, extension)?;
        self.finish(decoded)
    }

    fn finish(&self, decoded: DecodedAudio) -> Result<PcmTrack> {
        ensure!(!decoded.samples.is_empty(), "uploaded audio is empty");
        let samples =
            resample::resample_linear(&decoded.samples, decoded.sample_rate, self.target_sample_rate)?;
        let track = PcmTrack::from_samples(samples, self.target_sample_rate);
        debug!(
            source_rate = decoded.sample_rate,
            sample_rate = track.sample_rate,
            duration_secs = track.duration_secs(),
            rms = track.rms,
            "loaded audio track"
        );
        Ok(track)
    }
}

/// User-to-reference RMS ratio with the default cap of 10.
pub fn compute_energy_ratio(reference: &PcmTrack, user: &PcmTrack) -> f32 {
    energy_ratio(reference, user, WordWeights::default().energy_ratio_cap)
}
