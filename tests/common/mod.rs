#![allow(dead_code)]

use std::f32::consts::PI;
use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};
use spoken_evaluate::PcmTrack;

pub const SAMPLE_RATE: u32 = 16_000;

pub fn sine(frequency: f32, seconds: f32, amplitude: f32) -> Vec<f32> {
    let len = (seconds * SAMPLE_RATE as f32) as usize;
    (0..len)
        .map(|i| amplitude * (2.0 * PI * frequency * i as f32 / SAMPLE_RATE as f32).sin())
        .collect()
}

/// A voiced-sounding tone: fundamental plus two decaying harmonics.
pub fn harmonic_tone(frequency: f32, seconds: f32, amplitude: f32) -> Vec<f32> {
    let len = (seconds * SAMPLE_RATE as f32) as usize;
    (0..len)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            let phase = 2.0 * PI * frequency * t;
            amplitude * (0.6 * phase.sin() + 0.3 * (2.0 * phase).sin() + 0.1 * (3.0 * phase).sin())
        })
        .collect()
}

/// Concatenated tones, one `(frequency, seconds)` pair per syllable.
pub fn syllables(parts: &[(f32, f32)], amplitude: f32) -> Vec<f32> {
    parts
        .iter()
        .flat_map(|&(frequency, seconds)| harmonic_tone(frequency, seconds, amplitude))
        .collect()
}

/// Deterministic pseudo-random noise in [-amplitude, amplitude].
pub fn noise(seconds: f32, amplitude: f32, seed: u64) -> Vec<f32> {
    let len = (seconds * SAMPLE_RATE as f32) as usize;
    let mut state = seed.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
    (0..len)
        .map(|_| {
            state = state
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            let unit = (state >> 40) as f32 / (1u64 << 24) as f32;
            amplitude * (unit * 2.0 - 1.0)
        })
        .collect()
}

pub fn track(samples: Vec<f32>) -> PcmTrack {
    PcmTrack::from_samples(samples, SAMPLE_RATE)
}

pub fn write_wav(path: &Path, samples: &[f32], sample_rate: u32) {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec).expect("create wav");
    for &sample in samples {
        let value = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        writer.write_sample(value).expect("write sample");
    }
    writer.finalize().expect("finalize wav");
}
