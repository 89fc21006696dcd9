use aus::analysis;
use aus::analysis::mel::MelFilterbank;
use aus::spectrum;
use aus::WindowType;

use crate::pronunciation::PcmTrack;

use super::FeatureConfig;

const MEL_FLOOR: f64 = 1e-10;

/// Mel power spectrogram, one row per frame.
pub(super) fn compute_mel_spectrogram(track: &PcmTrack, config: &FeatureConfig) -> Vec<Vec<f64>> {
    let padded = centre_pad(&track.samples, config.n_fft / 2);

    let stft = spectrum::rstft(&padded, config.n_fft, config.hop_length, WindowType::Hanning);
    let (magnitude, _) = spectrum::complex_to_polar_rstft(&stft);
    let power = analysis::make_power_spectrogram(&magnitude);

    let nyquist = track.sample_rate as f64 / 2.0;
    let freqs = spectrum::rfftfreq(config.n_fft, track.sample_rate);
    let filterbank = MelFilterbank::new(
        config.fmin,
        config.fmax.min(nyquist),
        config.mel_bands,
        &freqs,
        true,
    );
    let mut mel = analysis::mel::make_mel_spectrogram(&power, &filterbank);
    for frame in mel.iter_mut() {
        for value in frame.iter_mut() {
            *value = if value.is_finite() {
                value.max(MEL_FLOOR)
            } else {
                MEL_FLOOR
            };
        }
    }
    mel
}

/// Zero-pads both ends so frame `t` is centred on sample `t * hop`.
fn centre_pad(samples: &[f32], pad: usize) -> Vec<f64> {
    let mut padded = Vec::with_capacity(samples.len() + 2 * pad);
    padded.resize(pad, 0.0);
    padded.extend(samples.iter().map(|&s| s as f64));
    padded.resize(padded.len() + pad, 0.0);
    padded
}
