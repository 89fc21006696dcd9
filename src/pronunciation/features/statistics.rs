use aus::analysis;
use ndarray::Array2;

use crate::pronunciation::{EvaluationError, Result};

/// Cepstral coefficients per frame, `(frames, n_mfcc)`.
pub(super) fn cepstral_coefficients(mel: &[Vec<f64>], n_mfcc: usize) -> Result<Array2<f32>> {
    if mel.is_empty() {
        return Ok(Array2::zeros((0, n_mfcc)));
    }
    let raw = analysis::mel::mfcc_spectrogram(mel, n_mfcc, None);
    array_from_rows(&raw)
}

fn array_from_rows(rows: &[Vec<f64>]) -> Result<Array2<f32>> {
    let frame_count = rows.len();
    let coefficients = rows.first().map(|row| row.len()).unwrap_or(0);
    let mut flat = Vec::with_capacity(frame_count * coefficients);
    for (index, row) in rows.iter().enumerate() {
        if row.len() != coefficients {
            return Err(EvaluationError::Feature(format!(
                "frame {index} has {} coefficients, expected {coefficients}",
                row.len()
            )));
        }
        flat.extend(
            row.iter()
                .map(|&v| if v.is_finite() { v as f32 } else { 0.0 }),
        );
    }
    Array2::from_shape_vec((frame_count, coefficients), flat)
        .map_err(|err| EvaluationError::Feature(err.to_string()))
}

/// Scales each frame by its peak magnitude so values land in [-1, 1].
/// Frames with a negligible peak are left untouched.
pub(super) fn normalize_frames(mut frames: Array2<f32>) -> Array2<f32> {
    for mut row in frames.rows_mut() {
        let peak = row.iter().fold(0.0_f32, |acc, v| acc.max(v.abs()));
        if peak > f32::MIN_POSITIVE {
            row.mapv_inplace(|v| v / peak);
        }
    }
    frames
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn frames_scale_by_their_own_peak() {
        let frames = array![[2.0_f32, -4.0, 1.0], [0.5, 0.25, -0.25]];
        let normalized = normalize_frames(frames);
        assert_eq!(normalized.row(0).to_vec(), vec![0.5, -1.0, 0.25]);
        assert_eq!(normalized.row(1).to_vec(), vec![1.0, 0.5, -0.5]);
    }

    #[test]
    fn silent_frame_is_left_at_zero() {
        let normalized = normalize_frames(Array2::zeros((1, 4)));
        assert!(normalized.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let rows = vec![vec![1.0, 2.0], vec![3.0]];
        assert!(array_from_rows(&rows).is_err());
    }

    #[test]
    fn non_finite_coefficients_become_zero() {
        let rows = vec![vec![f64::NAN, 1.0, f64::NEG_INFINITY]];
        let array = array_from_rows(&rows).unwrap();
        assert_eq!(array.row(0).to_vec(), vec![0.0, 1.0, 0.0]);
    }
}
