use anyhow::{ensure, Result};

/// Linear interpolation from `source_rate` to `target_rate`.
pub fn resample_linear(samples: &[f32], source_rate: u32, target_rate: u32) -> Result<Vec<f32>> {
    ensure!(source_rate > 0, "source sample rate must be positive");
    ensure!(target_rate > 0, "target sample rate must be positive");
    if samples.is_empty() || source_rate == target_rate {
        return Ok(samples.to_vec());
    }

    let step = source_rate as f64 / target_rate as f64;
    let output_len = ((samples.len() as f64) / step).ceil().max(1.0) as usize;
    let last = samples.len() - 1;
    let resampled = (0..output_len)
        .map(|i| {
            let position = i as f64 * step;
            let left = (position.floor() as usize).min(last);
            let right = (left + 1).min(last);
            let t = (position - left as f64).clamp(0.0, 1.0) as f32;
            samples[left] * (1.0 - t) + samples[right] * t
        })
        .collect();
    Ok(resampled)
}

#[cfg(test)]
mod tests {
    use super::resample_linear;

    #[test]
    fn constant_signal_survives_downsampling() {
        let input = vec![0.5; 480];
        let resampled = resample_linear(&input, 48_000, 16_000).unwrap();
        assert_eq!(resampled.len(), 160);
        assert!(resampled.iter().all(|&s| (s - 0.5).abs() < 1e-6));
    }

    #[test]
    fn upsampling_interpolates_between_neighbours() {
        let resampled = resample_linear(&[0.0, 1.0], 8_000, 16_000).unwrap();
        assert_eq!(resampled, vec![0.0, 0.5, 1.0, 1.0]);
    }

    #[test]
    fn same_rate_is_identity() {
        let input = vec![0.1, -0.2, 0.3];
        assert_eq!(resample_linear(&input, 16_000, 16_000).unwrap(), input);
    }

    #[test]
    fn rejects_zero_rates() {
        assert!(resample_linear(&[0.0], 0, 16_000).is_err());
        assert!(resample_linear(&[0.0], 16_000, 0).is_err());
    }
}
