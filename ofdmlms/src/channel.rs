/// Additive complex Gaussian noise channel
///
/// Noise variance follows the measured input power:
///
///   σ² = P_signal / 10^(SNR_dB / 10)
///
/// split evenly between the real and imaginary components.

use ndarray::Array2;
use num_complex::Complex64;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

use crate::error::{SimError, SimResult};

const STAGE: &str = "channel";

/// Mean `|x|²` over a buffer
pub fn mean_power<'a, I>(samples: I) -> f64
where
    I: IntoIterator<Item = &'a Complex64>,
{
    let (sum, count) = samples
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), s| (sum + s.norm_sqr(), count + 1));

    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Total complex noise variance for `snr_db` relative to `signal_power`
pub fn noise_variance(signal_power: f64, snr_db: f64) -> SimResult<f64> {
    if !snr_db.is_finite() {
        return Err(SimError::invalid(STAGE, "snr_db", format!("must be finite, got {}", snr_db)));
    }
    if !(signal_power.is_finite() && signal_power > 0.0) {
        return Err(SimError::degenerate(
            STAGE,
            format!("signal power {} leaves SNR scaling undefined", signal_power),
        ));
    }

    let snr_linear = 10f64.powf(snr_db / 10.0);
    let variance = signal_power / snr_linear;
    if !(variance.is_finite() && variance > 0.0) {
        return Err(SimError::degenerate(
            STAGE,
            format!("noise variance {} at {} dB for signal power {:.4e}", variance, snr_db, signal_power),
        ));
    }
    Ok(variance)
}

/// AWGN channel driven by an injectable random source
pub struct AwgnChannel<R: Rng = StdRng> {
    rng: R,
}

impl AwgnChannel<StdRng> {
    pub fn from_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> AwgnChannel<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    fn component_noise(signal_power: f64, snr_db: f64) -> SimResult<Normal<f64>> {
        let variance = noise_variance(signal_power, snr_db)?;
        // Divide by 2 for I and Q
        let noise_std = (variance / 2.0).sqrt();

        log::debug!(
            "[channel] P_signal={:.4e} SNR={} dB -> σ²={:.4e}",
            signal_power,
            snr_db,
            variance
        );

        Normal::new(0.0, noise_std).map_err(|e| SimError::degenerate(STAGE, e.to_string()))
    }

    fn draw(&mut self, dist: &Normal<f64>) -> Complex64 {
        Complex64::new(dist.sample(&mut self.rng), dist.sample(&mut self.rng))
    }

    /// Add noise to a sample stream; output has the input's length
    pub fn apply(&mut self, samples: &[Complex64], snr_db: f64) -> SimResult<Vec<Complex64>> {
        let dist = Self::component_noise(mean_power(samples), snr_db)?;

        Ok(samples.iter().map(|&s| s + self.draw(&dist)).collect())
    }

    /// Add noise to a batch of frames, calibrated on the power of the whole batch
    pub fn apply_batch(&mut self, frames: &Array2<Complex64>, snr_db: f64) -> SimResult<Array2<Complex64>> {
        let dist = Self::component_noise(mean_power(frames.iter()), snr_db)?;

        let mut noisy = frames.to_owned();
        for sample in noisy.iter_mut() {
            *sample += self.draw(&dist);
        }
        Ok(noisy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noise_variance_formula() {
        assert!((noise_variance(2.0, 0.0).unwrap() - 2.0).abs() < 1e-12);
        assert!((noise_variance(2.0, 10.0).unwrap() - 0.2).abs() < 1e-12);
        assert!((noise_variance(1.0, -10.0).unwrap() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_measured_noise_power_matches_request() {
        let mut channel = AwgnChannel::from_seed(1234);
        let clean = vec![Complex64::new(1.0, -1.0); 20_000];

        for &snr_db in &[0.0, 10.0, 20.0] {
            let noisy = channel.apply(&clean, snr_db).unwrap();
            let noise: Vec<Complex64> = noisy.iter().zip(&clean).map(|(y, x)| y - x).collect();

            let expected = 2.0 / 10f64.powf(snr_db / 10.0);
            let measured = mean_power(&noise);
            let ratio = measured / expected;
            println!("SNR {} dB: expected {:.5}, measured {:.5}", snr_db, expected, measured);
            assert!((ratio - 1.0).abs() < 0.1, "ratio {}", ratio);

            // Both components carry half of the noise
            let re_power = noise.iter().map(|n| n.re * n.re).sum::<f64>() / noise.len() as f64;
            assert!((re_power / (expected / 2.0) - 1.0).abs() < 0.1);
        }
    }

    #[test]
    fn test_batch_shape_and_calibration() {
        let mut channel = AwgnChannel::from_seed(99);
        let frames = Array2::from_elem((8, 2000), Complex64::new(0.5, 0.0));

        let noisy = channel.apply_batch(&frames, 3.0).unwrap();
        assert_eq!(noisy.dim(), frames.dim());

        let noise = &noisy - &frames;
        let expected = 0.25 / 10f64.powf(0.3);
        assert!((mean_power(noise.iter()) / expected - 1.0).abs() < 0.1);
    }

    #[test]
    fn test_seeded_noise_is_reproducible() {
        let clean = vec![Complex64::new(1.0, 1.0); 64];
        let a = AwgnChannel::from_seed(5).apply(&clean, 12.0).unwrap();
        let b = AwgnChannel::from_seed(5).apply(&clean, 12.0).unwrap();
        let c = AwgnChannel::from_seed(6).apply(&clean, 12.0).unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_injected_rng_is_used() {
        let clean = vec![Complex64::new(1.0, 0.0); 16];
        let injected = AwgnChannel::with_rng(StdRng::seed_from_u64(21)).apply(&clean, 0.0).unwrap();
        let seeded = AwgnChannel::from_seed(21).apply(&clean, 0.0).unwrap();
        assert_eq!(injected, seeded);
    }

    #[test]
    fn test_zero_power_is_degenerate() {
        let silent = vec![Complex64::new(0.0, 0.0); 32];
        let err = AwgnChannel::from_seed(0).apply(&silent, 10.0).unwrap_err();
        assert!(matches!(err, SimError::NumericDegenerate { stage: "channel", .. }));

        assert!(AwgnChannel::from_seed(0).apply(&[], 10.0).is_err());
    }

    #[test]
    fn test_overflowing_variance_is_degenerate() {
        assert!(matches!(
            noise_variance(1.0, -4000.0),
            Err(SimError::NumericDegenerate { stage: "channel", .. })
        ));
        assert!(noise_variance(f64::MAX, -10.0).is_err());

        let clean = vec![Complex64::new(1.0, 0.0); 4];
        let err = AwgnChannel::from_seed(0).apply(&clean, -4000.0).unwrap_err();
        match err {
            SimError::NumericDegenerate { stage, reason } => {
                assert_eq!(stage, "channel");
                assert!(reason.contains("-4000"), "reason: {}", reason);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_non_finite_snr_is_rejected() {
        let clean = vec![Complex64::new(1.0, 0.0); 4];
        let err = AwgnChannel::from_seed(0).apply(&clean, f64::NAN).unwrap_err();
        assert!(matches!(err, SimError::InvalidConfig { param: "snr_db", .. }));
    }
}
