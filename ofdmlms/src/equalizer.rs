//! LMS Equalizer
//!
//! Sample-by-sample complex LMS over a sliding window of the received
//! stream. For each index `n` in `M..len`, in order:
//!
//! ```text
//! x = received[n-M .. n]          (most recent sample last)
//! y = Σ w[i] · x[i]               (no conjugation)
//! e = received[n] − y
//! w ← w + μ · conj(e) · x
//! output[n] = y
//! ```
//!
//! The error reference is the received stream itself, not a training
//! sequence or sliced decision. Outputs `0..M` have no full window and stay
//! zero. Weights start at zero for every run and every batch row.
//!
//! For real-valued input this reduces to the textbook real LMS predictor.
//! For complex input the imaginary part of `w` is not damped by the
//! `conj(e) · x` update and can grow over long runs.

use ndarray::{Array2, Axis};
use num_complex::Complex64;
use num_traits::Zero;
use rayon::prelude::*;

use crate::config::SimConfig;
use crate::error::{SimError, SimResult};

const STAGE: &str = "lms";

/// Adaptive filter parameters; the weight vector lives only inside a run
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LmsEqualizer {
    tap_count: usize,
    step_size: f64,
}

/// Everything one adaptation pass produced
#[derive(Clone, Debug, PartialEq)]
pub struct LmsRun {
    /// Filter output, same length as the input, zero before the first full window
    pub output: Vec<Complex64>,
    /// Weights after the final update
    pub weights: Vec<Complex64>,
    /// `|e|` for every adapted index, starting at `n = M`
    pub error_magnitudes: Vec<f64>,
}

impl LmsEqualizer {
    pub fn new(tap_count: usize, step_size: f64) -> SimResult<Self> {
        if tap_count == 0 {
            return Err(SimError::invalid(STAGE, "tap_count", "must be greater than zero"));
        }
        if !(step_size.is_finite() && step_size > 0.0) {
            return Err(SimError::invalid(
                STAGE,
                "step_size",
                format!("must be positive and finite, got {}", step_size),
            ));
        }

        Ok(Self { tap_count, step_size })
    }

    pub fn from_config(config: &SimConfig) -> SimResult<Self> {
        Self::new(config.tap_count, config.step_size)
    }

    pub fn tap_count(&self) -> usize {
        self.tap_count
    }

    pub fn step_size(&self) -> f64 {
        self.step_size
    }

    fn check_len(&self, len: usize) -> SimResult<()> {
        if self.tap_count >= len {
            return Err(SimError::invalid(
                STAGE,
                "tap_count",
                format!("{} leaves no full window in a sequence of {}", self.tap_count, len),
            ));
        }
        Ok(())
    }

    /// Adapt over `received` from a zero weight vector
    pub fn run(&self, received: &[Complex64]) -> SimResult<LmsRun> {
        self.check_len(received.len())?;

        let m = self.tap_count;
        let mu = self.step_size;
        let mut weights = vec![Complex64::zero(); m];
        let mut output = vec![Complex64::zero(); received.len()];
        let mut error_magnitudes = Vec::with_capacity(received.len() - m);

        for n in m..received.len() {
            let window = &received[n - m..n];

            let y: Complex64 = weights.iter().zip(window).map(|(w, x)| w * x).sum();
            let e = received[n] - y;

            let gain = e.conj() * mu;
            for (w, x) in weights.iter_mut().zip(window) {
                *w += gain * x;
            }

            output[n] = y;
            error_magnitudes.push(e.norm());
        }

        Ok(LmsRun { output, weights, error_magnitudes })
    }

    /// Filter output only
    pub fn equalize(&self, received: &[Complex64]) -> SimResult<Vec<Complex64>> {
        Ok(self.run(received)?.output)
    }

    /// Equalize every row independently, each with fresh weights
    pub fn equalize_batch(&self, rows: &Array2<Complex64>) -> SimResult<Array2<Complex64>> {
        self.check_len(rows.ncols())?;

        let equalized = rows
            .axis_iter(Axis(0))
            .into_par_iter()
            .map(|row| self.equalize(&row.to_vec()))
            .collect::<SimResult<Vec<_>>>()?;

        log::debug!("[lms] equalized {} rows of {} samples", rows.nrows(), rows.ncols());

        Array2::from_shape_vec(rows.dim(), equalized.concat())
            .map_err(|e| SimError::degenerate(STAGE, e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bits::BitSource;
    use crate::channel::AwgnChannel;
    use crate::qpsk::map_qpsk;
    use crate::test_utils::{assert_all_finite, assert_complex_approx_eq};

    fn sinusoid(len: usize) -> Vec<Complex64> {
        (0..len).map(|n| Complex64::new((0.3 * n as f64).sin(), 0.0)).collect()
    }

    #[test]
    fn test_leading_outputs_stay_zero() {
        let symbols = map_qpsk(&BitSource::from_seed(4).generate(512)).unwrap();
        let noisy = AwgnChannel::from_seed(4).apply(&symbols, 5.0).unwrap();

        for &taps in &[1usize, 8, 32, 255] {
            let out = LmsEqualizer::new(taps, 0.01).unwrap().equalize(&noisy).unwrap();
            assert_eq!(out.len(), noisy.len());
            assert!(out[..taps].iter().all(|y| *y == Complex64::zero()), "taps = {}", taps);
        }
    }

    #[test]
    fn test_first_steps_by_hand() {
        // M = 1, μ = 0.5 on [1, 2, 3]
        //   n=1: x=[1], y=0, e=2, w=0+0.5·2·1=1
        //   n=2: x=[2], y=2, e=1, w=1+0.5·1·2=2
        let received = [1.0, 2.0, 3.0].map(|v| Complex64::new(v, 0.0));
        let run = LmsEqualizer::new(1, 0.5).unwrap().run(&received).unwrap();

        assert_eq!(run.output, vec![Complex64::zero(), Complex64::zero(), Complex64::new(2.0, 0.0)]);
        assert_eq!(run.error_magnitudes, vec![2.0, 1.0]);
        assert_eq!(run.weights, vec![Complex64::new(2.0, 0.0)]);
    }

    #[test]
    fn test_update_conjugates_error_only() {
        // M = 1, μ = 1 on [j, 1]: y=0, e=1, w = conj(1)·j = j
        let received = [Complex64::new(0.0, 1.0), Complex64::new(1.0, 0.0)];
        let run = LmsEqualizer::new(1, 1.0).unwrap().run(&received).unwrap();
        assert_eq!(run.weights, vec![Complex64::new(0.0, 1.0)]);

        // M = 1, μ = 1 on [1, j]: y=0, e=j, w = conj(j)·1 = -j
        let received = [Complex64::new(1.0, 0.0), Complex64::new(0.0, 1.0)];
        let run = LmsEqualizer::new(1, 1.0).unwrap().run(&received).unwrap();
        assert_eq!(run.weights, vec![Complex64::new(0.0, -1.0)]);
    }

    #[test]
    fn test_error_shrinks_on_predictable_input() {
        let input = sinusoid(4000);
        let run = LmsEqualizer::new(8, 0.05).unwrap().run(&input).unwrap();

        let errors = &run.error_magnitudes;
        let quarter = errors.len() / 4;
        let early = errors[..quarter].iter().sum::<f64>() / quarter as f64;
        let late = errors[errors.len() - quarter..].iter().sum::<f64>() / quarter as f64;

        println!("mean |e|: early {:.4}, late {:.4}", early, late);
        assert!(late < early);
        assert!(late < 0.1);
    }

    #[test]
    fn test_runs_do_not_share_state() {
        let eq = LmsEqualizer::new(4, 0.05).unwrap();
        let input = sinusoid(200);

        let first = eq.run(&input).unwrap();
        let second = eq.run(&input).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_batch_rows_are_independent() {
        let eq = LmsEqualizer::new(6, 0.02).unwrap();
        let symbols = map_qpsk(&BitSource::from_seed(17).generate(3 * 64 * 2)).unwrap();
        let rows = Array2::from_shape_vec((3, 64), symbols.clone()).unwrap();

        let batch = eq.equalize_batch(&rows).unwrap();
        assert_eq!(batch.dim(), (3, 64));

        for (r, chunk) in symbols.chunks(64).enumerate() {
            let single = eq.equalize(chunk).unwrap();
            assert_complex_approx_eq(&batch.row(r).to_vec(), &single, 1e-15, "batch row");
        }
        assert_all_finite(batch.iter(), "batch output");
    }

    #[test]
    fn test_rejects_invalid_parameters() {
        assert!(matches!(
            LmsEqualizer::new(0, 0.01),
            Err(SimError::InvalidConfig { param: "tap_count", .. })
        ));
        for mu in [0.0, -0.01, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                LmsEqualizer::new(4, mu),
                Err(SimError::InvalidConfig { param: "step_size", .. })
            ));
        }

        let eq = LmsEqualizer::new(8, 0.01).unwrap();
        assert!(eq.run(&sinusoid(8)).is_err());
        assert!(eq.run(&sinusoid(9)).is_ok());
        assert!(eq.equalize_batch(&Array2::zeros((2, 8))).is_err());
    }
}
