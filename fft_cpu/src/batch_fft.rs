use std::fmt;
use std::sync::Arc;

use ndarray::Array2;
use num_complex::Complex64;
use rayon::prelude::*;
use rustfft::num_traits::Zero;
use rustfft::{Fft, FftDirection, FftPlanner};

/// Errors raised by the batched FFT engine
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FftError {
    #[error("FFT size must be greater than zero")]
    ZeroSize,

    #[error("FFT length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("FFT batch is not contiguous in memory")]
    NonContiguous,
}

/// Fixed-size FFT with forward and inverse plans built once.
///
/// Forward transforms are unnormalised; inverse transforms scale by `1/N`,
/// so `forward(inverse(x))` reproduces `x`.
#[derive(Clone)]
pub struct BatchFft {
    n_fft: usize,
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
}

impl fmt::Debug for BatchFft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchFft").field("n_fft", &self.n_fft).finish()
    }
}

impl BatchFft {
    /// Plan forward and inverse transforms of size `n_fft`
    pub fn new(n_fft: usize) -> Result<Self, FftError> {
        if n_fft == 0 {
            return Err(FftError::ZeroSize);
        }

        let mut planner = FftPlanner::<f64>::new();
        let forward = planner.plan_fft_forward(n_fft);
        let inverse = planner.plan_fft_inverse(n_fft);

        log::debug!("planned {}-point FFT pair", n_fft);

        Ok(Self { n_fft, forward, inverse })
    }

    pub fn len(&self) -> usize {
        self.n_fft
    }

    pub fn is_empty(&self) -> bool {
        self.n_fft == 0
    }

    fn plan(&self, direction: FftDirection) -> &Arc<dyn Fft<f64>> {
        match direction {
            FftDirection::Forward => &self.forward,
            FftDirection::Inverse => &self.inverse,
        }
    }

    fn check_len(&self, actual: usize) -> Result<(), FftError> {
        if actual != self.n_fft {
            return Err(FftError::LengthMismatch { expected: self.n_fft, actual });
        }
        Ok(())
    }

    /// Transform `buffer` in place
    pub fn process(&self, buffer: &mut [Complex64], direction: FftDirection) -> Result<(), FftError> {
        self.check_len(buffer.len())?;
        self.plan(direction).process(buffer);
        if direction == FftDirection::Inverse {
            normalize(buffer, self.n_fft);
        }
        Ok(())
    }

    /// Unnormalised forward DFT of `input`
    pub fn forward(&self, input: &[Complex64]) -> Result<Vec<Complex64>, FftError> {
        let mut buffer = input.to_vec();
        self.process(&mut buffer, FftDirection::Forward)?;
        Ok(buffer)
    }

    /// `1/N` normalised inverse DFT of `input`
    pub fn inverse(&self, input: &[Complex64]) -> Result<Vec<Complex64>, FftError> {
        let mut buffer = input.to_vec();
        self.process(&mut buffer, FftDirection::Inverse)?;
        Ok(buffer)
    }

    /// Transform every row of `batch` in place.
    ///
    /// Rows are independent, so they are spread across the rayon pool with a
    /// scratch buffer per worker thread.
    pub fn process_rows(&self, batch: &mut Array2<Complex64>, direction: FftDirection) -> Result<(), FftError> {
        self.check_len(batch.ncols())?;

        if !batch.is_standard_layout() {
            *batch = batch.as_standard_layout().into_owned();
        }

        let n_fft = self.n_fft;
        let fft = Arc::clone(self.plan(direction));
        let scratch_len = fft.get_inplace_scratch_len();
        let samples = batch.as_slice_mut().ok_or(FftError::NonContiguous)?;

        samples
            .par_chunks_mut(n_fft)
            .for_each_init(
                || vec![Complex64::zero(); scratch_len],
                |scratch, row| {
                    fft.process_with_scratch(row, scratch);
                    if direction == FftDirection::Inverse {
                        normalize(row, n_fft);
                    }
                },
            );

        Ok(())
    }
}

fn normalize(buffer: &mut [Complex64], n_fft: usize) {
    let scale = 1.0 / n_fft as f64;
    for sample in buffer.iter_mut() {
        *sample *= scale;
    }
}
