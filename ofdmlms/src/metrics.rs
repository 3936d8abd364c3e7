/// Error metrics for the SNR sweep

use ndarray::Array2;
use num_complex::Complex64;

use crate::error::{SimError, SimResult};

const STAGE: &str = "metrics";

/// One point of a performance curve
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MetricSample {
    pub snr_db: f64,
    pub mse: f64,
}

/// Append-only (SNR, MSE) curve in sweep order
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MetricCurve {
    samples: Vec<MetricSample>,
}

impl MetricCurve {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sample: MetricSample) {
        self.samples.push(sample);
    }

    pub fn samples(&self) -> &[MetricSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MetricSample> {
        self.samples.iter()
    }

    /// SNR axis, for handing to a plotting layer
    pub fn snr_values(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.snr_db).collect()
    }

    /// MSE axis, for handing to a plotting layer
    pub fn mse_values(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.mse).collect()
    }
}

impl FromIterator<MetricSample> for MetricCurve {
    fn from_iter<I: IntoIterator<Item = MetricSample>>(iter: I) -> Self {
        Self { samples: iter.into_iter().collect() }
    }
}

fn mse_over<'a, I>(pairs: I, len: usize) -> SimResult<f64>
where
    I: Iterator<Item = (&'a Complex64, &'a Complex64)>,
{
    if len == 0 {
        return Err(SimError::degenerate(STAGE, "MSE of an empty block is undefined"));
    }

    let (re_sum, im_sum) = pairs.fold((0.0, 0.0), |(re, im), (est, reference)| {
        let d = est - reference;
        (re + d.re * d.re, im + d.im * d.im)
    });

    Ok(re_sum / len as f64 + im_sum / len as f64)
}

/// MSE of the real parts plus MSE of the imaginary parts
pub fn component_mse(estimate: &[Complex64], reference: &[Complex64]) -> SimResult<f64> {
    if estimate.len() != reference.len() {
        return Err(SimError::length(STAGE, reference.len(), estimate.len()));
    }
    mse_over(estimate.iter().zip(reference), estimate.len())
}

/// `component_mse` over two grids of identical shape
pub fn grid_mse(estimate: &Array2<Complex64>, reference: &Array2<Complex64>) -> SimResult<f64> {
    if estimate.dim() != reference.dim() {
        return Err(SimError::invalid(
            STAGE,
            "shape",
            format!("estimate grid is {:?} but reference grid is {:?}", estimate.dim(), reference.dim()),
        ));
    }
    mse_over(estimate.iter().zip(reference.iter()), estimate.len())
}

/// Fraction of positions where `decoded` differs from `reference`
pub fn bit_error_rate(decoded: &[u8], reference: &[u8]) -> SimResult<f64> {
    if decoded.len() != reference.len() {
        return Err(SimError::length(STAGE, reference.len(), decoded.len()));
    }
    if reference.is_empty() {
        return Err(SimError::degenerate(STAGE, "BER of an empty block is undefined"));
    }

    let errors = decoded.iter().zip(reference).filter(|(a, b)| a != b).count();
    Ok(errors as f64 / reference.len() as f64)
}
