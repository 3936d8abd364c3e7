/// Simulation configuration
///
/// All parameters that drive one experiment live here and are handed to each
/// stage explicitly, so independent sweep points never share ambient state.

use crate::error::{SimError, SimResult};

/// QPSK carries two bits per complex symbol
pub const BITS_PER_SYMBOL: usize = 2;

/// Largest number of points `snr_range` will build
pub const MAX_SNR_POINTS: usize = 100_000;

/// Parameters of one OFDM/LMS experiment
#[derive(Clone, Debug, PartialEq)]
pub struct SimConfig {
    /// Number of subcarriers `Nc` (transform size)
    pub subcarriers: usize,

    /// Cyclic prefix length `CP`, must be below `Nc`
    pub cp_len: usize,

    /// Number of OFDM symbols in the transmitted block
    pub symbol_count: usize,

    /// SNR sweep points in dB, processed in this order
    pub snr_db: Vec<f64>,

    /// LMS step size `μ`
    pub step_size: f64,

    /// LMS tap count `M`, must be below `Nc`
    pub tap_count: usize,

    /// Independent noise draws averaged per SNR point
    pub trials: usize,

    /// Seed for the bit source; noise seeds are derived from it
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            subcarriers: 256,
            cp_len: 16,
            symbol_count: 1,
            snr_db: vec![0.0, 5.0, 10.0, 15.0, 20.0, 25.0, 30.0],
            step_size: 0.01,
            tap_count: 32,
            trials: 1,
            seed: 42,
        }
    }
}

impl SimConfig {
    /// Payload size in bits: `Nc × 2 × symbol_count`
    pub fn bit_count(&self) -> usize {
        self.subcarriers * BITS_PER_SYMBOL * self.symbol_count
    }

    /// Time-domain samples per OFDM symbol including the prefix
    pub fn frame_len(&self) -> usize {
        self.subcarriers + self.cp_len
    }

    /// Reject any parameter outside its domain. Nothing is clamped.
    pub fn validate(&self) -> SimResult<()> {
        const STAGE: &str = "config";

        if self.subcarriers == 0 {
            return Err(SimError::invalid(STAGE, "subcarriers", "must be greater than zero"));
        }
        if self.cp_len >= self.subcarriers {
            return Err(SimError::invalid(
                STAGE,
                "cp_len",
                format!("{} must be less than subcarriers {}", self.cp_len, self.subcarriers),
            ));
        }
        if self.symbol_count == 0 {
            return Err(SimError::invalid(STAGE, "symbol_count", "must be greater than zero"));
        }
        if self.tap_count == 0 {
            return Err(SimError::invalid(STAGE, "tap_count", "must be greater than zero"));
        }
        if self.tap_count >= self.subcarriers {
            return Err(SimError::invalid(
                STAGE,
                "tap_count",
                format!("{} must be less than subcarriers {}", self.tap_count, self.subcarriers),
            ));
        }
        if !(self.step_size.is_finite() && self.step_size > 0.0) {
            return Err(SimError::invalid(
                STAGE,
                "step_size",
                format!("must be positive and finite, got {}", self.step_size),
            ));
        }
        if self.trials == 0 {
            return Err(SimError::invalid(STAGE, "trials", "must be greater than zero"));
        }
        if let Some(bad) = self.snr_db.iter().find(|snr| !snr.is_finite()) {
            return Err(SimError::invalid(STAGE, "snr_db", format!("entries must be finite, got {}", bad)));
        }

        Ok(())
    }
}

/// Inclusive SNR sweep `start, start + step, ..., <= stop`
pub fn snr_range(start: f64, stop: f64, step: f64) -> SimResult<Vec<f64>> {
    const STAGE: &str = "config";

    if !(start.is_finite() && stop.is_finite()) {
        return Err(SimError::invalid(STAGE, "snr_db", format!("bounds must be finite, got {}..{}", start, stop)));
    }
    if !(step.is_finite() && step > 0.0) {
        return Err(SimError::invalid(STAGE, "snr_step", format!("must be positive, got {}", step)));
    }

    // Index-based so float accumulation never drops the last point
    let count = ((stop - start) / step + 1e-9).floor();
    if count < 0.0 {
        return Ok(Vec::new());
    }
    if !(count < MAX_SNR_POINTS as f64) {
        return Err(SimError::invalid(
            STAGE,
            "snr_step",
            format!("{} dB steps over {}..{} exceed {} points", step, start, stop, MAX_SNR_POINTS),
        ));
    }

    Ok((0..=count as usize).map(|i| start + i as f64 * step).collect())
}
