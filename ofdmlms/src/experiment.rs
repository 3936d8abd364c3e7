/// Experiment Driver
///
/// Builds one transmitted block, then for every SNR point runs
/// Noise Channel → Framer (receive) → LMS Equalizer and scores the equalized
/// grid against the original QPSK symbols.
///
/// Sweep points are independent: each one gets its own channel seeded from
/// `(seed, point, trial)`, so the parallel sweep is reproducible.

use ndarray::Array2;
use num_complex::Complex64;
use rayon::prelude::*;

use crate::bits::{BitBlock, BitSource};
use crate::channel::AwgnChannel;
use crate::config::SimConfig;
use crate::equalizer::LmsEqualizer;
use crate::error::{SimError, SimResult};
use crate::framer::{to_grid, Framer};
use crate::metrics::{bit_error_rate, grid_mse, MetricCurve, MetricSample};
use crate::qpsk::{demap_qpsk, map_qpsk};

/// The fixed transmit side of an experiment
#[derive(Clone, Debug)]
pub struct Transmission {
    pub bits: BitBlock,
    /// QPSK symbols, `symbol_count × Nc`
    pub symbols: Array2<Complex64>,
    /// Framed time-domain samples, `symbol_count × (Nc + CP)`
    pub frames: Array2<Complex64>,
}

/// Receive-side arrays for one noise draw
#[derive(Clone, Debug)]
pub struct RunTrace {
    pub snr_db: f64,
    /// Deframed frequency-domain grid
    pub received: Array2<Complex64>,
    /// LMS output grid
    pub equalized: Array2<Complex64>,
    pub mse: f64,
    /// Hard-decision BER of `received`, before equalization
    pub raw_ber: f64,
}

/// Output of a full sweep
#[derive(Clone, Debug)]
pub struct SweepReport {
    pub transmission: Transmission,
    pub curve: MetricCurve,
}

/// Noise seed for one trial of one sweep point
fn point_seed(seed: u64, point: usize, trial: usize) -> u64 {
    seed.wrapping_mul(0x9E37_79B9_7F4A_7C15)
        .wrapping_add(((point as u64) << 32) | trial as u64)
        .wrapping_add(1)
}

pub struct Experiment {
    config: SimConfig,
    framer: Framer,
    equalizer: LmsEqualizer,
}

impl Experiment {
    pub fn new(config: SimConfig) -> SimResult<Self> {
        config.validate()?;

        let framer = Framer::from_config(&config)?;
        let equalizer = LmsEqualizer::from_config(&config)?;

        Ok(Self { config, framer, equalizer })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn framer(&self) -> &Framer {
        &self.framer
    }

    pub fn equalizer(&self) -> &LmsEqualizer {
        &self.equalizer
    }

    /// Map and frame a payload of exactly `bit_count()` bits
    pub fn transmit(&self, bits: BitBlock) -> SimResult<Transmission> {
        if bits.len() != self.config.bit_count() {
            return Err(SimError::length("experiment", self.config.bit_count(), bits.len()));
        }

        let symbols = to_grid(&map_qpsk(&bits)?, self.config.subcarriers)?;
        let frames = self.framer.modulate_batch(&symbols)?;

        log::debug!(
            "[experiment] {} bits -> {} OFDM symbols -> {} samples",
            bits.len(),
            symbols.nrows(),
            frames.len()
        );

        Ok(Transmission { bits, symbols, frames })
    }

    /// Transmit a random payload drawn from the configured seed
    pub fn random_transmission(&self) -> SimResult<Transmission> {
        let bits = BitSource::from_seed(self.config.seed).block(&self.config);
        self.transmit(bits)
    }

    /// One noise draw at `snr_db` through the receive chain
    pub fn run_point(&self, tx: &Transmission, snr_db: f64, seed: u64) -> SimResult<RunTrace> {
        let noisy = AwgnChannel::from_seed(seed).apply_batch(&tx.frames, snr_db)?;
        let received = self.framer.demodulate_batch(&noisy)?;
        let equalized = self.equalizer.equalize_batch(&received)?;

        let mse = grid_mse(&equalized, &tx.symbols)?;
        if !mse.is_finite() {
            log::warn!("[experiment] non-finite MSE at {} dB (seed {})", snr_db, seed);
            return Err(SimError::degenerate(
                "experiment",
                format!("non-finite MSE at {} dB (μ={} diverged)", snr_db, self.config.step_size),
            ));
        }

        let received_flat: Vec<Complex64> = received.iter().copied().collect();
        let raw_ber = bit_error_rate(&demap_qpsk(&received_flat), &tx.bits)?;

        Ok(RunTrace { snr_db, received, equalized, mse, raw_ber })
    }

    /// Trial-averaged MSE for every configured SNR, in configuration order
    pub fn sweep(&self, tx: &Transmission) -> SimResult<MetricCurve> {
        let trials = self.config.trials;

        let points = self
            .config
            .snr_db
            .par_iter()
            .enumerate()
            .map(|(point, &snr_db)| -> SimResult<MetricSample> {
                let mut total = 0.0;
                for trial in 0..trials {
                    let seed = point_seed(self.config.seed, point, trial);
                    total += self.run_point(tx, snr_db, seed)?.mse;
                }
                let mse = total / trials as f64;

                log::debug!("[experiment] {:>6.1} dB: MSE {:.4e} over {} trials", snr_db, mse, trials);
                Ok(MetricSample { snr_db, mse })
            })
            .collect::<SimResult<Vec<_>>>()?;

        Ok(points.into_iter().collect())
    }

    /// Random transmission followed by the full sweep
    pub fn run(&self) -> SimResult<SweepReport> {
        let transmission = self.random_transmission()?;
        let curve = self.sweep(&transmission)?;

        log::info!(
            "[experiment] swept {} SNR points (Nc={}, CP={}, M={}, μ={})",
            curve.len(),
            self.config.subcarriers,
            self.config.cp_len,
            self.config.tap_count,
            self.config.step_size
        );

        Ok(SweepReport { transmission, curve })
    }
}
