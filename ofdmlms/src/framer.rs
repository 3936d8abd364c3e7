/// Multicarrier Framer
///
/// Transmit: `Nc`-point inverse DFT of one symbol per subcarrier, then the
/// last `CP` samples of that body are prepended as the cyclic prefix.
/// Receive: drop the first `CP` samples and take the `Nc`-point forward DFT.
///
/// The inverse transform is `1/N` normalised and the forward one is not, so
/// a noiseless frame/deframe pass returns the original symbols.

use fft_cpu::{BatchFft, FftDirection};
use ndarray::{s, Array2};
use num_complex::Complex64;

use crate::config::SimConfig;
use crate::error::{SimError, SimResult};

const STAGE: &str = "framer";

/// OFDM framer for a fixed subcarrier count and prefix length
#[derive(Clone, Debug)]
pub struct Framer {
    subcarriers: usize,
    cp_len: usize,
    fft: BatchFft,
}

impl Framer {
    pub fn new(subcarriers: usize, cp_len: usize) -> SimResult<Self> {
        if subcarriers == 0 {
            return Err(SimError::invalid(STAGE, "subcarriers", "must be greater than zero"));
        }
        if cp_len >= subcarriers {
            return Err(SimError::invalid(
                STAGE,
                "cp_len",
                format!("{} must be less than subcarriers {}", cp_len, subcarriers),
            ));
        }

        Ok(Self {
            subcarriers,
            cp_len,
            fft: BatchFft::new(subcarriers)?,
        })
    }

    pub fn from_config(config: &SimConfig) -> SimResult<Self> {
        Self::new(config.subcarriers, config.cp_len)
    }

    pub fn subcarriers(&self) -> usize {
        self.subcarriers
    }

    pub fn cp_len(&self) -> usize {
        self.cp_len
    }

    /// Samples per framed OFDM symbol
    pub fn frame_len(&self) -> usize {
        self.subcarriers + self.cp_len
    }

    /// Frame one OFDM symbol: IDFT body with its own tail as prefix
    pub fn modulate(&self, symbols: &[Complex64]) -> SimResult<Vec<Complex64>> {
        if symbols.len() != self.subcarriers {
            return Err(SimError::length(STAGE, self.subcarriers, symbols.len()));
        }

        let body = self.fft.inverse(symbols)?;

        let mut frame = Vec::with_capacity(self.frame_len());
        frame.extend_from_slice(&body[self.subcarriers - self.cp_len..]);
        frame.extend_from_slice(&body);
        Ok(frame)
    }

    /// Strip the prefix of one received frame and return its spectrum
    pub fn demodulate(&self, frame: &[Complex64]) -> SimResult<Vec<Complex64>> {
        if frame.len() != self.frame_len() {
            return Err(SimError::length(STAGE, self.frame_len(), frame.len()));
        }

        Ok(self.fft.forward(&frame[self.cp_len..])?)
    }

    /// Frame every row of a `symbols × Nc` grid into `symbols × (Nc + CP)`
    pub fn modulate_batch(&self, grid: &Array2<Complex64>) -> SimResult<Array2<Complex64>> {
        if grid.ncols() != self.subcarriers {
            return Err(SimError::length(STAGE, self.subcarriers, grid.ncols()));
        }

        let mut body = grid.to_owned();
        self.fft.process_rows(&mut body, FftDirection::Inverse)?;

        let nc = self.subcarriers;
        let cp = self.cp_len;
        let mut frames = Array2::<Complex64>::zeros((grid.nrows(), self.frame_len()));
        frames.slice_mut(s![.., ..cp]).assign(&body.slice(s![.., nc - cp..]));
        frames.slice_mut(s![.., cp..]).assign(&body);

        log::debug!("[framer] framed {} OFDM symbols of {} samples", frames.nrows(), frames.ncols());
        Ok(frames)
    }

    /// Deframe every row of a `symbols × (Nc + CP)` batch into `symbols × Nc`
    pub fn demodulate_batch(&self, frames: &Array2<Complex64>) -> SimResult<Array2<Complex64>> {
        if frames.ncols() != self.frame_len() {
            return Err(SimError::length(STAGE, self.frame_len(), frames.ncols()));
        }

        let mut spectrum = frames.slice(s![.., self.cp_len..]).to_owned();
        self.fft.process_rows(&mut spectrum, FftDirection::Forward)?;
        Ok(spectrum)
    }
}

/// Reshape a flat symbol block into one row per OFDM symbol
pub fn to_grid(symbols: &[Complex64], subcarriers: usize) -> SimResult<Array2<Complex64>> {
    if subcarriers == 0 {
        return Err(SimError::invalid(STAGE, "subcarriers", "must be greater than zero"));
    }
    if symbols.is_empty() || symbols.len() % subcarriers != 0 {
        return Err(SimError::invalid(
            STAGE,
            "symbols",
            format!("length {} is not a positive multiple of {}", symbols.len(), subcarriers),
        ));
    }

    Array2::from_shape_vec((symbols.len() / subcarriers, subcarriers), symbols.to_vec())
        .map_err(|e| SimError::degenerate(STAGE, e.to_string()))
}
