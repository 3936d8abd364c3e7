//! OFDMLMS - OFDM link simulator with an adaptive LMS equalizer
//!
//! Random bits are QPSK mapped, framed into OFDM symbols with a cyclic
//! prefix, passed through an AWGN channel at a requested SNR, deframed, and
//! equalized by a sample-by-sample complex LMS filter. The experiment driver
//! sweeps SNR and reports the MSE between the equalizer output and the
//! transmitted symbols.
//!
//! Plotting is left to the caller: every stage hands back plain sample arrays
//! and the sweep returns an ordered (SNR, MSE) curve.

pub mod error;
pub mod config;
pub mod bits;
pub mod qpsk;
pub mod framer;
pub mod channel;
pub mod equalizer;
pub mod metrics;
pub mod experiment;
pub mod test_utils;

pub use error::{SimError, SimResult};
pub use config::{SimConfig, BITS_PER_SYMBOL, MAX_SNR_POINTS, snr_range};
pub use bits::{BitBlock, BitSource, encode_bits, pack_bits};
pub use qpsk::{map_qpsk, demap_qpsk};
pub use framer::{Framer, to_grid};
pub use channel::{AwgnChannel, mean_power, noise_variance};
pub use equalizer::{LmsEqualizer, LmsRun};
pub use metrics::{MetricSample, MetricCurve, component_mse, grid_mse, bit_error_rate};
pub use experiment::{Experiment, Transmission, RunTrace, SweepReport};
pub use test_utils::{assert_complex_approx_eq, validate_roundtrip, assert_all_finite};
