//! Batched CPU FFT
//!
//! Plans a fixed-size transform pair once with `rustfft` and applies it to
//! single buffers or to every row of an `ndarray` batch in parallel.

pub mod batch_fft;

pub use batch_fft::{BatchFft, FftError};
pub use num_complex::Complex64;
pub use rustfft::FftDirection;
