/// Testing utilities
///
/// Assertion helpers for complex sample buffers, shared by the unit tests of
/// every stage and usable from downstream crates.

use num_complex::Complex64;

/// Assert two complex buffers match element-wise within `epsilon`
pub fn assert_complex_approx_eq(
    a: &[Complex64],
    b: &[Complex64],
    epsilon: f64,
    msg: &str,
) {
    assert_eq!(a.len(), b.len(), "{}: length {} != {}", msg, a.len(), b.len());

    let (worst_idx, max_diff) = a
        .iter()
        .zip(b)
        .map(|(x, y)| (x - y).norm())
        .enumerate()
        .fold((0, 0.0f64), |acc, (i, d)| if d > acc.1 { (i, d) } else { acc });

    assert!(
        max_diff < epsilon,
        "{}: max difference {:.3e} at index {} >= epsilon {:.3e}",
        msg,
        max_diff,
        worst_idx,
        epsilon
    );
}

/// Validate that `inverse_fn(forward_fn(x)) ≈ x`
pub fn validate_roundtrip<F, G>(
    original: &[Complex64],
    forward_fn: F,
    inverse_fn: G,
    epsilon: f64,
    name: &str,
) where
    F: Fn(&[Complex64]) -> Vec<Complex64>,
    G: Fn(&[Complex64]) -> Vec<Complex64>,
{
    let transformed = forward_fn(original);
    let recovered = inverse_fn(&transformed);

    assert_complex_approx_eq(
        original,
        &recovered,
        epsilon,
        &format!("{} round-trip failed", name),
    );
}

/// Assert every sample has finite real and imaginary parts
pub fn assert_all_finite<'a, I>(samples: I, msg: &str)
where
    I: IntoIterator<Item = &'a Complex64>,
{
    for (i, s) in samples.into_iter().enumerate() {
        assert!(s.re.is_finite() && s.im.is_finite(), "{}: sample {} is {}", msg, i, s);
    }
}
