/// QPSK Mapper
///
/// Bit pair (b0, b1) maps to `(2·b0 − 1) + j·(2·b1 − 1)`:
///
/// | bits | symbol  |
/// |------|---------|
/// | 00   | -1 - 1j |
/// | 01   | -1 + 1j |
/// | 10   |  1 - 1j |
/// | 11   |  1 + 1j |

use num_complex::Complex64;

use crate::config::BITS_PER_SYMBOL;
use crate::error::{SimError, SimResult};

const STAGE: &str = "qpsk";

fn level(bit: u8) -> f64 {
    2.0 * bit as f64 - 1.0
}

/// Map an even-length bit block onto QPSK symbols
pub fn map_qpsk(bits: &[u8]) -> SimResult<Vec<Complex64>> {
    if bits.len() % BITS_PER_SYMBOL != 0 {
        return Err(SimError::invalid(
            STAGE,
            "bits",
            format!("length {} is not a multiple of {}", bits.len(), BITS_PER_SYMBOL),
        ));
    }
    if let Some(pos) = bits.iter().position(|&bit| bit > 1) {
        return Err(SimError::invalid(
            STAGE,
            "bits",
            format!("value {} at index {} is not binary", bits[pos], pos),
        ));
    }

    Ok(bits
        .chunks_exact(BITS_PER_SYMBOL)
        .map(|pair| Complex64::new(level(pair[0]), level(pair[1])))
        .collect())
}

/// Hard-decision demapper: non-negative component → 1, negative → 0
pub fn demap_qpsk(symbols: &[Complex64]) -> Vec<u8> {
    symbols
        .iter()
        .flat_map(|s| [(s.re >= 0.0) as u8, (s.im >= 0.0) as u8])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bits::BitSource;

    #[test]
    fn test_mapping_table() {
        let symbols = map_qpsk(&[0, 0, 0, 1, 1, 0, 1, 1]).unwrap();

        assert_eq!(
            symbols,
            vec![
                Complex64::new(-1.0, -1.0),
                Complex64::new(-1.0, 1.0),
                Complex64::new(1.0, -1.0),
                Complex64::new(1.0, 1.0),
            ]
        );
    }

    #[test]
    fn test_output_is_half_length_unit_grid() {
        let bits = BitSource::from_seed(3).generate(512);
        let symbols = map_qpsk(&bits).unwrap();

        assert_eq!(symbols.len(), 256);
        for s in &symbols {
            assert!(s.re.abs() == 1.0 && s.im.abs() == 1.0);
        }
    }

    #[test]
    fn test_rejects_odd_length() {
        let err = map_qpsk(&[1, 0, 1]).unwrap_err();
        assert!(matches!(err, SimError::InvalidConfig { stage: "qpsk", param: "bits", .. }));
    }

    #[test]
    fn test_rejects_non_binary() {
        let err = map_qpsk(&[1, 0, 2, 1]).unwrap_err();
        assert!(err.to_string().contains("index 2"));
    }

    #[test]
    fn test_empty_block_maps_to_nothing() {
        assert!(map_qpsk(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_demap_inverts_mapping() {
        let bits = BitSource::from_seed(11).generate(200);
        let symbols = map_qpsk(&bits).unwrap();
        assert_eq!(demap_qpsk(&symbols), bits);

        let noisy: Vec<Complex64> = symbols.iter().map(|s| *s * 0.3 + Complex64::new(0.1, -0.1)).collect();
        assert_eq!(demap_qpsk(&noisy), bits);
    }
}
