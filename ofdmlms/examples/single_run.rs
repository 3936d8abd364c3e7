/// Single SNR run of the reference scenario
///
/// Nc = 256, CP = 16, one OFDM symbol, 20 dB, μ = 0.01, 32 taps.
/// Prints the arrays a plotting front end would receive.

use ofdmlms::{Experiment, SimConfig};

fn main() {
    let config = SimConfig {
        snr_db: vec![20.0],
        ..Default::default()
    };

    let experiment = match Experiment::new(config) {
        Ok(e) => e,
        Err(e) => {
            eprintln!("Configuration rejected: {}", e);
            return;
        }
    };

    let tx = match experiment.random_transmission() {
        Ok(tx) => tx,
        Err(e) => {
            eprintln!("Transmit failed: {}", e);
            return;
        }
    };

    let trace = match experiment.run_point(&tx, 20.0, 7) {
        Ok(trace) => trace,
        Err(e) => {
            eprintln!("Receive failed: {}", e);
            return;
        }
    };

    println!("Transmitted frame: {} samples", tx.frames.len());
    println!("  first 4: {:?}", tx.frames.iter().take(4).collect::<Vec<_>>());
    println!();
    println!("Received spectrum: {} bins", trace.received.len());
    println!("  first 4: {:?}", trace.received.iter().take(4).collect::<Vec<_>>());
    println!();

    let tap_count = experiment.config().tap_count;
    println!("Equalized block: {} samples ({} leading zeros)", trace.equalized.len(), tap_count);
    println!(
        "  around the first full window: {:?}",
        trace.equalized.iter().skip(tap_count - 1).take(3).collect::<Vec<_>>()
    );
    println!();
    println!("MSE vs transmitted symbols: {:.4e}", trace.mse);
    println!("Raw BER before equalization: {:.4}", trace.raw_ber);
}
