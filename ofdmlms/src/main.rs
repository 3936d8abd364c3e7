use anyhow::{bail, Context, Result};
use clap::Parser;
use ofdmlms::*;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ofdmlms")]
#[command(version, about = "OFDM/QPSK link with an LMS equalizer: MSE versus SNR", long_about = None)]
struct Args {
    /// Number of subcarriers (FFT size)
    #[arg(long, default_value_t = 256)]
    subcarriers: usize,

    /// Cyclic prefix length in samples
    #[arg(long, default_value_t = 16)]
    cp_len: usize,

    /// OFDM symbols per transmitted block
    #[arg(long, default_value_t = 1)]
    symbols: usize,

    /// First SNR point in dB
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    snr_start: f64,

    /// Last SNR point in dB (inclusive)
    #[arg(long, default_value_t = 30.0, allow_negative_numbers = true)]
    snr_stop: f64,

    /// SNR increment in dB
    #[arg(long, default_value_t = 5.0)]
    snr_step: f64,

    /// LMS step size μ
    #[arg(long, default_value_t = 0.01)]
    step_size: f64,

    /// LMS tap count
    #[arg(long, default_value_t = 32)]
    taps: usize,

    /// Noise draws averaged per SNR point
    #[arg(long, default_value_t = 1)]
    trials: usize,

    /// Seed for bits and noise
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Send this text instead of random bits (zero-padded to the block size)
    #[arg(short, long)]
    message: Option<String>,

    /// Enable debug logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn to_config(&self) -> Result<SimConfig> {
        let snr_db = snr_range(self.snr_start, self.snr_stop, self.snr_step)
            .context("building SNR sweep")?;

        Ok(SimConfig {
            subcarriers: self.subcarriers,
            cp_len: self.cp_len,
            symbol_count: self.symbols,
            snr_db,
            step_size: self.step_size,
            tap_count: self.taps,
            trials: self.trials,
            seed: self.seed,
        })
    }
}

fn init_logging(verbose: u8) {
    let default_level = if verbose > 0 { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn message_bits(message: &str, bit_count: usize) -> Result<BitBlock> {
    let mut bits = encode_bits(message.as_bytes());
    if bits.len() > bit_count {
        bail!(
            "message needs {} bits but one block carries {}; raise --symbols or --subcarriers",
            bits.len(),
            bit_count
        );
    }
    bits.resize(bit_count, 0);
    Ok(bits)
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = args.to_config()?;
    let experiment = Experiment::new(config.clone()).context("invalid simulation configuration")?;

    println!("=======================================================");
    println!("   OFDM / QPSK link with LMS equalizer");
    println!("=======================================================");
    println!();
    println!("Configuration:");
    println!("  - Subcarriers: {}", config.subcarriers);
    println!("  - Cyclic prefix: {} samples", config.cp_len);
    println!("  - OFDM symbols: {} ({} bits)", config.symbol_count, config.bit_count());
    println!("  - LMS: {} taps, μ = {}", config.tap_count, config.step_size);
    println!("  - Trials per SNR: {}", config.trials);
    println!("  - Seed: {}", config.seed);
    println!();

    let tx = match &args.message {
        Some(message) => {
            println!("Message: \"{}\"", message);
            experiment.transmit(message_bits(message, config.bit_count())?)?
        }
        None => experiment.random_transmission()?,
    };

    let curve = experiment.sweep(&tx).context("SNR sweep failed")?;

    println!("  SNR (dB) |        MSE");
    println!("  ---------|-------------");
    for sample in curve.iter() {
        println!("  {:>8.1} | {:>11.4e}", sample.snr_db, sample.mse);
    }
    println!();

    if let Some(best) = curve.iter().map(|s| s.snr_db).reduce(f64::max) {
        let trace = experiment.run_point(&tx, best, config.seed)?;
        println!("Raw QPSK BER before equalization at {:.1} dB: {:.4}", best, trace.raw_ber);

        if args.message.is_some() {
            let decoded = pack_bits(&demap_qpsk(&trace.received.iter().copied().collect::<Vec<_>>()));
            println!("Decoded (raw): \"{}\"", String::from_utf8_lossy(&decoded).trim_end_matches('\0'));
        }
    }

    println!("=======================================================");
    Ok(())
}
