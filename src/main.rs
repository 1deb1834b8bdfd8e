//! Command-line entry point for the density evaluation harness.
//!
//! Usage:
//! ```text
//! mammo-density histogram
//! mammo-density cnn --device-type gpu --gpu-number 1
//! mammo-density histogram --bins-histogram 100 --model-path weights/hist.onnx
//! ```

use clap::Parser;
use mammo_density::core::config::{DEFAULT_DATA_ROOT, DEFAULT_HISTOGRAM_BINS};
use mammo_density::core::{init_tracing, DeviceKind, EvalConfig, ModelKind};
use mammo_density::eval::Evaluator;
use mammo_density::models::build_scorer;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::info;

/// Command-line arguments for the evaluation harness.
#[derive(Parser)]
#[command(name = "mammo-density")]
#[command(about = "Evaluate a breast-density model over a directory of mammogram cases")]
struct Args {
    /// Model variant to evaluate ('cnn' or 'histogram')
    #[arg(value_parser = ModelKind::from_str)]
    model_type: ModelKind,

    /// Number of histogram bins per view (histogram variant only)
    #[arg(long, default_value_t = DEFAULT_HISTOGRAM_BINS)]
    bins_histogram: usize,

    /// Path to the ONNX weights (defaults to the variant's saved_models path)
    #[arg(long)]
    model_path: Option<PathBuf>,

    /// Compute device ('cpu' or 'gpu')
    #[arg(long, default_value = "cpu", value_parser = DeviceKind::from_str)]
    device_type: DeviceKind,

    /// CUDA device index, used with --device-type gpu
    #[arg(long, default_value_t = 0)]
    gpu_number: i32,

    /// Root directory containing one subdirectory per case
    #[arg(long, default_value = DEFAULT_DATA_ROOT)]
    data_root: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let args = Args::parse();

    let mut config = EvalConfig::new(args.model_type)
        .with_device(args.device_type)
        .with_gpu_number(args.gpu_number)
        .with_bins(args.bins_histogram)
        .with_data_root(args.data_root);
    if let Some(path) = args.model_path {
        config = config.with_model_path(path);
    }
    config.validate()?;

    let scorer = build_scorer(&config)?;
    let evaluator = Evaluator::new(scorer);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let stats = evaluator.evaluate(config.data_root(), &mut out)?;
    info!(cases = stats.len(), "scan complete");
    stats.write_summary(&mut out)?;

    Ok(())
}
