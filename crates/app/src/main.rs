//! huffpress: command-line Huffman compressor.
//!
//! `compress` and `decompress` work on files; `demo` round-trips generated
//! data in memory. Each run prints a metrics summary unless `--no-metrics`.

mod config;
mod input_gen;

use std::process::ExitCode;

use anyhow::{ensure, Context, Result};
use clap::Parser;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use huffpress_core::metrics::Metrics;
use huffpress_core::tree_codec::description_bits;
use huffpress_core::{
    compress, compress_file, decompress, decompress_file, EncodingTable, FrequencyTable,
    HuffmanTree,
};

use config::{Cli, Config, Mode};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match Config::from_cli(cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("huffpress: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if config.print_config {
        config.print();
    }

    match run(&config) {
        Ok(metrics) => {
            if config.print_metrics {
                metrics.print_summary();
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("run failed: {:#}", e);
            eprintln!("huffpress: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Install the fmt subscriber on stderr. `RUST_LOG` overrides `-v`.
fn init_logging(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(config: &Config) -> Result<Metrics> {
    let mut metrics = Metrics::new();

    match &config.mode {
        Mode::Compress { input, output } => {
            info!(input = %input.display(), output = %output.display(), "compressing");
            let stats = compress_file(input, output)
                .with_context(|| format!("failed to compress {}", input.display()))?;
            metrics.record_compress(&stats);
        }
        Mode::Decompress { input, output } => {
            info!(input = %input.display(), output = %output.display(), "decompressing");
            let stats = decompress_file(input, output)
                .with_context(|| format!("failed to decompress {}", input.display()))?;
            metrics.record_decompress(&stats);
        }
        Mode::Demo { seed, size_bytes } => {
            info!(seed, size_bytes, "running demo");
            let data = input_gen::generate_sample_data(*seed, *size_bytes);

            let frequencies = FrequencyTable::from_bytes(&data);
            let tree =
                HuffmanTree::from_frequencies(&frequencies).context("failed to build tree")?;
            let expected_header = description_bits(&tree);
            let expected_payload = EncodingTable::from_tree(&tree).payload_bits(&frequencies);
            info!(
                symbols = tree.leaf_count(),
                depth = tree.depth(),
                header_bits = expected_header,
                payload_bits = expected_payload,
                "built tree"
            );

            let mut packed = Vec::new();
            let stats = compress(&tree, &data[..], &mut packed).context("compression failed")?;
            metrics.record_compress(&stats);
            ensure!(
                stats.header_bits == expected_header && stats.payload_bits == expected_payload,
                "encoder wrote {}+{} bits, tree predicts {}+{}",
                stats.header_bits,
                stats.payload_bits,
                expected_header,
                expected_payload
            );

            let mut restored = Vec::with_capacity(data.len());
            let stats = decompress(&packed[..], &mut restored).context("decompression failed")?;
            metrics.record_decompress(&stats);

            ensure!(
                restored == data,
                "round trip mismatch: {} bytes in, {} bytes out",
                data.len(),
                restored.len()
            );
        }
    }

    metrics.complete();
    debug!("metrics\n{}", metrics.export_text());
    Ok(metrics)
}
