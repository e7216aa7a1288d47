//! Metrics collection and reporting for compression runs.
//!
//! Tracks what a compress or decompress run consumed and produced:
//! - Throughput (bytes in/out)
//! - Compression ratio
//! - Header vs payload split
//! - Timing
//!
//! # Thread Safety
//!
//! `Metrics` is a plain struct updated by the single thread driving a run.
//! Independent runs each keep their own.

use std::time::{Duration, Instant};

use crate::codec::{CompressStats, DecompressStats};

/// Counters and timing for one or more codec runs.
#[derive(Debug, Clone)]
pub struct Metrics {
    // === Timing ===
    /// When the run started
    pub start_time: Instant,

    /// When the run ended (set on completion)
    pub end_time: Option<Instant>,

    // === Input/Output ===
    /// Uncompressed bytes read by the encoder
    pub raw_bytes_in: u64,

    /// Compressed bytes written by the encoder
    pub compressed_bytes_out: u64,

    /// Compressed bytes read by the decoder
    pub compressed_bytes_in: u64,

    /// Uncompressed bytes written by the decoder
    pub raw_bytes_out: u64,

    // === Bitstream ===
    /// Tree description bits written or read
    pub header_bits: u64,

    /// Codeword bits written or read, end-of-message included
    pub payload_bits: u64,

    /// Leaves in the most recent tree
    pub symbols: usize,

    // === Counts ===
    /// Completed compress calls
    pub streams_compressed: u64,

    /// Completed decompress calls
    pub streams_decompressed: u64,
}

impl Metrics {
    /// Create new metrics with start time set to now.
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            end_time: None,
            raw_bytes_in: 0,
            compressed_bytes_out: 0,
            compressed_bytes_in: 0,
            raw_bytes_out: 0,
            header_bits: 0,
            payload_bits: 0,
            symbols: 0,
            streams_compressed: 0,
            streams_decompressed: 0,
        }
    }

    pub fn record_compress(&mut self, stats: &CompressStats) {
        self.raw_bytes_in += stats.input_bytes;
        self.compressed_bytes_out += stats.output_bytes;
        self.header_bits += stats.header_bits;
        self.payload_bits += stats.payload_bits;
        self.symbols = stats.symbols;
        self.streams_compressed += 1;
    }

    pub fn record_decompress(&mut self, stats: &DecompressStats) {
        self.compressed_bytes_in += stats.input_bytes;
        self.raw_bytes_out += stats.output_bytes;
        // A round trip would otherwise count the same bits twice
        if self.streams_compressed == 0 {
            self.header_bits += stats.header_bits;
            self.payload_bits += stats.payload_bits;
        }
        self.symbols = stats.symbols;
        self.streams_decompressed += 1;
    }

    /// Mark the run as complete.
    pub fn complete(&mut self) {
        self.end_time = Some(Instant::now());
    }

    /// Get total duration (or current elapsed if not complete).
    pub fn duration(&self) -> Duration {
        match self.end_time {
            Some(end) => end.duration_since(self.start_time),
            None => self.start_time.elapsed(),
        }
    }

    fn raw_bytes(&self) -> u64 {
        self.raw_bytes_in.max(self.raw_bytes_out)
    }

    fn compressed_bytes(&self) -> u64 {
        self.compressed_bytes_out.max(self.compressed_bytes_in)
    }

    /// Compression ratio (compressed / raw).
    ///
    /// Returns 0.0 if nothing was processed.
    pub fn compression_ratio(&self) -> f64 {
        let raw = self.raw_bytes();
        if raw == 0 {
            0.0
        } else {
            self.compressed_bytes() as f64 / raw as f64
        }
    }

    /// Average payload bits per raw byte (end-of-message included).
    pub fn bits_per_byte(&self) -> f64 {
        let raw = self.raw_bytes();
        if raw == 0 {
            0.0
        } else {
            self.payload_bits as f64 / raw as f64
        }
    }

    /// Raw bytes processed per second.
    pub fn throughput_bps(&self) -> f64 {
        let duration_secs = self.duration().as_secs_f64();
        if duration_secs == 0.0 {
            0.0
        } else {
            self.raw_bytes() as f64 / duration_secs
        }
    }

    /// True if every decompressed stream produced as many bytes as were
    /// compressed. Vacuously true for one-directional runs.
    pub fn sizes_match(&self) -> bool {
        self.streams_compressed == 0
            || self.streams_decompressed == 0
            || self.raw_bytes_in == self.raw_bytes_out
    }

    /// Print a human-readable summary to stdout.
    pub fn print_summary(&self) {
        println!("\n=== Summary ===");
        println!("Duration: {} ms", self.duration().as_millis());
        println!();

        println!(
            "Raw:        {} bytes ({:.2} MiB)",
            self.raw_bytes(),
            self.raw_bytes() as f64 / 1024.0 / 1024.0
        );
        println!(
            "Compressed: {} bytes ({:.2} MiB)",
            self.compressed_bytes(),
            self.compressed_bytes() as f64 / 1024.0 / 1024.0
        );
        println!("Ratio: {:.1}%", self.compression_ratio() * 100.0);
        println!();

        println!("=== Bitstream ===");
        println!("Symbols: {}", self.symbols);
        println!("Tree header: {} bits", self.header_bits);
        println!(
            "Payload: {} bits ({:.3} bits/byte)",
            self.payload_bits,
            self.bits_per_byte()
        );
        println!();

        if self.streams_compressed > 0 && self.streams_decompressed > 0 {
            if self.sizes_match() {
                println!("Verification: PASSED ✓");
            } else {
                println!(
                    "Verification: FAILED ✗ ({} != {})",
                    self.raw_bytes_in, self.raw_bytes_out
                );
            }
            println!();
        }

        println!("=== Performance ===");
        println!("Throughput: {:.2} MB/s", self.throughput_bps() / 1_000_000.0);
        println!();
    }

    /// Export metrics as a simple text format (for parsing/testing).
    pub fn export_text(&self) -> String {
        format!(
            "duration_ms={}\n\
             raw_bytes_in={}\n\
             compressed_bytes_out={}\n\
             compressed_bytes_in={}\n\
             raw_bytes_out={}\n\
             header_bits={}\n\
             payload_bits={}\n\
             symbols={}\n\
             compression_ratio={:.4}\n",
            self.duration().as_millis(),
            self.raw_bytes_in,
            self.compressed_bytes_out,
            self.compressed_bytes_in,
            self.raw_bytes_out,
            self.header_bits,
            self.payload_bits,
            self.symbols,
            self.compression_ratio(),
        )
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
