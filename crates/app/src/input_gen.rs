//! Sample input generation for the demo.
//!
//! Generated data mixes sections with very different symbol distributions,
//! so the demo shows how the tree adapts:
//! - Skewed text (English-like letter frequencies): short codes for common letters
//! - Runs of one byte: a near one-bit code
//! - Small-alphabet patterns: a handful of mid-length codes
//! - Uniform random bytes: roughly eight bits each, nothing to gain
//!
//! Everything is driven by a seeded ChaCha RNG, so a seed reproduces a run.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Letters weighted roughly by English frequency, with space and punctuation.
#[rustfmt::skip]
const TEXT_WEIGHTS: &[(u8, u32)] = &[
    (b' ', 18), (b'e', 12), (b't', 9), (b'a', 8), (b'o', 8), (b'i', 7),
    (b'n', 7), (b's', 6), (b'h', 6), (b'r', 6), (b'd', 4), (b'l', 4),
    (b'u', 3), (b'c', 3), (b'm', 2), (b'w', 2), (b'f', 2), (b'g', 2),
    (b'y', 2), (b'p', 2), (b'b', 1), (b'.', 1), (b',', 1), (b'\n', 1),
    (b'v', 1), (b'k', 1),
];

/// Section length upper bound.
const SECTION_BYTES: usize = 4096;

/// Generate `size_bytes` of mixed sample data from `seed`.
pub fn generate_sample_data(seed: u64, size_bytes: usize) -> Vec<u8> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut data = Vec::with_capacity(size_bytes);
    let text_total: u32 = TEXT_WEIGHTS.iter().map(|(_, w)| w).sum();

    while data.len() < size_bytes {
        let section = (size_bytes - data.len()).min(rng.gen_range(256..=SECTION_BYTES));

        match rng.gen_range(0..10u8) {
            // 50% skewed text
            0..=4 => {
                for _ in 0..section {
                    data.push(pick_weighted(&mut rng, text_total));
                }
            }

            // 20% runs of a single byte
            5..=6 => {
                let byte: u8 = rng.gen();
                data.extend(std::iter::repeat(byte).take(section));
            }

            // 20% repeating pattern over a small alphabet
            7..=8 => {
                let pattern = generate_pattern(&mut rng);
                data.extend(pattern.iter().cycle().take(section));
            }

            // 10% uniform random bytes
            _ => {
                for _ in 0..section {
                    data.push(rng.gen());
                }
            }
        }
    }

    data
}

fn pick_weighted(rng: &mut ChaCha8Rng, total: u32) -> u8 {
    let mut roll = rng.gen_range(0..total);
    for &(byte, weight) in TEXT_WEIGHTS {
        if roll < weight {
            return byte;
        }
        roll -= weight;
    }
    b' '
}

/// A short pattern drawn from at most eight distinct bytes.
fn generate_pattern(rng: &mut ChaCha8Rng) -> Vec<u8> {
    let alphabet: Vec<u8> = (0..rng.gen_range(2..=8)).map(|_| rng.gen()).collect();
    let pattern_len = rng.gen_range(4..=32);
    (0..pattern_len)
        .map(|_| alphabet[rng.gen_range(0..alphabet.len())])
        .collect()
}
