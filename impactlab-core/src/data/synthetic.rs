//! Deterministic synthetic LOB days for testing/development.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::{BookLevel, LobSnapshot, DEPTH};

/// Generate a synthetic book day for one ticker.
///
/// Produces a mid-price random walk with a positive spread and strictly
/// monotone five-level ladders on both sides. Seeded from the ticker name,
/// so the same ticker always yields the same day. These are clearly fake
/// and tagged as synthetic by the loader.
pub fn generate_synthetic_books(ticker: &str, rows: u32) -> Vec<LobSnapshot> {
    // Deterministic seed from ticker name
    let seed_bytes = blake3::hash(ticker.as_bytes());
    let seed: [u8; 32] = *seed_bytes.as_bytes();
    let mut rng = StdRng::from_seed(seed);

    let mut books = Vec::with_capacity(rows as usize);
    let mut mid = rng.gen_range(40.0..400.0_f64);

    for minute in 0..rows {
        let minute_return: f64 = rng.gen_range(-0.0008..0.0008);
        mid *= 1.0 + minute_return;

        let half_spread = mid * rng.gen_range(0.00005..0.0004);
        let tick = (half_spread * 0.5).max(0.01);

        let mut asks = [BookLevel {
            price: 0.0,
            size: 0.0,
        }; DEPTH];
        let mut bids = asks;

        let mut ask_price = mid + half_spread;
        let mut bid_price = mid - half_spread;
        for level in 0..DEPTH {
            asks[level] = BookLevel {
                price: ask_price,
                size: rng.gen_range(40.0..400.0) * (1.0 + 0.4 * level as f64),
            };
            bids[level] = BookLevel {
                price: bid_price,
                size: rng.gen_range(40.0..400.0) * (1.0 + 0.4 * level as f64),
            };
            ask_price += tick * rng.gen_range(0.5..2.0);
            bid_price -= tick * rng.gen_range(0.5..2.0);
        }

        books.push(LobSnapshot {
            minute,
            asks,
            bids,
        });
    }

    books
}
