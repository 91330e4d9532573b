//! Dataset fingerprinting for reproducibility stamps.

use std::collections::BTreeMap;

use crate::domain::LobSnapshot;

/// Computes a blake3 fingerprint over every value in every loaded book.
///
/// Tickers hash in sorted (BTreeMap) order so the fingerprint is stable
/// across load order. Two runs over byte-identical data always report the
/// same hash in their manifests.
pub fn compute_dataset_hash(books: &BTreeMap<String, Vec<LobSnapshot>>) -> String {
    let mut hasher = blake3::Hasher::new();

    for (ticker, snapshots) in books {
        hasher.update(ticker.as_bytes());
        for snap in snapshots {
            hasher.update(&snap.minute.to_le_bytes());
            for level in snap.asks.iter().chain(snap.bids.iter()) {
                hasher.update(&level.price.to_le_bytes());
                hasher.update(&level.size.to_le_bytes());
            }
        }
    }

    hasher.finalize().to_hex().to_string()
}
