//! LobSnapshot — the fundamental market data unit.

use serde::{Deserialize, Serialize};

/// Number of quote levels captured per book side.
pub const DEPTH: usize = 5;

/// Snapshots per trading session (one per minute, 09:30–16:00).
pub const MINUTES_PER_SESSION: u32 = 390;

/// One quote level: a price and the visible size resting at it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BookLevel {
    pub price: f64,
    pub size: f64,
}

/// Five-level limit order book snapshot for one minute of the session.
///
/// Levels are ordered best-first: `asks[0]` is the lowest ask, `bids[0]`
/// the highest bid. `minute` is the 0-based offset from the session open.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LobSnapshot {
    pub minute: u32,
    pub asks: [BookLevel; DEPTH],
    pub bids: [BookLevel; DEPTH],
}

impl LobSnapshot {
    pub fn best_ask(&self) -> f64 {
        self.asks[0].price
    }

    pub fn best_bid(&self) -> f64 {
        self.bids[0].price
    }

    /// Midpoint of the top of book.
    pub fn mid_price(&self) -> f64 {
        (self.best_ask() + self.best_bid()) / 2.0
    }

    pub fn spread(&self) -> f64 {
        self.best_ask() - self.best_bid()
    }

    /// Total size visible on the ask side.
    pub fn ask_depth(&self) -> f64 {
        self.asks.iter().map(|level| level.size).sum()
    }

    /// Returns true if any price or size is NaN or infinite (void snapshot).
    pub fn is_void(&self) -> bool {
        self.asks
            .iter()
            .chain(self.bids.iter())
            .any(|level| !level.price.is_finite() || !level.size.is_finite())
    }

    /// Basic book sanity: finite values, non-negative sizes, positive
    /// uncrossed top of book, strictly monotone price ladders on both sides.
    pub fn is_sane(&self) -> bool {
        if self.is_void() {
            return false;
        }
        let sizes_ok = self
            .asks
            .iter()
            .chain(self.bids.iter())
            .all(|level| level.size >= 0.0);
        let asks_ascending = self.asks.windows(2).all(|w| w[0].price < w[1].price);
        let bids_descending = self.bids.windows(2).all(|w| w[0].price > w[1].price);
        sizes_ok
            && self.best_bid() > 0.0
            && self.best_ask() > self.best_bid()
            && asks_ascending
            && bids_descending
    }

    /// Wall-clock label for this snapshot's minute, e.g. minute 0 -> "09:30".
    pub fn time_label(&self) -> String {
        minute_label(self.minute)
    }
}

/// Formats a 0-based session minute as an HH:MM clock label.
pub fn minute_label(minute: u32) -> String {
    let total = 9 * 60 + 30 + minute;
    format!("{:02}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_snapshot() -> LobSnapshot {
        LobSnapshot {
            minute: 0,
            asks: [
                BookLevel { price: 100.10, size: 50.0 },
                BookLevel { price: 100.20, size: 80.0 },
                BookLevel { price: 100.30, size: 120.0 },
                BookLevel { price: 100.40, size: 90.0 },
                BookLevel { price: 100.50, size: 200.0 },
            ],
            bids: [
                BookLevel { price: 100.00, size: 60.0 },
                BookLevel { price: 99.90, size: 70.0 },
                BookLevel { price: 99.80, size: 110.0 },
                BookLevel { price: 99.70, size: 95.0 },
                BookLevel { price: 99.60, size: 150.0 },
            ],
        }
    }

    #[test]
    fn snapshot_is_sane() {
        assert!(sample_snapshot().is_sane());
    }

    #[test]
    fn snapshot_mid_and_depth() {
        let snap = sample_snapshot();
        assert!((snap.mid_price() - 100.05).abs() < 1e-12);
        assert!((snap.ask_depth() - 540.0).abs() < 1e-12);
    }

    #[test]
    fn snapshot_detects_void() {
        let mut snap = sample_snapshot();
        snap.asks[2].price = f64::NAN;
        assert!(snap.is_void());
        assert!(!snap.is_sane());
    }

    #[test]
    fn snapshot_detects_crossed_book() {
        let mut snap = sample_snapshot();
        snap.bids[0].price = 100.15; // above best ask
        assert!(!snap.is_sane());
    }

    #[test]
    fn snapshot_detects_broken_ladder() {
        let mut snap = sample_snapshot();
        snap.asks[3].price = 100.05; // below level 3
        assert!(!snap.is_sane());
    }

    #[test]
    fn snapshot_detects_negative_size() {
        let mut snap = sample_snapshot();
        snap.bids[1].size = -5.0;
        assert!(!snap.is_sane());
    }

    #[test]
    fn minute_labels_cover_session() {
        assert_eq!(minute_label(0), "09:30");
        assert_eq!(minute_label(30), "10:00");
        assert_eq!(minute_label(MINUTES_PER_SESSION - 1), "15:59");
    }

    #[test]
    fn snapshot_serialization_roundtrip() {
        let snap = sample_snapshot();
        let json = serde_json::to_string(&snap).unwrap();
        let deser: LobSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(snap.minute, deser.minute);
        assert_eq!(snap.asks[0], deser.asks[0]);
        assert_eq!(snap.bids[4], deser.bids[4]);
    }
}
