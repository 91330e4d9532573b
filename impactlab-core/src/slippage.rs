//! Ask-side fill simulation and slippage curves.
//!
//! A buy order of size x walks the visible ask ladder best-first, consuming
//! size level by level until filled. Slippage is the average fill price in
//! excess of the prevailing mid. Orders larger than the visible depth are
//! rejected rather than extrapolated.

use serde::{Deserialize, Serialize};

use crate::domain::{BookLevel, LobSnapshot};

/// Order-size grid for curve construction.
///
/// `sizes()` yields min, min+step, ... strictly below max, matching a
/// half-open range. The default covers 10 to 290 in steps of 10.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeGrid {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl Default for SizeGrid {
    fn default() -> Self {
        Self {
            min: 10.0,
            max: 300.0,
            step: 10.0,
        }
    }
}

impl SizeGrid {
    /// Grid sizes in ascending order. Degenerate parameters yield an empty
    /// grid rather than panicking or looping.
    pub fn sizes(&self) -> Vec<f64> {
        if !(self.step > 0.0) || !(self.min > 0.0) || self.max <= self.min {
            return Vec::new();
        }
        let mut sizes = Vec::new();
        let mut i = 0u32;
        loop {
            let x = self.min + f64::from(i) * self.step;
            if x >= self.max {
                break;
            }
            sizes.push(x);
            i += 1;
        }
        sizes
    }
}

/// One (order size, slippage) sample on an empirical curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub size: f64,
    pub slippage: f64,
}

/// Empirical slippage curve for one snapshot.
///
/// `points` holds feasible grid sizes only; `skipped` counts grid sizes
/// that exceeded the snapshot's visible ask depth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlippageCurve {
    pub minute: u32,
    pub points: Vec<CurvePoint>,
    pub skipped: usize,
}

/// Cost of filling a buy order of `order_size` by walking the ask ladder.
///
/// Returns None when the order is non-positive or exceeds the visible
/// depth; partial fills are never priced.
pub fn fill_cost(asks: &[BookLevel], order_size: f64) -> Option<f64> {
    if !(order_size > 0.0) || !order_size.is_finite() {
        return None;
    }
    let mut remaining = order_size;
    let mut cost = 0.0;
    for level in asks {
        if remaining <= 0.0 {
            break;
        }
        let take = remaining.min(level.size);
        cost += take * level.price;
        remaining -= take;
    }
    // Tolerate float residue from consuming whole levels.
    if remaining > order_size * 1e-12 {
        None
    } else {
        Some(cost)
    }
}

/// Average price paid per unit for a buy of `order_size`.
pub fn average_fill_price(asks: &[BookLevel], order_size: f64) -> Option<f64> {
    fill_cost(asks, order_size).map(|cost| cost / order_size)
}

/// Per-unit slippage of a buy against the snapshot mid.
///
/// For a sane book and feasible size this is at least half the spread,
/// hence strictly positive.
pub fn slippage(snapshot: &LobSnapshot, order_size: f64) -> Option<f64> {
    let avg = average_fill_price(&snapshot.asks, order_size)?;
    Some(avg - snapshot.mid_price())
}

/// Evaluates the grid against one snapshot, keeping feasible points and
/// counting rejected sizes.
pub fn curve(snapshot: &LobSnapshot, grid: &SizeGrid) -> SlippageCurve {
    let mut points = Vec::new();
    let mut skipped = 0;
    for size in grid.sizes() {
        match slippage(snapshot, size) {
            Some(g) => points.push(CurvePoint { size, slippage: g }),
            None => skipped += 1,
        }
    }
    SlippageCurve {
        minute: snapshot.minute,
        points,
        skipped,
    }
}
