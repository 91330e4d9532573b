//! Domain types for impactlab

pub mod book;

pub use book::{minute_label, BookLevel, LobSnapshot, DEPTH, MINUTES_PER_SESSION};

/// Ticker type alias
pub type Ticker = String;
