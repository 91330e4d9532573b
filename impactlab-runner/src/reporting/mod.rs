//! Reporting and artifact export pipeline.

pub mod artifacts;
pub mod export;
pub mod reports;

pub use artifacts::{ArtifactManager, ArtifactPaths, StockArtifacts};
