//! ImpactLab Core — order book domain, slippage curves, power-law fits,
//! allocation solver.
//!
//! This crate contains the numerical heart of the analysis pipeline:
//! - Domain types (book levels, per-minute LOB snapshots)
//! - Headerless-CSV ingest with schema validation and row sanity filtering
//! - Deterministic synthetic book generation
//! - Ask-side fill simulation and slippage curves over an order-size grid
//! - Log-log OLS power-law fitting
//! - Convex parent-order allocation across session minutes

pub mod allocation;
pub mod data;
pub mod domain;
pub mod fingerprint;
pub mod fit;
pub mod slippage;
