//! Core monitoring engine for xrmon.
//!
//! Polls X-Road service endpoints on a fixed interval, persists timestamped
//! results, computes rolling availability/latency statistics and raises
//! alerts when a service crosses a failure threshold.

pub mod alerting;
pub mod config;
pub mod database;
pub mod monitoring;
pub mod pool;
pub mod retention;
pub mod stats;

pub use uuid;
