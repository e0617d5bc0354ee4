//! Shared utilities for docintake integration tests.
//!
//! - `TestHarness` for isolated directories and service setup
//! - `RecordingStatus` to observe document status transitions
//! - Builders for pipeline definitions and jobs

pub mod builders;
pub mod harness;

pub use builders::*;
pub use harness::{fixture_dir, png_bytes, RecordingStatus, TestHarness};
