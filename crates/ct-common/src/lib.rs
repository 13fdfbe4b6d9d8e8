//! Shared types for the conftree configuration-schema engine.
//!
//! This crate provides the structured error enumeration used across the
//! workspace: one variant per failure kind, stable numeric codes for
//! machine parsing, and a category for grouping.

pub mod error;

pub use error::{Error, ErrorCategory, Result};
