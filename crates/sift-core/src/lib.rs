//! # sift-core
//!
//! Core types for the Sift taint analyzer.
//! Contains shared finding/span types, error types, configuration,
//! hash-collection aliases, and tracing setup.

pub mod config;
pub mod errors;
pub mod logging;
pub mod types;
