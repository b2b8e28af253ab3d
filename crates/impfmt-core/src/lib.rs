//! Core infrastructure for impfmt.
//!
//! This crate provides language-agnostic infrastructure:
//! - Error types and exit codes
//! - JSON output types for CLI responses
//! - Configuration file loading
//! - Text utilities (newline detection, display width)

pub mod config;
pub mod error;
pub mod output;
pub mod text;
