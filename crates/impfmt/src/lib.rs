//! impfmt - Python import reorganizer.
//!
//! This crate provides the `impfmt` binary. The command implementations live
//! in [`cli`] so they can be tested without spawning a process.

pub mod cli;

pub use impfmt_core::error::{ImpfmtError, OutputErrorCode};
pub use impfmt_core::output::{FixResponse, ListResponse, SCHEMA_VERSION};
pub use impfmt_python::{Engine, TransformOptions};
