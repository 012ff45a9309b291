//! # sevm-fixtures
//!
//! JSON boundary for the SEVM interpreter.
//!
//! This crate provides:
//! - Hex/JSON decoding of fixtures into engine inputs
//! - Hex encoding of execution results
//! - A runner that checks fixtures against their expectations
//!
//! ## Fixture format
//!
//! A fixture file is a JSON array. Each entry carries `code`, optional
//! `tx`, `block` and `state` sections, and an `expect` block whose present
//! fields (`stack`, `success`, `logs`, `return`) are compared.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod report;
mod runner;
mod types;

pub use error::{FixtureError, FixtureResult};
pub use report::{word_to_hex, AccountReport, CodeReport, ExecutionReport, LogReport};
pub use runner::{FixtureRunner, FixtureStats};
pub use types::*;
