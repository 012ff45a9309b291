//! # sevm-crypto
//!
//! Hash primitives used by the interpreter.
//!
//! - Keccak-256 hashing (`KECCAK256`, `EXTCODEHASH`)
//! - Contract address derivation (`CREATE`)

#![warn(missing_docs)]
#![warn(clippy::all)]

mod hash;
mod address;

pub use hash::{keccak256, KECCAK_EMPTY};
pub use address::create_address;
