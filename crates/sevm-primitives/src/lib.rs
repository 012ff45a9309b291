//! # sevm-primitives
//!
//! Fixed-size value types shared by the SEVM crates.
//!
//! Addresses and 32-byte hashes are plain byte arrays inside the engine.
//! Hex strings only appear at the boundary, through `from_hex` / `to_hex`
//! and the optional `serde` impls.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod address;
mod hash;

pub use address::{Address, AddressError};
pub use hash::{HashError, H256};
