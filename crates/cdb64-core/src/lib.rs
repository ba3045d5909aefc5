//! # cdb64 Core
//!
//! Core types for cdb64: the error type, the on-disk format and the key hash.
//!
//! ## ⚠️ Internal Implementation Detail
//!
//! **This crate is an internal implementation detail of cdb64.**
//!
//! Users should depend on the main [`cdb64`](https://crates.io/crates/cdb64) crate
//! instead, which provides the stable public API.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod format;
pub mod hash;

pub use error::{Error, Result};
pub use format::{
    decode_tuple, encode_tuple, Header, TableDescriptor, HEADER_SIZE, SLOT_SIZE, TABLE_COUNT,
    TUPLE_SIZE,
};
pub use hash::{bucket_of, hash_key, home_slot};
