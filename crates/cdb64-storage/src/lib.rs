//! # cdb64 Storage
//!
//! Writer, reader, batch and iterator for cdb64 files.
//!
//! ## ⚠️ Internal Implementation Detail
//!
//! **This crate is an internal implementation detail of cdb64.**
//!
//! Users should depend on the main [`cdb64`](https://crates.io/crates/cdb64) crate
//! instead, which provides the stable public API. This crate's API may change
//! without notice between minor versions.
//!
//! ---
//!
//! A cdb64 file is built once by a [`CdbWriter`] and is immutable afterwards:
//!
//! ```text
//! put → records appended, index entries kept per bucket
//!         ↓
//! close/freeze → 256 hash tables + header written
//!         ↓
//! CdbReader → get / batch / iter
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod batch;
pub mod config;
pub mod iterator;
pub mod medium;
pub mod reader;
pub mod writer;

pub use batch::CdbBatch;
pub use config::{SyncMode, WriterConfig, DEFAULT_BUFFER_SIZE};
pub use iterator::{CdbIterator, Entries};
pub use medium::{ReadAt, Sink};
pub use reader::CdbReader;
pub use writer::CdbWriter;
