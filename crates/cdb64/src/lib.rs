//! # cdb64
//!
//! A constant key/value database: a file is built once from a stream of
//! key/value pairs and then serves O(1) lookups through an on-disk hash index.
//! It follows the classic [cdb](http://cr.yp.to/cdb.html) design with 64-bit
//! offsets and lengths, so files are not limited to 4 GiB.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut writer = cdb64::create("/tmp/example.cdb")?;
//!
//!     // Write some key/value pairs
//!     writer.put(b"Alice", b"Hoax")?;
//!     writer.put(b"Bob", b"Hope")?;
//!     writer.put(b"Charlie", b"Horse")?;
//!
//!     // Freeze and re-open it for reading
//!     let db = writer.freeze()?;
//!     assert_eq!(db.get(b"Alice")?, Some(b"Hoax".to_vec()));
//!     Ok(())
//! }
//! ```
//!
//! ## Reading
//!
//! - [`CdbReader::get`] is safe to call from many threads at once.
//! - [`CdbReader::batch`] returns a [`CdbBatch`] that reuses one buffer across
//!   lookups; the returned value borrows the batch until the next call.
//! - [`CdbReader::iter`] scans records in the order they were written.
//!
//! ```rust
//! use cdb64::{CdbReader, CdbWriter};
//! use std::io::Cursor;
//!
//! let mut writer = CdbWriter::new(Cursor::new(Vec::new()))?;
//! writer.put(b"key", b"value")?;
//! let data = writer.into_inner()?.into_inner();
//!
//! let db = CdbReader::new(data)?;
//! let mut batch = db.batch();
//! assert_eq!(batch.get(b"key")?, Some(&b"value"[..]));
//!
//! let mut iter = db.iter();
//! while iter.next() {
//!     println!("{:?} => {:?}", iter.key(), iter.value());
//! }
//! assert!(iter.err().is_none());
//! # Ok::<(), cdb64::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod logging;

use std::fs::File;
use std::path::Path;

// Re-export core types
pub use cdb64_core::{hash_key, Error, Header, Result, TableDescriptor, HEADER_SIZE};

// Storage components
pub use cdb64_storage::{
    CdbBatch, CdbIterator, CdbReader, CdbWriter, Entries, ReadAt, Sink, SyncMode, WriterConfig,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Create a database at `path`, overwriting any existing file.
///
/// Call [`CdbWriter::close`] or [`CdbWriter::freeze`] once all pairs are put.
pub fn create(path: impl AsRef<Path>) -> Result<CdbWriter<File>> {
    CdbWriter::create(path)
}

/// Create a database at `path` with custom writer configuration.
pub fn create_with_config(
    path: impl AsRef<Path>,
    config: WriterConfig,
) -> Result<CdbWriter<File>> {
    CdbWriter::create_with_config(path, config)
}

/// Open an existing database for reading.
pub fn open(path: impl AsRef<Path>) -> Result<CdbReader<File>> {
    CdbReader::open(path)
}
