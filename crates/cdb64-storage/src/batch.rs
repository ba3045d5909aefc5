//! Batch - repeated lookups through one reusable buffer

use crate::medium::ReadAt;
use crate::reader::CdbReader;
use cdb64_core::Result;
use std::fs::File;

/// Lookup handle that reuses a single buffer across calls to [`get`](Self::get).
///
/// A batch is owned by one thread at a time: the buffer is shared between
/// calls, which is what saves the per-lookup allocation. The value returned by
/// `get` borrows that buffer, so it must be copied out before the next call.
pub struct CdbBatch<'r, R: ReadAt = File> {
    reader: &'r CdbReader<R>,
    buf: Vec<u8>,
}

impl<'r, R: ReadAt> CdbBatch<'r, R> {
    pub(crate) fn new(reader: &'r CdbReader<R>) -> Self {
        Self {
            reader,
            buf: Vec::new(),
        }
    }

    /// Get the value stored for `key`, or `None` if it was never written.
    ///
    /// Same lookup as [`CdbReader::get`], without allocating once the buffer
    /// has grown to fit the largest record seen.
    pub fn get(&mut self, key: &[u8]) -> Result<Option<&[u8]>> {
        match self.reader.find(key, &mut self.buf)? {
            Some(value) => Ok(Some(&self.buf[value])),
            None => Ok(None),
        }
    }

    /// The reader this batch queries
    pub fn reader(&self) -> &'r CdbReader<R> {
        self.reader
    }
}
