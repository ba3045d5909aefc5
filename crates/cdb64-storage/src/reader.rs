//! Reader - point lookups against a finalized cdb64 file
//!
//! A lookup hashes the key, picks the bucket's table from the header and
//! probes it linearly from the key's home slot. Every read is positioned, so
//! one reader serves any number of threads.

use crate::batch::CdbBatch;
use crate::iterator::{CdbIterator, Entries};
use crate::medium::ReadAt;
use cdb64_core::{
    bucket_of, decode_tuple, hash_key, home_slot, Error, Header, Result, HEADER_SIZE, TUPLE_SIZE,
};
use std::fs::File;
use std::ops::Range;
use std::path::Path;
use tracing::{debug, trace};

/// Thread-safe reader for a cdb64 database.
///
/// The header is parsed once at construction and never changes afterwards;
/// [`get`](Self::get) only performs positioned reads against the medium.
#[derive(Debug)]
pub struct CdbReader<R: ReadAt = File> {
    /// The storage medium
    medium: R,
    /// Table descriptors
    header: Header,
    /// Medium size at open time
    size: u64,
}

impl CdbReader<File> {
    /// Open an existing database file for reading
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = Self::new(File::open(path)?)?;
        debug!(
            path = %path.display(),
            entries = reader.entry_count(),
            size = reader.size,
            "Opened cdb64 database"
        );
        Ok(reader)
    }
}

impl<R: ReadAt> CdbReader<R> {
    /// Create a reader over a finalized medium.
    ///
    /// Fails with [`Error::Corruption`] if the medium is shorter than the
    /// header or the header points outside the medium.
    pub fn new(medium: R) -> Result<Self> {
        let size = medium.size()?;
        let mut buf = vec![0u8; HEADER_SIZE as usize];
        medium
            .read_exact_at(&mut buf, 0)
            .map_err(|e| Error::from_read(e, "header", 0))?;

        let header = Header::decode(&buf)?;
        header.validate(size)?;

        Ok(Self {
            medium,
            header,
            size,
        })
    }

    /// Get the value stored for `key`.
    ///
    /// Returns `Ok(None)` if the key was never written. If the key was written
    /// more than once, the first value is returned.
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let mut buf = Vec::new();
        Ok(self.find(key, &mut buf)?.map(|value| {
            buf.truncate(value.end);
            buf.drain(..value.start);
            buf
        }))
    }

    /// Create a batch for repeated lookups that share one buffer.
    ///
    /// Batches are not thread-safe; create one per thread.
    pub fn batch(&self) -> CdbBatch<'_, R> {
        CdbBatch::new(self)
    }

    /// Scan all records in put order.
    pub fn iter(&self) -> CdbIterator<'_, R> {
        CdbIterator::new(self)
    }

    /// Scan all records in put order, yielding owned pairs.
    pub fn entries(&self) -> Entries<'_, R> {
        Entries::new(self.iter())
    }

    /// Number of records in the database, duplicates included
    pub fn entry_count(&self) -> u64 {
        self.header.entry_count()
    }

    /// The parsed header
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Size of the database in bytes
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Release the medium.
    pub fn close(self) -> Result<()> {
        debug!(size = self.size, "Closed cdb64 database");
        Ok(())
    }

    /// Release the reader and return the medium.
    pub fn into_inner(self) -> R {
        self.medium
    }

    /// Probe for `key`, loading the matching record into `buf`.
    ///
    /// On a hit `buf` holds the record's key followed by its value and the
    /// returned range locates the value.
    pub(crate) fn find(&self, key: &[u8], buf: &mut Vec<u8>) -> Result<Option<Range<usize>>> {
        let hash = hash_key(key);
        let table = self.header.table(bucket_of(hash));
        if table.length == 0 {
            return Ok(None);
        }

        let first = home_slot(hash, table.length);
        let mut slot = first;
        loop {
            let (slot_hash, record) = self.read_tuple(table.slot_offset(slot), "hash slot")?;
            if slot_hash == 0 {
                break;
            }

            if slot_hash == hash {
                if let Some(value) = self.value_at(record, key, buf)? {
                    return Ok(Some(value));
                }
                trace!(slot, record, "Hash collision");
            }

            slot = (slot + 1) % table.length;
            if slot == first {
                // Full table without an empty slot: only a damaged file gets here.
                break;
            }
        }

        Ok(None)
    }

    /// Load the record at `offset` into `buf` if its key equals `key`.
    fn value_at(&self, offset: u64, key: &[u8], buf: &mut Vec<u8>) -> Result<Option<Range<usize>>> {
        let (key_len, value_len) = self.read_tuple(offset, "record header")?;
        if key_len != key.len() as u64 {
            return Ok(None);
        }

        let len = self.record_len(offset, key_len, value_len)?;
        self.read_record(offset, len, buf)?;
        if &buf[..key.len()] != key {
            return Ok(None);
        }
        Ok(Some(key.len()..len))
    }

    /// Read the 16-byte tuple at `offset`.
    pub(crate) fn read_tuple(&self, offset: u64, what: &str) -> Result<(u64, u64)> {
        let mut tuple = [0u8; TUPLE_SIZE];
        self.medium
            .read_exact_at(&mut tuple, offset)
            .map_err(|e| Error::from_read(e, what, offset))?;
        decode_tuple(&tuple)
    }

    /// Read the `len` key and value bytes of the record at `offset` into `buf`.
    ///
    /// `buf` keeps its allocation when it is already large enough.
    pub(crate) fn read_record(&self, offset: u64, len: usize, buf: &mut Vec<u8>) -> Result<()> {
        buf.clear();
        buf.resize(len, 0);
        let body = offset + TUPLE_SIZE as u64;
        self.medium
            .read_exact_at(buf, body)
            .map_err(|e| Error::from_read(e, "record", body))
    }

    /// Size of the key and value of the record at `offset`, checked against the file size.
    pub(crate) fn record_len(&self, offset: u64, key_len: u64, value_len: u64) -> Result<usize> {
        let len = key_len.checked_add(value_len);
        let end = len
            .and_then(|len| len.checked_add(TUPLE_SIZE as u64))
            .and_then(|len| len.checked_add(offset));
        match (len, end) {
            (Some(len), Some(end)) if end <= self.size => usize::try_from(len)
                .map_err(|_| Error::Corruption(format!("record at {} is too large", offset))),
            _ => Err(Error::Corruption(format!(
                "record at {} ({} + {} bytes) exceeds file size {}",
                offset, key_len, value_len, self.size
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::CdbWriter;
    use cdb64_core::encode_tuple;
    use std::io::Cursor;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn build(pairs: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = CdbWriter::new(Cursor::new(Vec::new())).unwrap();
        for (key, value) in pairs {
            writer.put(key.as_bytes(), value.as_bytes()).unwrap();
        }
        writer.into_inner().unwrap().into_inner()
    }

    #[test]
    fn test_reader_get() {
        let data = build(&[("Alice", "Hoax"), ("Bob", "Hope"), ("Charlie", "Horse")]);
        let reader = CdbReader::new(data).unwrap();

        assert_eq!(reader.entry_count(), 3);
        assert_eq!(reader.get(b"Alice").unwrap(), Some(b"Hoax".to_vec()));
        assert_eq!(reader.get(b"Bob").unwrap(), Some(b"Hope".to_vec()));
        assert_eq!(reader.get(b"Charlie").unwrap(), Some(b"Horse".to_vec()));
        assert_eq!(reader.get(b"Dave").unwrap(), None);
        assert_eq!(reader.get(b"").unwrap(), None);
    }

    #[test]
    fn test_empty_database() {
        let reader = CdbReader::new(build(&[])).unwrap();
        assert_eq!(reader.entry_count(), 0);
        assert_eq!(reader.size(), HEADER_SIZE);
        assert_eq!(reader.get(b"anything").unwrap(), None);
    }

    #[test]
    fn test_duplicate_key_returns_first() {
        let data = build(&[("k", "first"), ("other", "x"), ("k", "second")]);
        let reader = CdbReader::new(data).unwrap();
        assert_eq!(reader.get(b"k").unwrap(), Some(b"first".to_vec()));
        assert_eq!(reader.entry_count(), 3);
    }

    #[test]
    fn test_too_short_for_header() {
        let err = CdbReader::new(vec![0u8; 100]).unwrap_err();
        assert!(err.is_corruption());
    }

    #[test]
    fn test_unfinalized_header_rejected() {
        // Placeholder header only, as left by a writer that never finalized.
        let err = CdbReader::new(vec![0u8; HEADER_SIZE as usize]).unwrap_err();
        assert!(err.is_corruption());
    }

    #[test]
    fn test_truncated_tables_rejected() {
        let mut data = build(&[("key", "value")]);
        data.truncate(data.len() - 1);
        assert!(CdbReader::new(data).unwrap_err().is_corruption());
    }

    #[test]
    fn test_record_length_past_eof() {
        let mut data = build(&[("key", "value")]);
        // Claim a value far larger than the file.
        let start = HEADER_SIZE as usize;
        data[start..start + 16].copy_from_slice(&encode_tuple(3, u64::MAX - 2));
        let reader = CdbReader::new(data).unwrap();
        assert!(reader.get(b"key").unwrap_err().is_corruption());
    }

    #[test]
    fn test_full_table_terminates() {
        let mut data = build(&[("key", "value")]);
        let reader = CdbReader::new(data.clone()).unwrap();
        let hash = hash_key(b"key");
        let table = *reader.header().table(bucket_of(hash));
        assert_eq!(table.length, 2);

        // Fill both slots with a foreign hash so no empty slot remains.
        for slot in 0..table.length {
            let at = table.slot_offset(slot) as usize;
            data[at..at + 16].copy_from_slice(&encode_tuple(hash ^ 0x100, HEADER_SIZE));
        }
        let reader = CdbReader::new(data).unwrap();
        assert_eq!(reader.get(b"key").unwrap(), None);
    }

    #[test]
    fn test_concurrent_gets() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.cdb");
        let mut writer = CdbWriter::create(&path).unwrap();
        for i in 0..1000 {
            writer
                .put(format!("key{}", i).as_bytes(), format!("value{}", i).as_bytes())
                .unwrap();
        }
        let reader = Arc::new(writer.freeze().unwrap());

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let reader = Arc::clone(&reader);
                std::thread::spawn(move || {
                    for i in (t..1000).step_by(4) {
                        let value = reader.get(format!("key{}", i).as_bytes()).unwrap();
                        assert_eq!(value, Some(format!("value{}", i).into_bytes()));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
    }

    #[test]
    fn test_reader_over_borrowed_slice() {
        let data = build(&[("a", "1")]);
        let reader = CdbReader::new(data.as_slice()).unwrap();
        assert_eq!(reader.get(b"a").unwrap(), Some(b"1".to_vec()));
        assert_eq!(reader.into_inner().len(), data.len());
    }
}
