//! Sequential scan over the records of a cdb64 file

use crate::medium::ReadAt;
use crate::reader::CdbReader;
use cdb64_core::{Error, Result, HEADER_SIZE, TUPLE_SIZE};
use std::fs::File;

enum State {
    Scanning,
    Exhausted,
    Failed(Option<Error>),
}

/// Forward-only cursor over all records, in the order they were put.
///
/// The current key and value live in a buffer that the next call to
/// [`next`](Self::next) overwrites; copy them out to keep them. Like
/// [`CdbBatch`](crate::CdbBatch), an iterator is owned by one thread.
pub struct CdbIterator<'r, R: ReadAt = File> {
    reader: &'r CdbReader<R>,
    /// Offset of the next record
    offset: u64,
    /// End of the record region
    end: u64,
    buf: Vec<u8>,
    key_len: usize,
    state: State,
}

impl<'r, R: ReadAt> CdbIterator<'r, R> {
    pub(crate) fn new(reader: &'r CdbReader<R>) -> Self {
        Self {
            reader,
            offset: HEADER_SIZE,
            end: reader.header().data_end(),
            buf: Vec::new(),
            key_len: 0,
            state: State::Scanning,
        }
    }

    /// Advance to the next record.
    ///
    /// Returns false once the scan stops, either at the end of the records or
    /// on an error; [`err`](Self::err) tells which.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> bool {
        if !matches!(self.state, State::Scanning) {
            return false;
        }
        if self.offset >= self.end {
            self.state = State::Exhausted;
            return false;
        }

        match self.advance() {
            Ok(()) => true,
            Err(e) => {
                self.state = State::Failed(Some(e));
                false
            }
        }
    }

    /// Advance and return the next record, for callers that use `?`.
    ///
    /// Returns `Ok(None)` at the end of the records. A failed read is returned
    /// once and ends the scan; the error is handed to the caller instead of
    /// being kept for [`err`](Self::err).
    pub fn next_entry(&mut self) -> Result<Option<(&[u8], &[u8])>> {
        if self.next() {
            return Ok(Some((self.key(), self.value())));
        }
        match self.take_err() {
            Some(e) => Err(e),
            None => Ok(None),
        }
    }

    fn advance(&mut self) -> Result<()> {
        let (key_len, value_len) = self.reader.read_tuple(self.offset, "record header")?;
        let len = self.reader.record_len(self.offset, key_len, value_len)?;
        let next = self.offset + TUPLE_SIZE as u64 + len as u64;
        if next > self.end {
            return Err(Error::Corruption(format!(
                "record at {} runs past the end of the record region at {}",
                self.offset, self.end
            )));
        }

        self.reader.read_record(self.offset, len, &mut self.buf)?;
        self.key_len = key_len as usize;
        self.offset = next;
        Ok(())
    }

    /// Key of the current record
    pub fn key(&self) -> &[u8] {
        &self.buf[..self.key_len]
    }

    /// Value of the current record
    pub fn value(&self) -> &[u8] {
        &self.buf[self.key_len..]
    }

    /// The error that stopped the scan, if any
    pub fn err(&self) -> Option<&Error> {
        match &self.state {
            State::Failed(err) => err.as_ref(),
            _ => None,
        }
    }

    fn take_err(&mut self) -> Option<Error> {
        match &mut self.state {
            State::Failed(err) => err.take(),
            _ => None,
        }
    }
}

/// Owning iterator over all records, see [`CdbReader::entries`].
///
/// Yields each pair as freshly allocated vectors; a failed read is yielded
/// once as an `Err` and ends the iteration.
pub struct Entries<'r, R: ReadAt = File> {
    inner: CdbIterator<'r, R>,
}

impl<'r, R: ReadAt> Entries<'r, R> {
    pub(crate) fn new(inner: CdbIterator<'r, R>) -> Self {
        Self { inner }
    }
}

impl<R: ReadAt> Iterator for Entries<'_, R> {
    type Item = Result<(Vec<u8>, Vec<u8>)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.inner.next() {
            Some(Ok((self.inner.key().to_vec(), self.inner.value().to_vec())))
        } else {
            self.inner.take_err().map(Err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::CdbWriter;
    use cdb64_core::encode_tuple;
    use std::io::Cursor;

    fn seeded(n: u32) -> Vec<u8> {
        let mut writer = CdbWriter::new(Cursor::new(Vec::new())).unwrap();
        for i in (1..2 * n).step_by(2) {
            writer
                .put(
                    format!("key-{:08}", i).as_bytes(),
                    format!("val-{:08}", i).as_bytes(),
                )
                .unwrap();
        }
        writer.into_inner().unwrap().into_inner()
    }

    #[test]
    fn test_iterate_in_put_order() {
        let reader = CdbReader::new(seeded(10)).unwrap();
        let mut iter = reader.iter();

        assert!(iter.next());
        assert_eq!(iter.key(), b"key-00000001");
        assert_eq!(iter.value(), b"val-00000001");

        assert!(iter.next());
        assert_eq!(iter.key(), b"key-00000003");
        assert_eq!(iter.value(), b"val-00000003");

        let mut count = 2;
        while iter.next() {
            count += 1;
        }
        assert_eq!(count, 10);
        assert_eq!(iter.key(), b"key-00000019");
        assert!(iter.err().is_none());

        // Exhausted is terminal.
        assert!(!iter.next());
    }

    #[test]
    fn test_iterate_empty_database() {
        let writer = CdbWriter::new(Cursor::new(Vec::new())).unwrap();
        let data = writer.into_inner().unwrap().into_inner();
        let reader = CdbReader::new(data).unwrap();
        let mut iter = reader.iter();
        assert!(!iter.next());
        assert!(iter.err().is_none());
        assert_eq!(reader.entries().count(), 0);
    }

    #[test]
    fn test_iterate_corrupt_record() {
        let mut data = seeded(3);
        // Second record: key-00000001 record is 16 + 24 bytes long.
        let second = HEADER_SIZE as usize + 40;
        data[second..second + 16].copy_from_slice(&encode_tuple(1 << 40, 0));
        let reader = CdbReader::new(data).unwrap();

        let mut iter = reader.iter();
        assert!(iter.next());
        assert!(!iter.next());
        assert!(iter.err().unwrap().is_corruption());
        // Failed is terminal.
        assert!(!iter.next());
        assert!(iter.err().is_some());
    }

    #[test]
    fn test_entries_stop_after_error() {
        let mut data = seeded(3);
        let second = HEADER_SIZE as usize + 40;
        data[second..second + 16].copy_from_slice(&encode_tuple(1 << 40, 0));
        let reader = CdbReader::new(data).unwrap();

        let items: Vec<_> = reader.entries().collect();
        assert_eq!(items.len(), 2);
        assert_eq!(
            items[0].as_ref().unwrap(),
            &(b"key-00000001".to_vec(), b"val-00000001".to_vec())
        );
        assert!(items[1].is_err());
    }

    #[test]
    fn test_next_entry_scan() {
        let reader = CdbReader::new(seeded(3)).unwrap();
        let mut iter = reader.iter();

        let (key, value) = iter.next_entry().unwrap().unwrap();
        assert_eq!(key, b"key-00000001");
        assert_eq!(value, b"val-00000001");
        assert!(iter.next_entry().unwrap().is_some());
        assert!(iter.next_entry().unwrap().is_some());
        assert!(iter.next_entry().unwrap().is_none());
        assert!(iter.next_entry().unwrap().is_none());
    }

    #[test]
    fn test_next_entry_corrupt_record() {
        let mut data = seeded(3);
        let second = HEADER_SIZE as usize + 40;
        data[second..second + 16].copy_from_slice(&encode_tuple(1 << 40, 0));
        let reader = CdbReader::new(data).unwrap();

        let mut iter = reader.iter();
        assert!(iter.next_entry().unwrap().is_some());
        let err = iter.next_entry().unwrap_err();
        assert!(err.is_corruption());
        // The error is reported once; the scan stays stopped.
        assert!(iter.next_entry().unwrap().is_none());
        assert!(!iter.next());
    }

    #[test]
    fn test_entries_owned() {
        let reader = CdbReader::new(seeded(5)).unwrap();
        let keys: Vec<Vec<u8>> = reader.entries().map(|e| e.unwrap().0).collect();
        assert_eq!(keys.len(), 5);
        assert_eq!(keys[4], b"key-00000009".to_vec());
    }
}
