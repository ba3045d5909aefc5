//! Writer - builds a cdb64 file record by record
//!
//! Records are appended to the medium as they are put; their index entries
//! are kept in memory, one list per bucket, until finalize writes the 256
//! hash tables after the records and the header in front of them.

use crate::config::{SyncMode, WriterConfig};
use crate::medium::Sink;
use crate::reader::CdbReader;
use cdb64_core::{
    bucket_of, encode_tuple, hash_key, home_slot, Error, Header, Result, TableDescriptor,
    HEADER_SIZE, SLOT_SIZE, TABLE_COUNT, TUPLE_SIZE,
};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Index entry for one record, placed into its bucket's table on finalize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Entry {
    hash: u64,
    offset: u64,
}

/// Writer for a new cdb64 database.
///
/// [`close`](Self::close), [`freeze`](Self::freeze) or
/// [`into_inner`](Self::into_inner) must be called to finalize the database;
/// a writer dropped without it finalizes on a best-effort basis. Any error
/// while writing or finalizing is unrecoverable and the file must not be read.
pub struct CdbWriter<W: Sink = File> {
    /// Path of the output file, when file-backed
    path: Option<PathBuf>,
    /// Buffered medium, present until finalize
    writer: Option<BufWriter<W>>,
    /// Finalized medium, present until close
    sink: Option<W>,
    /// Pending index entries per bucket
    tables: [Vec<Entry>; TABLE_COUNT],
    /// Offset where the next byte lands
    offset: u64,
    /// Records written so far
    entry_count: u64,
    config: WriterConfig,
    /// Outcome of the one and only finalize
    outcome: Option<std::result::Result<(), String>>,
}

impl CdbWriter<File> {
    /// Create a database at `path`, truncating any existing file.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        Self::create_with_config(path, WriterConfig::default())
    }

    /// Create a database at `path` with custom configuration.
    pub fn create_with_config(path: impl AsRef<Path>, config: WriterConfig) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)?;

        let mut writer = Self::with_config(file, config)?;
        debug!(path = %path.display(), "Created cdb64 database");
        writer.path = Some(path);
        Ok(writer)
    }

    /// Finalize the database, then open it for reads.
    pub fn freeze(&mut self) -> Result<CdbReader<File>> {
        if let Some(path) = self.path.clone() {
            self.close()?;
            return CdbReader::open(path);
        }

        self.finalize_once()?;
        let file = self.sink.take().ok_or_else(|| {
            Error::InvalidOperation("writer has no path and its file is already closed".into())
        })?;
        CdbReader::new(file)
    }

    /// Path of the database file
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl<W: Sink> CdbWriter<W> {
    /// Start a database on an arbitrary medium.
    pub fn new(sink: W) -> Result<Self> {
        Self::with_config(sink, WriterConfig::default())
    }

    /// Start a database on an arbitrary medium with custom configuration.
    ///
    /// The header region is reserved with zeroes straight away.
    pub fn with_config(mut sink: W, config: WriterConfig) -> Result<Self> {
        sink.seek(SeekFrom::Start(0))?;
        sink.write_all(&[0u8; HEADER_SIZE as usize])?;

        Ok(Self {
            path: None,
            writer: Some(BufWriter::with_capacity(config.buffer_size, sink)),
            sink: None,
            tables: std::array::from_fn(|_| Vec::new()),
            offset: HEADER_SIZE,
            entry_count: 0,
            config,
            outcome: None,
        })
    }

    /// Add a key/value pair.
    ///
    /// Duplicate keys are stored as-is; lookups return the first one written.
    pub fn put(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        let writer = self.writer.as_mut().ok_or_else(|| {
            Error::InvalidOperation("cannot put into a finalized writer".into())
        })?;

        let end = (TUPLE_SIZE as u64)
            .checked_add(key.len() as u64)
            .and_then(|len| len.checked_add(value.len() as u64))
            .and_then(|len| len.checked_add(self.offset))
            .ok_or_else(|| Error::InvalidOperation("database exceeds 64-bit offsets".into()))?;

        let written = writer
            .write_all(&encode_tuple(key.len() as u64, value.len() as u64))
            .and_then(|_| writer.write_all(key))
            .and_then(|_| writer.write_all(value));
        if let Err(e) = written {
            // The medium now holds a partial record.
            self.outcome = Some(Err(format!("put failed: {}", e)));
            self.writer = None;
            return Err(e.into());
        }

        let hash = hash_key(key);
        self.tables[bucket_of(hash)].push(Entry {
            hash,
            offset: self.offset,
        });
        self.offset = end;
        self.entry_count += 1;
        Ok(())
    }

    /// Finalize the database and release the medium.
    ///
    /// Only the first call finalizes; later calls return its outcome.
    pub fn close(&mut self) -> Result<()> {
        let result = self.finalize_once();
        self.sink = None;
        result
    }

    /// Finalize the database and hand back the medium.
    pub fn into_inner(mut self) -> Result<W> {
        self.finalize_once()?;
        self.sink
            .take()
            .ok_or_else(|| Error::InvalidOperation("writer medium already closed".into()))
    }

    /// Records written so far
    pub fn entry_count(&self) -> u64 {
        self.entry_count
    }

    /// Current size of the database in bytes
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Whether finalize has run (successfully or not)
    pub fn is_finalized(&self) -> bool {
        self.outcome.is_some()
    }

    fn finalize_once(&mut self) -> Result<()> {
        if let Some(outcome) = &self.outcome {
            return outcome.clone().map_err(Error::Finalize);
        }
        let result = self.finalize();
        self.outcome = Some(match &result {
            Ok(()) => Ok(()),
            Err(e) => Err(e.to_string()),
        });
        result
    }

    fn finalize(&mut self) -> Result<()> {
        let mut writer = self
            .writer
            .take()
            .ok_or_else(|| Error::InvalidOperation("writer already finalized".into()))?;

        let mut descriptors = [TableDescriptor::default(); TABLE_COUNT];
        for (bucket, entries) in self.tables.iter_mut().enumerate() {
            let slots = build_table(entries);
            let length = slots.len() as u64;
            descriptors[bucket] = TableDescriptor {
                offset: self.offset,
                length,
            };

            for slot in &slots {
                let (hash, offset) = slot.map_or((0, 0), |e| (e.hash, e.offset));
                writer.write_all(&encode_tuple(hash, offset))?;
            }
            self.offset = length
                .checked_mul(SLOT_SIZE)
                .and_then(|len| len.checked_add(self.offset))
                .ok_or_else(|| Error::InvalidOperation("database exceeds 64-bit offsets".into()))?;
            *entries = Vec::new();
        }

        let mut sink = writer.into_inner().map_err(|e| Error::Io(e.into_error()))?;
        let header = Header::new(descriptors);
        sink.seek(SeekFrom::Start(0))?;
        sink.write_all(&header.encode())?;
        sink.flush()?;
        if self.config.sync_mode == SyncMode::Sync {
            sink.sync()?;
        }

        debug!(
            entries = self.entry_count,
            data_end = header.data_end(),
            file_size = self.offset,
            "Finalized cdb64 database"
        );
        self.sink = Some(sink);
        Ok(())
    }
}

impl<W: Sink> Drop for CdbWriter<W> {
    fn drop(&mut self) {
        if self.outcome.is_none() {
            if let Err(e) = self.finalize_once() {
                warn!(error = %e, "Failed to finalize dropped cdb64 writer");
            }
        }
    }
}

/// Lays out one bucket's hash table with two slots per entry.
///
/// Each entry goes to the first free slot at or after its home slot, wrapping
/// around; entries sharing a home slot keep their put order along the probe
/// chain. Occupancy is tracked apart from the hash so a zero hash still claims
/// its slot, where a writer treating a stored zero hash as free would place a
/// later entry over it. Only keys hashing to zero lay out differently.
fn build_table(entries: &[Entry]) -> Vec<Option<Entry>> {
    let length = entries.len() * 2;
    let mut slots = vec![None; length];
    for entry in entries {
        let mut slot = home_slot(entry.hash, length as u64) as usize;
        while slots[slot].is_some() {
            slot = (slot + 1) % length;
        }
        slots[slot] = Some(*entry);
    }
    slots
}
