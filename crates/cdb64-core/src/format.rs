//! On-disk format of a cdb64 file.
//!
//! ## File Format
//!
//! ```text
//! +------------------+
//! | Header           |  <- 256 x (table offset u64, slot count u64), 4096 bytes
//! +------------------+
//! | Records          |  <- key_len u64 | value_len u64 | key | value, in put order
//! +------------------+
//! | Hash Tables      |  <- 256 tables of (hash u64, record offset u64) slots
//! +------------------+
//! ```
//!
//! All integers are little-endian. A slot whose hash is zero is empty.

use crate::error::{Error, Result};

/// Number of hash tables (buckets) in a file
pub const TABLE_COUNT: usize = 256;

/// Size of an encoded `(u64, u64)` tuple
pub const TUPLE_SIZE: usize = 16;

/// Size of one hash table slot
pub const SLOT_SIZE: u64 = TUPLE_SIZE as u64;

/// Size of the header at the start of every file
pub const HEADER_SIZE: u64 = (TABLE_COUNT * TUPLE_SIZE) as u64;

/// Encodes two integers as a 16-byte little-endian tuple.
pub fn encode_tuple(first: u64, second: u64) -> [u8; TUPLE_SIZE] {
    let mut tuple = [0u8; TUPLE_SIZE];
    tuple[..8].copy_from_slice(&first.to_le_bytes());
    tuple[8..].copy_from_slice(&second.to_le_bytes());
    tuple
}

/// Decodes a 16-byte little-endian tuple from the front of `buf`.
pub fn decode_tuple(buf: &[u8]) -> Result<(u64, u64)> {
    if buf.len() < TUPLE_SIZE {
        return Err(Error::Corruption(format!(
            "tuple needs {} bytes, got {}",
            TUPLE_SIZE,
            buf.len()
        )));
    }
    let mut first = [0u8; 8];
    let mut second = [0u8; 8];
    first.copy_from_slice(&buf[..8]);
    second.copy_from_slice(&buf[8..TUPLE_SIZE]);
    Ok((u64::from_le_bytes(first), u64::from_le_bytes(second)))
}

/// Location of one bucket's hash table.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TableDescriptor {
    /// Absolute file offset of the first slot
    pub offset: u64,
    /// Number of 16-byte slots (zero means the bucket is empty)
    pub length: u64,
}

impl TableDescriptor {
    /// Offset one past the last slot, or `None` on overflow.
    pub fn end(&self) -> Option<u64> {
        self.length
            .checked_mul(SLOT_SIZE)
            .and_then(|len| self.offset.checked_add(len))
    }

    /// Absolute offset of slot `slot`.
    pub fn slot_offset(&self, slot: u64) -> u64 {
        self.offset + slot * SLOT_SIZE
    }
}

/// The 256 table descriptors stored in the first 4096 bytes of a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    tables: [TableDescriptor; TABLE_COUNT],
}

impl Default for Header {
    fn default() -> Self {
        Self {
            tables: [TableDescriptor::default(); TABLE_COUNT],
        }
    }
}

impl Header {
    /// Creates a header from its descriptors.
    pub fn new(tables: [TableDescriptor; TABLE_COUNT]) -> Self {
        Self { tables }
    }

    /// Descriptor of the table serving `bucket`.
    pub fn table(&self, bucket: usize) -> &TableDescriptor {
        &self.tables[bucket]
    }

    /// All descriptors in bucket order.
    pub fn tables(&self) -> &[TableDescriptor; TABLE_COUNT] {
        &self.tables
    }

    /// End of the record region.
    ///
    /// Tables are written after every record, in bucket order, so the first
    /// table starts where the data ends.
    pub fn data_end(&self) -> u64 {
        self.tables[0].offset
    }

    /// Number of records indexed by the tables (each table holds two slots per record).
    pub fn entry_count(&self) -> u64 {
        self.tables.iter().map(|t| t.length / 2).sum()
    }

    /// Encodes the header into its 4096-byte on-disk form.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(HEADER_SIZE as usize);
        for table in &self.tables {
            buf.extend_from_slice(&encode_tuple(table.offset, table.length));
        }
        buf
    }

    /// Decodes a header from the first 4096 bytes of `buf`.
    pub fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() < HEADER_SIZE as usize {
            return Err(Error::Corruption(format!(
                "header needs {} bytes, got {}",
                HEADER_SIZE,
                buf.len()
            )));
        }
        let mut tables = [TableDescriptor::default(); TABLE_COUNT];
        for (i, chunk) in buf[..HEADER_SIZE as usize]
            .chunks_exact(TUPLE_SIZE)
            .enumerate()
        {
            let (offset, length) = decode_tuple(chunk)?;
            tables[i] = TableDescriptor { offset, length };
        }
        Ok(Self { tables })
    }

    /// Checks that the record region and every table lie inside a file of `size` bytes.
    pub fn validate(&self, size: u64) -> Result<()> {
        let data_end = self.data_end();
        if data_end < HEADER_SIZE || data_end > size {
            return Err(Error::Corruption(format!(
                "record region ends at {} outside [{}, {}]",
                data_end, HEADER_SIZE, size
            )));
        }
        for (bucket, table) in self.tables.iter().enumerate() {
            match table.end() {
                Some(end) if table.offset >= HEADER_SIZE && end <= size => {}
                _ => {
                    return Err(Error::Corruption(format!(
                        "table {} ({} slots at {}) exceeds file size {}",
                        bucket, table.length, table.offset, size
                    )))
                }
            }
        }
        Ok(())
    }
}
