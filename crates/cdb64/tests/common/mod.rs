// Common test utilities for cdb64 integration tests

use cdb64::CdbWriter;
use std::fs::File;
use std::path::PathBuf;
use tempfile::TempDir;

/// Test fixture owning a temporary directory with one database path
pub struct CdbTestFixture {
    #[allow(dead_code)]
    pub temp_dir: TempDir,
    pub db_path: PathBuf,
}

impl CdbTestFixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.cdb");

        Self { temp_dir, db_path }
    }

    pub fn create(&self) -> CdbWriter<File> {
        cdb64::create(&self.db_path).expect("Failed to create database")
    }
}

impl Default for CdbTestFixture {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(dead_code)]
pub fn seed_key(n: u32) -> Vec<u8> {
    format!("key-{:08}", n).into_bytes()
}

#[allow(dead_code)]
pub fn seed_value(n: u32) -> Vec<u8> {
    format!("val-{:08}", n).into_bytes()
}

/// Puts `n` pairs with the odd keys `key-00000001`, `key-00000003`, ...
#[allow(dead_code)]
pub fn seed_data(writer: &mut CdbWriter<File>, n: u32) {
    for i in (1..2 * n).step_by(2) {
        writer
            .put(&seed_key(i), &seed_value(i))
            .expect("Failed to put");
    }
}
