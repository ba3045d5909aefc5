//! Shows the tracing events emitted while building and reading a database.
//!
//! Run with: cargo run -p cdb64 --example logging_demo
//! Set RUST_LOG=trace to also see hash collisions during lookups.

use cdb64::logging::LogConfig;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Debug level shows create, finalize and open events.
    let _guard = LogConfig::debug().init();

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("logging.cdb");

    let mut writer = cdb64::create(&path)?;
    for i in 0..10_000u32 {
        writer.put(format!("user:{}", i).as_bytes(), format!("name-{}", i).as_bytes())?;
    }
    let db = writer.freeze()?;

    let mut batch = db.batch();
    let mut found = 0;
    for i in (0..20_000u32).step_by(7) {
        if batch.get(format!("user:{}", i).as_bytes())?.is_some() {
            found += 1;
        }
    }
    tracing::info!(found, entries = db.entry_count(), "Lookups complete");

    db.close()?;
    Ok(())
}
