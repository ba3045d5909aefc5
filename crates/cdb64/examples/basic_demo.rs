//! Builds a small database, freezes it and reads it back.
//!
//! Run with: cargo run -p cdb64 --example basic_demo

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::temp_dir().join("cdb64-example.cdb");

    println!("=== cdb64 Demo ===\n");

    // Write some key/value pairs.
    let mut writer = cdb64::create(&path)?;
    writer.put(b"Alice", b"Hoax")?;
    writer.put(b"Bob", b"Hope")?;
    writer.put(b"Charlie", b"Horse")?;
    println!("Wrote {} records to {}", writer.entry_count(), path.display());

    // Freeze and re-open it for reading.
    let db = writer.freeze()?;

    // Fetch a value.
    if let Some(value) = db.get(b"Alice")? {
        println!("Alice => {}", String::from_utf8_lossy(&value));
    }

    // Repeated lookups through one buffer.
    let mut batch = db.batch();
    for key in [&b"Bob"[..], &b"Charlie"[..], &b"Dave"[..]] {
        match batch.get(key)? {
            Some(value) => println!(
                "{} => {}",
                String::from_utf8_lossy(key),
                String::from_utf8_lossy(value)
            ),
            None => println!("{} => (not found)", String::from_utf8_lossy(key)),
        }
    }

    // Scan in write order.
    println!("\nAll records:");
    let mut iter = db.iter();
    while iter.next() {
        println!(
            "  {} => {}",
            String::from_utf8_lossy(iter.key()),
            String::from_utf8_lossy(iter.value())
        );
    }
    if let Some(err) = iter.err() {
        return Err(err.to_string().into());
    }

    db.close()?;
    std::fs::remove_file(&path)?;
    Ok(())
}
