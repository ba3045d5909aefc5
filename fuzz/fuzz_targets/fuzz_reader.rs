#![no_main]

use cdb64::CdbReader;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Limit input size
    if data.len() > 10_000_000 {
        return;
    }

    let Ok(reader) = CdbReader::new(data) else {
        return;
    };

    // Lookups and scans may fail on garbage but must not panic or hang.
    let _ = reader.get(b"");
    let _ = reader.get(&data[..data.len().min(16)]);

    let mut batch = reader.batch();
    let _ = batch.get(b"key");

    let mut iter = reader.iter();
    let mut steps = 0;
    while iter.next() && steps < 100_000 {
        steps += 1;
    }
});
