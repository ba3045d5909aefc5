#![no_main]

use arbitrary::Arbitrary;
use cdb64::{CdbReader, CdbWriter};
use libfuzzer_sys::fuzz_target;
use std::io::Cursor;

#[derive(Arbitrary, Debug)]
struct Input {
    pairs: Vec<(Vec<u8>, Vec<u8>)>,
}

fuzz_target!(|input: Input| {
    let mut writer = CdbWriter::new(Cursor::new(Vec::new())).unwrap();
    for (key, value) in &input.pairs {
        writer.put(key, value).unwrap();
    }
    let data = writer.into_inner().unwrap().into_inner();
    let reader = CdbReader::new(data).unwrap();

    // The first put of each key wins.
    for (i, (key, value)) in input.pairs.iter().enumerate() {
        if input.pairs[..i].iter().all(|(k, _)| k != key) {
            assert_eq!(reader.get(key).unwrap().as_ref(), Some(value));
        }
    }

    let scanned: Vec<_> = reader.entries().map(|e| e.unwrap()).collect();
    assert_eq!(scanned, input.pairs);
});
