//! Fuzz target for catalog JSON parsing.
//!
//! This fuzzer feeds arbitrary byte sequences to the catalog parser,
//! checking for panics, crashes, or hangs while references are validated.

#![no_main]

use annoreport::store::io_json::from_catalog_json_slice;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    let _ = from_catalog_json_slice(data);
});
