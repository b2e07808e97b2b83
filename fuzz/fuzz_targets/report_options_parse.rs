//! Fuzz target for report options.
//!
//! Parses arbitrary input as report options and, when that succeeds,
//! derives the restriction set from it.

#![no_main]

use annoreport::restriction::ReportOptions;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(json) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(options) = ReportOptions::from_json_str(json) {
        let _ = options.restrictions();
    }
});
