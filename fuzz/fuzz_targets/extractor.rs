#![no_main]

use libfuzzer_sys::fuzz_target;

use pagesnip::extractor::{ExtractOptions, StopPolicy, extract_reader};

fuzz_target!(|data: &[u8]| {
    // Raw bytes go straight in; invalid UTF-8 is replaced, never rejected
    for stop in [StopPolicy::AtBody, StopPolicy::HeadResolved] {
        let _ = extract_reader(data, ExtractOptions::with_stop(stop));
    }
});
