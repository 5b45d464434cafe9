#![no_main]
use libfuzzer_sys::fuzz_target;

use covpost::report::{self, Options};

fuzz_target!(|data: &[u8]| {
    // Rendering must not panic on anything the parser accepts.
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(records) = covpost::lcov::parse(s) {
            let options = Options::default();
            let _ = report::diff(&records, None, &options);
        }
    }
});
