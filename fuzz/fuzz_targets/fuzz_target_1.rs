#![no_main]
#[macro_use] extern crate libfuzzer_sys;
extern crate gga_fix;

use std::str;

fuzz_target!(|data: &[u8]| {
    if let Ok(sentence) = str::from_utf8(data) {
        let _ = gga_fix::parse_gga(sentence);
    }
});
