#![no_main]

use std::path::Path;

use delirium_sim::config::ConfigLoader;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        let _ = ConfigLoader::load_str(text, Path::new("fuzz.yaml"));
    }
});
