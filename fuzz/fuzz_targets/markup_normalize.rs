#![no_main]

use libfuzzer_sys::fuzz_target;
use offboard_pipeline::normalize_markup;

fuzz_target!(|data: &[u8]| {
    let raw = String::from_utf8_lossy(data);
    let once = normalize_markup(&raw);
    assert_eq!(normalize_markup(&once), once);
});
