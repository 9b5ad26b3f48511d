#![no_main]

use libfuzzer_sys::fuzz_target;
use offboard_pipeline::intent::{parse_model_json, ExtractedIntent};

fuzz_target!(|data: &[u8]| {
    let raw = String::from_utf8_lossy(data);
    if let Some(object) = parse_model_json(&raw) {
        let intent = ExtractedIntent::from_json_object(&object);
        assert!(!intent.systems.is_empty());
    }
});
