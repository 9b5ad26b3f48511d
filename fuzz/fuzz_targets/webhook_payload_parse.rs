#![no_main]

use libfuzzer_sys::fuzz_target;
use offboard_pipeline::IncomingEvent;

fuzz_target!(|data: &[u8]| {
    let Ok(payload) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };
    if let Ok(event) = IncomingEvent::from_payload(&payload) {
        assert!(!event.issue_key.is_empty());
        assert!(!event.issue_key.contains('/'));
    }
});
