#![no_main]

use libfuzzer_sys::fuzz_target;
use rescache::store::path::{normalize, parent_dir};

// Fuzz resource name normalization
//
// Normalized names are idempotent, relative, and free of `.`/`..` segments.
fuzz_target!(|data: &[u8]| {
    let Ok(path) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(normalized) = normalize(path) else {
        return;
    };

    assert_eq!(normalize(&normalized).unwrap(), normalized);
    assert!(!normalized.starts_with('/'));
    assert!(!normalized.contains('\\'));
    for segment in normalized.split('/') {
        assert!(!segment.is_empty());
        assert!(segment != "." && segment != "..");
    }
    assert!(normalized.starts_with(parent_dir(&normalized)));
});
