#![no_main]

use libfuzzer_sys::fuzz_target;
use rescache::resource::Manifest;

// Fuzz the program manifest parser
//
// The first byte picks a manifest location, the rest is manifest text.
// Parsing must never panic and must never yield commented references.
fuzz_target!(|data: &[u8]| {
    let Some((&selector, text)) = data.split_first() else {
        return;
    };
    let Ok(text) = std::str::from_utf8(text) else {
        return;
    };

    let manifest_name = match selector % 3 {
        0 => "basic.prog",
        1 => "shaders/basic.prog",
        _ => "shaders/nested/dir/basic.prog",
    };
    let manifest = Manifest::parse(manifest_name, text);

    assert!(manifest.shaders().len() <= text.lines().count());
    for reference in manifest.shaders() {
        assert!(!reference.contains('#'));
        assert!(!reference.contains('\n'));
    }
});
