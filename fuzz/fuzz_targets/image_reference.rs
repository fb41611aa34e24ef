#![no_main]

use firebird_image::{ImageReference, resolve_variant};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // Resolution must never panic, whatever the input
        let _ = resolve_variant(s);

        if let Ok(reference) = ImageReference::parse(s) {
            // A parsed reference must re-parse to itself
            let reparsed = ImageReference::parse(&reference.to_string());
            assert_eq!(reparsed.as_ref(), Ok(&reference));
        }
    }
});
