#![no_main]

use firebird_image::TcUrl;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(url) = TcUrl::parse(s) {
            let _ = url.image_reference();
            let _ = url.to_config();
        }
    }
});
