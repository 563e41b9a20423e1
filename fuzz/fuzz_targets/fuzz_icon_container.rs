#![no_main]

use gotoapp::icon::container::HEADER_LEN;
use gotoapp::icon::{decode_icon_container, parse_chunks};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Malformed containers must surface as errors, never as panics
    if let Ok(chunks) = parse_chunks(data) {
        let walked: usize = chunks.iter().map(|c| c.length as usize).sum();
        assert!(walked + HEADER_LEN <= data.len());
        for chunk in &chunks {
            assert_eq!(chunk.payload.len() + HEADER_LEN, chunk.length as usize);
        }
    }

    if let Ok(Some(icon)) = decode_icon_container(data) {
        // The selected raster is a slice of the input
        assert!(
            data.windows(icon.bytes.len().max(1))
                .any(|window| window == icon.bytes.as_slice())
        );
    }
});
