#![no_main]

use libfuzzer_sys::fuzz_target;
use pdffuse::compress::{LopdfRepacker, Repacker};
use pdffuse::io::PdfReader;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must be rejected with an error, never a panic.
    if let Ok(source) = PdfReader::new().parse("fuzz.pdf", data) {
        assert!(source.page_count > 0);
    }

    if let Ok(repacked) = LopdfRepacker::new().repack(data) {
        assert!(!repacked.is_empty());
    }
});
