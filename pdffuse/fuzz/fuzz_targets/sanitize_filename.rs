#![no_main]

use libfuzzer_sys::fuzz_target;
use pdffuse::naming::sanitize_filename;
use pdffuse::utils::{parse_number_list, parse_size};

fuzz_target!(|data: &[u8]| {
    let s = String::from_utf8_lossy(data);

    let name = sanitize_filename(&s);
    assert!(name.to_lowercase().ends_with(".pdf"));
    assert!(!name.contains(['/', '\\']));

    let _ = parse_size(&s);
    let _ = parse_number_list(&s);
});
