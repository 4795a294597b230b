#![no_main]

use libfuzzer_sys::fuzz_target;
use ransomwatch_detector::blocklist::{parse_domain_list, parse_hosts};

fuzz_target!(|data: &[u8]| {
    let content = String::from_utf8_lossy(data);

    for domain in parse_hosts(&content) {
        assert!(!domain.is_empty());
        assert!(!domain.chars().any(char::is_whitespace));
    }
    for domain in parse_domain_list(&content) {
        assert!(!domain.starts_with('#'));
    }
});
