#![no_main]

use libfuzzer_sys::fuzz_target;
use ransomwatch_detector::parser::{DnsGrammar, LineGrammar};

fuzz_target!(|data: &[u8]| {
    let line = String::from_utf8_lossy(data);

    // 크래시나 패닉 없이 Ok 또는 Err을 반환해야 한다
    if let Ok(record) = DnsGrammar.parse_line(&line) {
        assert!(!record.domain.is_empty());
    }
});
