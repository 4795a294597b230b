#![no_main]

use libfuzzer_sys::fuzz_target;
use ransomwatch_detector::parser::{LineGrammar, ProxyGrammar, extract_destination};

fuzz_target!(|data: &[u8]| {
    let line = String::from_utf8_lossy(data);

    let _ = ProxyGrammar.parse_line(&line);

    // 목적지 추출은 입력의 부분 문자열만 반환해야 한다
    let destination = extract_destination(&line);
    assert!(line.contains(destination));
});
