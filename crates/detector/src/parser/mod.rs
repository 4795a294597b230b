//! 로그 파싱 모듈 -- DNS 쿼리 로그와 프록시 로그의 라인 문법 및 탐지 스캔
//!
//! 각 로그 형식은 [`LineGrammar`]를 구현하여 한 줄을 레코드로 변환합니다.
//! [`scan_lines`]는 문법과 탐지 클로저를 받아 파일 전체를 한 줄씩 처리하며,
//! 형식이 맞지 않는 라인은 건너뛰고 [`SkipReport`]에 기록합니다.
//!
//! # 지원 형식
//! - BIND 스타일 DNS 쿼리 로그 ([`DnsLogParser`])
//! - 공백 구분 프록시/방화벽 로그 ([`ProxyLogParser`])
//!
//! # 사용 예시
//! ```ignore
//! use ransomwatch_detector::parser::DnsLogParser;
//!
//! let parser = DnsLogParser::new(&blocklist);
//! let outcome = parser.parse_file("data/sample_dns.log").await?;
//! for alert in &outcome.alerts {
//!     println!("{alert}");
//! }
//! ```

pub mod dns;
pub mod proxy;

pub use dns::{DnsGrammar, DnsLogParser, DnsRecord, parse_dns_logs};
pub use proxy::{ProxyGrammar, ProxyLogParser, ProxyRecord, extract_destination, parse_proxy_logs};

use std::path::Path;

use metrics::counter;
use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use ransomwatch_core::metrics as m;
use ransomwatch_core::types::Alert;

use crate::error::DetectorError;

/// 한 줄 파싱 실패 사유
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(rename_all = "snake_case")]
pub enum LineError {
    /// 필드 수 부족
    #[error("expected at least {expected} fields, found {found}")]
    TooFewFields { expected: usize, found: usize },

    /// 고정 위치의 표식 필드 불일치
    #[error("expected '{expected}' at field {index}, found '{found}'")]
    MissingMarker {
        expected: &'static str,
        index: usize,
        found: String,
    },

    /// 전송 바이트 필드가 정수가 아님
    #[error("invalid byte count: '{0}'")]
    InvalidByteCount(String),
}

/// 라인 문법 -- 로그 한 줄을 형식별 레코드로 변환합니다.
///
/// 구현체는 상태를 갖지 않으며, 같은 입력에 항상 같은 결과를 반환해야 합니다.
pub trait LineGrammar {
    /// 파싱된 레코드 타입
    type Record;

    /// 로그 형식 이름 (로그와 메트릭 레이블에 사용)
    fn format_name(&self) -> &'static str;

    /// 한 줄을 파싱합니다. 라인 끝 개행은 제거된 상태로 전달됩니다.
    fn parse_line(&self, line: &str) -> Result<Self::Record, LineError>;
}

/// 건너뛴 라인 샘플
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedLine {
    /// 1부터 시작하는 라인 번호
    pub line_number: usize,
    /// 실패 사유
    pub reason: LineError,
    /// 라인 원문
    pub line: String,
}

/// 파일 하나에서 건너뛴 라인 보고서
///
/// 전체 건수는 모두 세고, 원문 샘플은 최대 `max_samples`개만 보관합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkipReport {
    format: &'static str,
    max_samples: usize,
    skipped: usize,
    samples: Vec<SkippedLine>,
}

impl SkipReport {
    /// 빈 보고서를 생성합니다.
    pub fn new(format: &'static str, max_samples: usize) -> Self {
        Self {
            format,
            max_samples,
            skipped: 0,
            samples: Vec::new(),
        }
    }

    /// 건너뛴 라인을 기록합니다.
    pub fn record(&mut self, line_number: usize, reason: LineError, line: &str) {
        self.skipped = self.skipped.saturating_add(1);
        if self.samples.len() < self.max_samples {
            self.samples.push(SkippedLine {
                line_number,
                reason,
                line: line.to_owned(),
            });
        }
    }

    /// 로그 형식 이름
    pub fn format(&self) -> &'static str {
        self.format
    }

    /// 건너뛴 라인 수
    pub fn count(&self) -> usize {
        self.skipped
    }

    /// 보관된 샘플
    pub fn samples(&self) -> &[SkippedLine] {
        &self.samples
    }

    /// 건너뛴 라인이 없는지 여부
    pub fn is_empty(&self) -> bool {
        self.skipped == 0
    }
}

/// 파일 하나의 파싱 통계
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseStats {
    /// 로그 형식 이름
    pub format: &'static str,
    /// 파일 존재 여부 (없으면 나머지 값은 모두 0)
    pub file_found: bool,
    /// 읽은 라인 수
    pub lines_read: usize,
    /// 파싱에 성공한 레코드 수
    pub records_parsed: usize,
    /// 건너뛴 라인 보고서
    pub skipped: SkipReport,
}

impl ParseStats {
    fn new(format: &'static str, max_samples: usize) -> Self {
        Self {
            format,
            file_found: true,
            lines_read: 0,
            records_parsed: 0,
            skipped: SkipReport::new(format, max_samples),
        }
    }

    /// 파일이 없을 때의 통계
    pub fn missing(format: &'static str, max_samples: usize) -> Self {
        Self {
            file_found: false,
            ..Self::new(format, max_samples)
        }
    }
}

/// 로그 파일 하나의 탐지 결과
#[derive(Debug, Clone)]
pub struct ParseOutcome {
    /// 라인 순서대로 생성된 알림
    pub alerts: Vec<Alert>,
    /// 파싱 통계
    pub stats: ParseStats,
}

impl ParseOutcome {
    /// 알림과 통계로 분리합니다.
    pub fn into_parts(self) -> (Vec<Alert>, ParseStats) {
        (self.alerts, self.stats)
    }
}

/// 라인 끝의 `\n`과 `\r`을 제거합니다.
fn trim_line_ending(mut line: &[u8]) -> &[u8] {
    if let Some(rest) = line.strip_suffix(b"\n") {
        line = rest;
    }
    if let Some(rest) = line.strip_suffix(b"\r") {
        line = rest;
    }
    line
}

/// 리더에서 한 줄씩 읽어 문법으로 파싱하고 탐지 클로저를 적용합니다.
///
/// UTF-8이 아닌 바이트는 대체 문자로 치환합니다. 파싱에 실패한 라인은
/// 경고 로그를 남기고 건너뛰며, 처리는 계속됩니다.
/// 알림은 라인 순서대로 반환됩니다.
pub async fn scan_lines<G, R, F>(
    grammar: &G,
    mut reader: R,
    max_samples: usize,
    mut detect: F,
) -> std::io::Result<ParseOutcome>
where
    G: LineGrammar,
    R: AsyncBufRead + Unpin,
    F: FnMut(G::Record) -> Option<Alert>,
{
    let format = grammar.format_name();
    let mut stats = ParseStats::new(format, max_samples);
    let mut alerts = Vec::new();
    let mut buf = Vec::with_capacity(256);

    loop {
        buf.clear();
        let n = reader.read_until(b'\n', &mut buf).await?;
        if n == 0 {
            break;
        }
        stats.lines_read += 1;
        let line_number = stats.lines_read;
        let line = String::from_utf8_lossy(trim_line_ending(&buf));

        match grammar.parse_line(&line) {
            Ok(record) => {
                stats.records_parsed += 1;
                if let Some(alert) = detect(record) {
                    counter!(
                        m::ALERTS_GENERATED_TOTAL,
                        m::LABEL_ALERT_TYPE => alert.alert_type().as_str()
                    )
                    .increment(1);
                    alerts.push(alert);
                }
            }
            Err(reason) => {
                tracing::warn!(
                    format,
                    line_number,
                    reason = %reason,
                    "skipping malformed log line"
                );
                stats.skipped.record(line_number, reason, &line);
            }
        }
    }

    counter!(m::LINES_READ_TOTAL, m::LABEL_LOG_FORMAT => format).increment(stats.lines_read as u64);
    counter!(m::LINES_SKIPPED_TOTAL, m::LABEL_LOG_FORMAT => format)
        .increment(stats.skipped.count() as u64);

    Ok(ParseOutcome { alerts, stats })
}

/// 로그 파일을 열어 [`scan_lines`]를 적용합니다.
///
/// 파일이 없으면 경고 로그를 남기고 빈 결과를 반환합니다.
/// 그 외의 읽기 에러는 [`DetectorError::LogRead`]로 반환합니다.
pub async fn scan_file<G, F>(
    grammar: &G,
    path: &Path,
    max_samples: usize,
    detect: F,
) -> Result<ParseOutcome, DetectorError>
where
    G: LineGrammar,
    F: FnMut(G::Record) -> Option<Alert>,
{
    let format = grammar.format_name();
    let read_err = |e: std::io::Error| DetectorError::LogRead {
        path: path.display().to_string(),
        reason: e.to_string(),
    };

    let file = match tokio::fs::File::open(path).await {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(format, path = %path.display(), "log file not found, skipping");
            return Ok(ParseOutcome {
                alerts: Vec::new(),
                stats: ParseStats::missing(format, max_samples),
            });
        }
        Err(e) => return Err(read_err(e)),
    };

    let outcome = scan_lines(grammar, BufReader::new(file), max_samples, detect)
        .await
        .map_err(read_err)?;

    tracing::info!(
        format,
        path = %path.display(),
        lines = outcome.stats.lines_read,
        skipped = outcome.stats.skipped.count(),
        alerts = outcome.alerts.len(),
        "scanned log file"
    );

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 테스트용 문법: 정수 한 개로 이루어진 라인만 허용
    struct NumberGrammar;

    impl LineGrammar for NumberGrammar {
        type Record = u64;

        fn format_name(&self) -> &'static str {
            "number"
        }

        fn parse_line(&self, line: &str) -> Result<u64, LineError> {
            line.trim()
                .parse()
                .map_err(|_| LineError::InvalidByteCount(line.to_owned()))
        }
    }

    fn big_number_alert(n: u64) -> Option<Alert> {
        (n > 10).then(|| Alert::large_file_transfer("t", "1.1.1.1", "x.com", n))
    }

    #[test]
    fn skip_report_caps_samples() {
        let mut report = SkipReport::new("dns", 2);
        for i in 1..=5 {
            report.record(i, LineError::InvalidByteCount("x".to_owned()), "x");
        }
        assert_eq!(report.count(), 5);
        assert_eq!(report.samples().len(), 2);
        assert_eq!(report.samples()[1].line_number, 2);
    }

    #[test]
    fn skip_report_zero_samples_still_counts() {
        let mut report = SkipReport::new("proxy", 0);
        report.record(1, LineError::InvalidByteCount("x".to_owned()), "x");
        assert_eq!(report.count(), 1);
        assert!(report.samples().is_empty());
        assert!(!report.is_empty());
    }

    #[test]
    fn line_error_messages() {
        let err = LineError::TooFewFields {
            expected: 8,
            found: 3,
        };
        assert_eq!(err.to_string(), "expected at least 8 fields, found 3");

        let err = LineError::MissingMarker {
            expected: "query:",
            index: 4,
            found: "foo".to_owned(),
        };
        assert!(err.to_string().contains("query:"));
    }

    #[test]
    fn trim_line_ending_handles_crlf() {
        assert_eq!(trim_line_ending(b"abc\r\n"), b"abc");
        assert_eq!(trim_line_ending(b"abc\n"), b"abc");
        assert_eq!(trim_line_ending(b"abc"), b"abc");
    }

    #[tokio::test]
    async fn scan_lines_preserves_order_and_skips() {
        let input: &[u8] = b"20\nnope\n5\n30\r\n\n11";
        let outcome = scan_lines(&NumberGrammar, input, 10, big_number_alert)
            .await
            .unwrap();

        let bytes: Vec<u64> = outcome
            .alerts
            .iter()
            .filter_map(Alert::bytes_transferred)
            .collect();
        assert_eq!(bytes, vec![20, 30, 11]);
        assert_eq!(outcome.stats.lines_read, 6);
        assert_eq!(outcome.stats.records_parsed, 4);
        assert_eq!(outcome.stats.skipped.count(), 2);
        assert_eq!(outcome.stats.skipped.samples()[0].line_number, 2);
        assert_eq!(outcome.stats.skipped.samples()[1].line_number, 5);
    }

    #[tokio::test]
    async fn scan_lines_replaces_invalid_utf8() {
        let input: &[u8] = b"\xff\xfe\n42\n";
        let outcome = scan_lines(&NumberGrammar, input, 10, big_number_alert)
            .await
            .unwrap();
        assert_eq!(outcome.alerts.len(), 1);
        assert_eq!(outcome.stats.skipped.count(), 1);
        assert!(outcome.stats.skipped.samples()[0].line.contains('\u{FFFD}'));
    }

    #[tokio::test]
    async fn scan_file_missing_returns_empty_outcome() {
        let outcome = scan_file(
            &NumberGrammar,
            Path::new("/nonexistent/ransomwatch/number.log"),
            10,
            big_number_alert,
        )
        .await
        .unwrap();
        assert!(outcome.alerts.is_empty());
        assert!(!outcome.stats.file_found);
        assert_eq!(outcome.stats.lines_read, 0);
    }

    #[tokio::test]
    async fn scan_file_directory_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = scan_file(&NumberGrammar, dir.path(), 10, big_number_alert).await;
        assert!(matches!(result, Err(DetectorError::LogRead { .. })));
    }
}
