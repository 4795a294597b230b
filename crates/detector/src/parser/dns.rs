//! BIND 스타일 DNS 쿼리 로그 파서
//!
//! # 라인 형식
//! ```text
//! DATE TIME client IP#PORT query: DOMAIN CLASS TYPE ...
//! 2024-01-01 12:00:00 client 10.0.0.5#53 query: malicious-c2-domain.com IN A
//! ```
//!
//! 공백으로 분리한 필드가 8개 이상이고 4번 필드가 `query:`인 라인만 유효합니다.
//! 조회 도메인이 차단 목록에 있으면 `C2 Domain Match` 알림을 생성합니다.

use std::path::Path;

use serde::Serialize;
use tokio::io::AsyncBufRead;

use ransomwatch_core::types::Alert;

use super::{LineError, LineGrammar, ParseOutcome, scan_file, scan_lines};
use crate::blocklist::Blocklist;
use crate::config::DEFAULT_MAX_SKIP_SAMPLES;
use crate::error::DetectorError;

/// 유효한 라인의 최소 필드 수
const MIN_FIELDS: usize = 8;

/// 쿼리 표식 필드 위치
const MARKER_INDEX: usize = 4;

/// 쿼리 표식
const QUERY_MARKER: &str = "query:";

/// DNS 쿼리 레코드
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DnsRecord {
    /// 날짜와 시각 (공백으로 연결)
    pub timestamp: String,
    /// 클라이언트 IP (`#포트` 제거)
    pub client_ip: String,
    /// 조회 도메인
    pub domain: String,
}

/// DNS 쿼리 로그 라인 문법
#[derive(Debug, Clone, Copy, Default)]
pub struct DnsGrammar;

impl LineGrammar for DnsGrammar {
    type Record = DnsRecord;

    fn format_name(&self) -> &'static str {
        "dns"
    }

    fn parse_line(&self, line: &str) -> Result<DnsRecord, LineError> {
        let fields: Vec<&str> = line.split_whitespace().collect();

        if fields.len() < MIN_FIELDS {
            return Err(LineError::TooFewFields {
                expected: MIN_FIELDS,
                found: fields.len(),
            });
        }

        if fields[MARKER_INDEX] != QUERY_MARKER {
            return Err(LineError::MissingMarker {
                expected: QUERY_MARKER,
                index: MARKER_INDEX,
                found: fields[MARKER_INDEX].to_owned(),
            });
        }

        // "10.0.0.5#53" -> "10.0.0.5"
        let client_ip = fields[3].split('#').next().unwrap_or_default();

        Ok(DnsRecord {
            timestamp: format!("{} {}", fields[0], fields[1]),
            client_ip: client_ip.to_owned(),
            domain: fields[5].to_owned(),
        })
    }
}

/// DNS 로그 탐지기
///
/// 차단 목록 스냅샷을 빌려 쓰며, 실행 중에는 변경하지 않습니다.
pub struct DnsLogParser<'a> {
    blocklist: &'a Blocklist,
    max_skip_samples: usize,
}

impl<'a> DnsLogParser<'a> {
    /// 차단 목록으로 새 파서를 생성합니다.
    pub fn new(blocklist: &'a Blocklist) -> Self {
        Self {
            blocklist,
            max_skip_samples: DEFAULT_MAX_SKIP_SAMPLES,
        }
    }

    /// 스킵 라인 샘플 수를 설정합니다.
    pub fn with_max_skip_samples(mut self, n: usize) -> Self {
        self.max_skip_samples = n;
        self
    }

    /// 레코드가 차단 목록 도메인을 조회했으면 알림을 생성합니다.
    pub fn detect(&self, record: DnsRecord) -> Option<Alert> {
        if !self.blocklist.contains(&record.domain) {
            return None;
        }

        tracing::debug!(
            client_ip = %record.client_ip,
            domain = %record.domain,
            "C2 domain match"
        );
        Some(Alert::c2_domain_match(
            record.timestamp,
            record.client_ip,
            record.domain,
        ))
    }

    /// 리더에서 DNS 로그를 읽어 탐지합니다.
    pub async fn parse_reader<R>(&self, reader: R) -> std::io::Result<ParseOutcome>
    where
        R: AsyncBufRead + Unpin,
    {
        scan_lines(&DnsGrammar, reader, self.max_skip_samples, |record| {
            self.detect(record)
        })
        .await
    }

    /// DNS 로그 파일을 읽어 탐지합니다.
    ///
    /// 파일이 없으면 빈 결과를 반환합니다.
    pub async fn parse_file(&self, path: impl AsRef<Path>) -> Result<ParseOutcome, DetectorError> {
        scan_file(&DnsGrammar, path.as_ref(), self.max_skip_samples, |record| {
            self.detect(record)
        })
        .await
    }
}

/// DNS 로그 파일에서 C2 도메인 매칭 알림을 수집합니다.
///
/// 파일이 없으면 빈 목록을 반환합니다.
pub async fn parse_dns_logs(
    path: impl AsRef<Path>,
    blocklist: &Blocklist,
) -> Result<Vec<Alert>, DetectorError> {
    let outcome = DnsLogParser::new(blocklist).parse_file(path).await?;
    Ok(outcome.alerts)
}
