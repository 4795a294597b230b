//! 프록시/방화벽 접근 로그 파서
//!
//! # 라인 형식
//! ```text
//! DATE TIME IP:PORT RESULT STATUS METHOD URL PEER BYTES ...
//! 2024-01-01 12:05:00 10.0.0.7:50432 TCP_MISS 200 POST http://evil.com/upload - 6000000
//! ```
//!
//! 공백으로 분리한 필드가 9개 이상이고 8번 필드가 음이 아닌 정수인 라인만 유효합니다.
//! 전송량이 임계값을 초과하면 `Large File Transfer` 알림을 생성합니다.

use std::path::Path;

use serde::Serialize;
use tokio::io::AsyncBufRead;

use ransomwatch_core::types::Alert;

use super::{LineError, LineGrammar, ParseOutcome, scan_file, scan_lines};
use crate::config::{DEFAULT_LARGE_TRANSFER_THRESHOLD, DEFAULT_MAX_SKIP_SAMPLES};
use crate::error::DetectorError;

/// 유효한 라인의 최소 필드 수
const MIN_FIELDS: usize = 9;

/// URL 필드 위치
const URL_INDEX: usize = 6;

/// 전송 바이트 필드 위치
const BYTES_INDEX: usize = 8;

/// 프록시 접근 레코드
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProxyRecord {
    /// 날짜와 시각 (공백으로 연결)
    pub timestamp: String,
    /// 클라이언트 IP (`:포트` 제거)
    pub client_ip: String,
    /// 목적지 도메인
    pub destination: String,
    /// 전송 바이트 수
    pub bytes_transferred: u64,
}

/// URL 필드에서 목적지 도메인을 추출합니다.
///
/// 1. `http://`로 시작하면 스킴 다음 `/` 전까지
/// 2. `/`를 포함하면 첫 `/` 전까지
/// 3. 그 외에는 필드 그대로
///
/// `https://` 같은 다른 스킴은 2번 규칙을 따르므로 `https:`가 됩니다.
pub fn extract_destination(url: &str) -> &str {
    if url.starts_with("http://") {
        url.split('/').nth(2).unwrap_or_default()
    } else if let Some((host, _)) = url.split_once('/') {
        host
    } else {
        url
    }
}

/// 프록시 로그 라인 문법
#[derive(Debug, Clone, Copy, Default)]
pub struct ProxyGrammar;

impl LineGrammar for ProxyGrammar {
    type Record = ProxyRecord;

    fn format_name(&self) -> &'static str {
        "proxy"
    }

    fn parse_line(&self, line: &str) -> Result<ProxyRecord, LineError> {
        let fields: Vec<&str> = line.split_whitespace().collect();

        if fields.len() < MIN_FIELDS {
            return Err(LineError::TooFewFields {
                expected: MIN_FIELDS,
                found: fields.len(),
            });
        }

        let bytes_transferred: u64 = fields[BYTES_INDEX]
            .parse()
            .map_err(|_| LineError::InvalidByteCount(fields[BYTES_INDEX].to_owned()))?;

        // "10.0.0.7:50432" -> "10.0.0.7"
        let client_ip = fields[2].split(':').next().unwrap_or_default();

        Ok(ProxyRecord {
            timestamp: format!("{} {}", fields[0], fields[1]),
            client_ip: client_ip.to_owned(),
            destination: extract_destination(fields[URL_INDEX]).to_owned(),
            bytes_transferred,
        })
    }
}

/// 프록시 로그 탐지기
#[derive(Debug, Clone)]
pub struct ProxyLogParser {
    threshold_bytes: u64,
    max_skip_samples: usize,
}

impl ProxyLogParser {
    /// 대용량 전송 임계값으로 새 파서를 생성합니다.
    pub fn new(threshold_bytes: u64) -> Self {
        Self {
            threshold_bytes,
            max_skip_samples: DEFAULT_MAX_SKIP_SAMPLES,
        }
    }

    /// 스킵 라인 샘플 수를 설정합니다.
    pub fn with_max_skip_samples(mut self, n: usize) -> Self {
        self.max_skip_samples = n;
        self
    }

    /// 대용량 전송 임계값
    pub fn threshold_bytes(&self) -> u64 {
        self.threshold_bytes
    }

    /// 전송량이 임계값을 초과하면 알림을 생성합니다. 임계값과 같으면 알림이 없습니다.
    pub fn detect(&self, record: ProxyRecord) -> Option<Alert> {
        if record.bytes_transferred <= self.threshold_bytes {
            return None;
        }

        tracing::debug!(
            client_ip = %record.client_ip,
            destination = %record.destination,
            bytes = record.bytes_transferred,
            "large file transfer"
        );
        Some(Alert::large_file_transfer(
            record.timestamp,
            record.client_ip,
            record.destination,
            record.bytes_transferred,
        ))
    }

    /// 리더에서 프록시 로그를 읽어 탐지합니다.
    pub async fn parse_reader<R>(&self, reader: R) -> std::io::Result<ParseOutcome>
    where
        R: AsyncBufRead + Unpin,
    {
        scan_lines(&ProxyGrammar, reader, self.max_skip_samples, |record| {
            self.detect(record)
        })
        .await
    }

    /// 프록시 로그 파일을 읽어 탐지합니다.
    ///
    /// 파일이 없으면 빈 결과를 반환합니다.
    pub async fn parse_file(&self, path: impl AsRef<Path>) -> Result<ParseOutcome, DetectorError> {
        scan_file(&ProxyGrammar, path.as_ref(), self.max_skip_samples, |record| {
            self.detect(record)
        })
        .await
    }
}

impl Default for ProxyLogParser {
    fn default() -> Self {
        Self::new(DEFAULT_LARGE_TRANSFER_THRESHOLD)
    }
}

/// 프록시 로그 파일에서 기본 임계값(5,000,000 바이트)으로 대용량 전송 알림을 수집합니다.
///
/// 파일이 없으면 빈 목록을 반환합니다.
pub async fn parse_proxy_logs(path: impl AsRef<Path>) -> Result<Vec<Alert>, DetectorError> {
    let outcome = ProxyLogParser::default().parse_file(path).await?;
    Ok(outcome.alerts)
}
