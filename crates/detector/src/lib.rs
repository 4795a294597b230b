//! ransomwatch 탐지 파이프라인
//!
//! 로컬에 저장된 DNS 쿼리 로그와 프록시/방화벽 로그를 읽어
//! 랜섬웨어 C2 통신과 대용량 데이터 유출 지표를 탐지합니다.
//!
//! # 모듈 구성
//!
//! - [`blocklist`]: 로컬 목록 / 원격 hosts 피드에서 C2 도메인 차단 목록 로드
//! - [`parser`]: DNS/프록시 로그 라인 문법, 스킵 리포트, 탐지 규칙
//! - [`alert`]: 알림 집계 및 심각도 집계
//! - [`sink`]: 알림 CSV 직렬화/역직렬화
//! - [`pipeline`]: 한 번의 탐지 실행 오케스트레이션
//! - [`config`]: 탐지기 설정 (core 설정 확장)
//! - [`error`]: 도메인 에러 타입
//!
//! # 아키텍처
//!
//! ```text
//! BlocklistProvider -> DnsLogParser ----+
//!                                       +-> aggregate -> CSV sink
//!                      ProxyLogParser --+
//! ```

pub mod alert;
pub mod blocklist;
pub mod config;
pub mod error;
pub mod parser;
pub mod pipeline;
pub mod sink;

// --- 주요 타입 re-export ---

// 파이프라인
pub use pipeline::{DetectionPipeline, RunSummary};

// 설정
pub use config::{DetectorConfig, DetectorConfigBuilder};

// 에러
pub use error::DetectorError;

// 차단 목록
pub use blocklist::{Blocklist, BlocklistProvider, BlocklistSource};

// 파서
pub use parser::{
    DnsLogParser, LineError, LineGrammar, ParseOutcome, ParseStats, ProxyLogParser, SkipReport,
    parse_dns_logs, parse_proxy_logs,
};

// 알림
pub use alert::{AlertCollection, SeverityCounts, aggregate};

// 출력
pub use sink::{AlertRow, read_alerts, write_alerts};
