//! ransomwatch 공통 타입, 에러, 설정
//!
//! - [`types`]: 알림 도메인 타입 (`Alert`, `AlertType`, `Severity`)
//! - [`error`]: 에러 분류 체계
//! - [`config`]: `ransomwatch.toml` 설정 및 환경변수 오버라이드
//! - [`metrics`]: 메트릭 이름 상수

pub mod config;
pub mod error;
pub mod metrics;
pub mod types;

// --- 주요 타입 re-export ---

// 에러
pub use error::{ConfigError, DetectionError, OutputError, RansomwatchError};

// 설정
pub use config::RansomwatchConfig;

// 도메인 타입
pub use types::{Alert, AlertKind, AlertType, Severity};
