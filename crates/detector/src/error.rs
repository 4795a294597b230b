//! 탐지기 에러 타입
//!
//! [`DetectorError`]는 탐지 파이프라인 내부에서 발생하는 모든 에러를 표현합니다.
//! `From<DetectorError> for RansomwatchError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 자연스럽게 전파할 수 있습니다.
//!
//! 입력 데이터 문제(누락된 파일, 형식 오류 라인, 원격 피드 실패)는 대부분
//! 파이프라인 내부에서 복구되며, 호출자까지 올라오는 것은 설정 오류와
//! 결과 저장 실패입니다.

use ransomwatch_core::error::{ConfigError, DetectionError, OutputError, RansomwatchError};

/// 탐지기 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum DetectorError {
    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// 로그 파일 읽기 실패 (파일 없음 제외)
    #[error("log read error: {path}: {reason}")]
    LogRead {
        /// 로그 파일 경로
        path: String,
        /// 실패 사유
        reason: String,
    },

    /// 원격 차단 목록 피드 요청 실패
    #[error("blocklist fetch error: {url}: {reason}")]
    Fetch {
        /// 피드 URL
        url: String,
        /// 실패 사유
        reason: String,
    },

    /// 알림 결과 저장 실패
    #[error("output write error: {path}: {reason}")]
    OutputWrite {
        /// 출력 파일 경로
        path: String,
        /// 실패 사유
        reason: String,
    },

    /// 알림 결과 읽기 실패
    #[error("output read error: {path}: {reason}")]
    OutputRead {
        /// 출력 파일 경로
        path: String,
        /// 실패 사유
        reason: String,
    },

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<DetectorError> for RansomwatchError {
    fn from(err: DetectorError) -> Self {
        match err {
            DetectorError::Config { field, reason } => {
                RansomwatchError::Config(ConfigError::InvalidValue { field, reason })
            }
            DetectorError::LogRead { path, reason } => {
                RansomwatchError::Detection(DetectionError::LogRead { path, reason })
            }
            DetectorError::Fetch { url, reason } => {
                RansomwatchError::Detection(DetectionError::Blocklist(format!("{url}: {reason}")))
            }
            DetectorError::OutputWrite { path, reason } => {
                RansomwatchError::Output(OutputError::WriteFailed { path, reason })
            }
            DetectorError::OutputRead { path, reason } => {
                RansomwatchError::Output(OutputError::ReadFailed { path, reason })
            }
            DetectorError::Io(e) => RansomwatchError::Io(e),
        }
    }
}
