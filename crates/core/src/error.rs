//! 에러 타입 -- 도메인별 에러 정의

/// ransomwatch 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum RansomwatchError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 탐지 파이프라인 에러
    #[error("detection error: {0}")]
    Detection(#[from] DetectionError),

    /// 결과 출력 에러
    #[error("output error: {0}")]
    Output(#[from] OutputError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 탐지 파이프라인 에러
#[derive(Debug, thiserror::Error)]
pub enum DetectionError {
    /// 차단 목록 로딩 실패
    #[error("blocklist error: {0}")]
    Blocklist(String),

    /// 로그 파일 읽기 실패
    #[error("log read failed: {path}: {reason}")]
    LogRead { path: String, reason: String },
}

/// 결과 출력 에러
///
/// 알림 결과를 저장하지 못하는 경우는 실행 전체의 치명적 에러입니다.
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    /// 출력 파일 쓰기 실패
    #[error("failed to write {path}: {reason}")]
    WriteFailed { path: String, reason: String },

    /// 출력 파일 읽기 실패
    #[error("failed to read {path}: {reason}")]
    ReadFailed { path: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_converts_to_top_level() {
        let err: RansomwatchError = ConfigError::FileNotFound {
            path: "ransomwatch.toml".to_owned(),
        }
        .into();
        assert!(matches!(err, RansomwatchError::Config(_)));
        assert!(err.to_string().contains("ransomwatch.toml"));
    }

    #[test]
    fn output_error_display_contains_path() {
        let err = OutputError::WriteFailed {
            path: "/tmp/alerts.csv".to_owned(),
            reason: "permission denied".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/tmp/alerts.csv"));
        assert!(msg.contains("permission denied"));
    }

    #[test]
    fn io_error_converts_to_top_level() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: RansomwatchError = io.into();
        assert!(matches!(err, RansomwatchError::Io(_)));
    }
}
