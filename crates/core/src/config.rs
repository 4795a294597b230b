//! 설정 관리 -- ransomwatch.toml 파싱 및 런타임 설정
//!
//! [`RansomwatchConfig`]는 모든 구성요소의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`RANSOMWATCH_DETECTION_DNS_LOG_PATH=/var/log/dns.log` 형식)
//! 3. 설정 파일 (`ransomwatch.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), ransomwatch_core::error::RansomwatchError> {
//! use ransomwatch_core::config::RansomwatchConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = RansomwatchConfig::load("ransomwatch.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = RansomwatchConfig::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, RansomwatchError};

/// 원격 피드 타임아웃 상한 (초)
const MAX_FETCH_TIMEOUT_SECS: u64 = 300;

/// ransomwatch 통합 설정
///
/// `ransomwatch.toml` 파일의 최상위 구조를 나타냅니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RansomwatchConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 차단 목록 설정
    #[serde(default)]
    pub blocklist: BlocklistConfig,
    /// 탐지 설정
    #[serde(default)]
    pub detection: DetectionConfig,
    /// 결과 출력 설정
    #[serde(default)]
    pub output: OutputConfig,
}

impl RansomwatchConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, RansomwatchError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// 설정 파일이 없으면 기본값으로 대체하여 로드합니다.
    ///
    /// 파일이 존재하지만 파싱에 실패하면 에러를 반환합니다.
    pub async fn load_or_default(path: impl AsRef<Path>) -> Result<Self, RansomwatchError> {
        let path = path.as_ref();
        match Self::load(path).await {
            Err(RansomwatchError::Config(ConfigError::FileNotFound { .. })) => {
                tracing::debug!(
                    path = %path.display(),
                    "config file not found, using defaults"
                );
                let mut config = Self::default();
                config.apply_env_overrides();
                config.validate()?;
                Ok(config)
            }
            other => other,
        }
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, RansomwatchError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                RansomwatchError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                RansomwatchError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, RansomwatchError> {
        toml::from_str(toml_str).map_err(|e| {
            RansomwatchError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `RANSOMWATCH_{SECTION}_{FIELD}`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "RANSOMWATCH_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "RANSOMWATCH_GENERAL_LOG_FORMAT");

        // Blocklist
        override_string(&mut self.blocklist.path, "RANSOMWATCH_BLOCKLIST_PATH");
        override_string(
            &mut self.blocklist.remote_url,
            "RANSOMWATCH_BLOCKLIST_REMOTE_URL",
        );
        override_u64(
            &mut self.blocklist.fetch_timeout_secs,
            "RANSOMWATCH_BLOCKLIST_FETCH_TIMEOUT_SECS",
        );
        override_csv(
            &mut self.blocklist.fallback_domains,
            "RANSOMWATCH_BLOCKLIST_FALLBACK_DOMAINS",
        );

        // Detection
        override_string(
            &mut self.detection.dns_log_path,
            "RANSOMWATCH_DETECTION_DNS_LOG_PATH",
        );
        override_string(
            &mut self.detection.proxy_log_path,
            "RANSOMWATCH_DETECTION_PROXY_LOG_PATH",
        );
        override_u64(
            &mut self.detection.large_transfer_threshold_bytes,
            "RANSOMWATCH_DETECTION_LARGE_TRANSFER_THRESHOLD_BYTES",
        );
        override_usize(
            &mut self.detection.max_skip_samples,
            "RANSOMWATCH_DETECTION_MAX_SKIP_SAMPLES",
        );

        // Output
        override_string(&mut self.output.alerts_path, "RANSOMWATCH_OUTPUT_ALERTS_PATH");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), RansomwatchError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(invalid(
                "general.log_level",
                format!("must be one of: {}", valid_levels.join(", ")),
            ));
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(invalid(
                "general.log_format",
                format!("must be one of: {}", valid_formats.join(", ")),
            ));
        }

        if self.blocklist.path.is_empty() {
            return Err(invalid("blocklist.path", "must not be empty".to_owned()));
        }

        if !self.blocklist.remote_url.is_empty()
            && !(self.blocklist.remote_url.starts_with("http://")
                || self.blocklist.remote_url.starts_with("https://"))
        {
            return Err(invalid(
                "blocklist.remote_url",
                "must start with http:// or https://".to_owned(),
            ));
        }

        if self.blocklist.fetch_timeout_secs == 0
            || self.blocklist.fetch_timeout_secs > MAX_FETCH_TIMEOUT_SECS
        {
            return Err(invalid(
                "blocklist.fetch_timeout_secs",
                format!("must be 1-{MAX_FETCH_TIMEOUT_SECS}"),
            ));
        }

        if self.blocklist.fallback_domains.iter().all(|d| d.trim().is_empty()) {
            return Err(invalid(
                "blocklist.fallback_domains",
                "at least one fallback domain is required".to_owned(),
            ));
        }

        if self.detection.dns_log_path.is_empty() {
            return Err(invalid(
                "detection.dns_log_path",
                "must not be empty".to_owned(),
            ));
        }

        if self.detection.proxy_log_path.is_empty() {
            return Err(invalid(
                "detection.proxy_log_path",
                "must not be empty".to_owned(),
            ));
        }

        if self.output.alerts_path.is_empty() {
            return Err(invalid("output.alerts_path", "must not be empty".to_owned()));
        }

        Ok(())
    }
}

fn invalid(field: &str, reason: String) -> RansomwatchError {
    ConfigError::InvalidValue {
        field: field.to_owned(),
        reason,
    }
    .into()
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "pretty".to_owned(),
        }
    }
}

/// 차단 목록 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BlocklistConfig {
    /// 로컬 C2 도메인 목록 파일 경로
    pub path: String,
    /// 원격 hosts 피드 URL (빈 문자열이면 사용하지 않음)
    pub remote_url: String,
    /// 원격 피드 요청 타임아웃 (초)
    pub fetch_timeout_secs: u64,
    /// 로컬 목록 파일이 없을 때 사용하는 도메인
    pub fallback_domains: Vec<String>,
}

impl Default for BlocklistConfig {
    fn default() -> Self {
        Self {
            path: "configs/c2_domains.txt".to_owned(),
            remote_url: String::new(),
            fetch_timeout_secs: 10,
            fallback_domains: vec![
                "malicious-c2-domain.com".to_owned(),
                "ransomware-site.net".to_owned(),
            ],
        }
    }
}

/// 탐지 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// DNS 쿼리 로그 경로
    pub dns_log_path: String,
    /// 프록시/방화벽 로그 경로
    pub proxy_log_path: String,
    /// 대용량 전송 임계값 (바이트, 초과 시 알림)
    pub large_transfer_threshold_bytes: u64,
    /// 파일당 보관할 스킵 라인 샘플 수
    pub max_skip_samples: usize,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            dns_log_path: "data/sample_dns.log".to_owned(),
            proxy_log_path: "data/sample_proxy.log".to_owned(),
            large_transfer_threshold_bytes: 5_000_000,
            max_skip_samples: 10,
        }
    }
}

/// 결과 출력 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// 알림 CSV 파일 경로 (실행마다 덮어씀)
    pub alerts_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            alerts_path: "data/alerts.csv".to_owned(),
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}

fn override_csv(target: &mut Vec<String>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val.split(',').map(|s| s.trim().to_owned()).collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn default_config_has_sane_values() {
        let config = RansomwatchConfig::default();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.blocklist.fetch_timeout_secs, 10);
        assert!(config.blocklist.remote_url.is_empty());
        assert_eq!(config.detection.large_transfer_threshold_bytes, 5_000_000);
        assert_eq!(config.blocklist.fallback_domains.len(), 2);
    }

    #[test]
    fn default_config_passes_validation() {
        RansomwatchConfig::default().validate().unwrap();
    }

    #[test]
    fn parse_empty_toml_uses_defaults() {
        let config = RansomwatchConfig::parse("").unwrap();
        assert_eq!(config.output.alerts_path, "data/alerts.csv");
        assert_eq!(config.detection.dns_log_path, "data/sample_dns.log");
    }

    #[test]
    fn parse_partial_toml_merges_with_defaults() {
        let toml = r#"
[detection]
large_transfer_threshold_bytes = 1000

[blocklist]
remote_url = "https://example.org/hosts"
"#;
        let config = RansomwatchConfig::parse(toml).unwrap();
        assert_eq!(config.detection.large_transfer_threshold_bytes, 1000);
        // 나머지는 기본값 유지
        assert_eq!(config.detection.max_skip_samples, 10);
        assert_eq!(config.blocklist.remote_url, "https://example.org/hosts");
        assert_eq!(config.blocklist.path, "configs/c2_domains.txt");
    }

    #[test]
    fn parse_invalid_toml_returns_error() {
        let err = RansomwatchConfig::parse("invalid = [[[toml").unwrap_err();
        assert!(matches!(
            err,
            RansomwatchError::Config(ConfigError::ParseFailed { .. })
        ));
    }

    #[test]
    fn validate_rejects_invalid_log_level() {
        let mut config = RansomwatchConfig::default();
        config.general.log_level = "verbose".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("log_level"));
    }

    #[test]
    fn validate_rejects_zero_timeout() {
        let mut config = RansomwatchConfig::default();
        config.blocklist.fetch_timeout_secs = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("fetch_timeout_secs"));
    }

    #[test]
    fn validate_rejects_non_http_remote_url() {
        let mut config = RansomwatchConfig::default();
        config.blocklist.remote_url = "ftp://example.org/hosts".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("remote_url"));
    }

    #[test]
    fn validate_rejects_empty_fallback_list() {
        let mut config = RansomwatchConfig::default();
        config.blocklist.fallback_domains.clear();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("fallback_domains"));
    }

    #[test]
    fn validate_rejects_empty_output_path() {
        let mut config = RansomwatchConfig::default();
        config.output.alerts_path = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    #[serial]
    fn env_override_string() {
        let mut val = "original".to_owned();
        // SAFETY: serial 테스트로 환경변수 조작이 다른 테스트와 겹치지 않습니다.
        unsafe { std::env::set_var("TEST_RANSOMWATCH_STR", "overridden") };
        override_string(&mut val, "TEST_RANSOMWATCH_STR");
        assert_eq!(val, "overridden");
        unsafe { std::env::remove_var("TEST_RANSOMWATCH_STR") };
    }

    #[test]
    #[serial]
    fn env_override_u64_invalid_keeps_original() {
        let mut val = 42u64;
        // SAFETY: serial 테스트로 환경변수 조작이 다른 테스트와 겹치지 않습니다.
        unsafe { std::env::set_var("TEST_RANSOMWATCH_U64_BAD", "lots") };
        override_u64(&mut val, "TEST_RANSOMWATCH_U64_BAD");
        assert_eq!(val, 42);
        unsafe { std::env::remove_var("TEST_RANSOMWATCH_U64_BAD") };
    }

    #[test]
    #[serial]
    fn env_override_csv() {
        let mut val = vec!["a".to_owned()];
        // SAFETY: serial 테스트로 환경변수 조작이 다른 테스트와 겹치지 않습니다.
        unsafe { std::env::set_var("TEST_RANSOMWATCH_CSV", "x.com, y.net") };
        override_csv(&mut val, "TEST_RANSOMWATCH_CSV");
        assert_eq!(val, vec!["x.com", "y.net"]);
        unsafe { std::env::remove_var("TEST_RANSOMWATCH_CSV") };
    }

    #[test]
    #[serial]
    fn apply_env_overrides_threshold() {
        let mut config = RansomwatchConfig::default();
        // SAFETY: serial 테스트로 환경변수 조작이 다른 테스트와 겹치지 않습니다.
        unsafe {
            std::env::set_var(
                "RANSOMWATCH_DETECTION_LARGE_TRANSFER_THRESHOLD_BYTES",
                "1234",
            )
        };
        config.apply_env_overrides();
        unsafe { std::env::remove_var("RANSOMWATCH_DETECTION_LARGE_TRANSFER_THRESHOLD_BYTES") };
        assert_eq!(config.detection.large_transfer_threshold_bytes, 1234);
    }

    #[test]
    fn config_serialize_roundtrip() {
        let config = RansomwatchConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed = RansomwatchConfig::parse(&toml_str).unwrap();
        assert_eq!(config.blocklist.path, parsed.blocklist.path);
        assert_eq!(
            config.detection.large_transfer_threshold_bytes,
            parsed.detection.large_transfer_threshold_bytes
        );
    }

    #[tokio::test]
    async fn from_file_not_found() {
        let err = RansomwatchConfig::from_file("/nonexistent/path/ransomwatch.toml")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RansomwatchError::Config(ConfigError::FileNotFound { .. })
        ));
    }

    #[tokio::test]
    #[serial]
    async fn load_or_default_falls_back_when_missing() {
        let config = RansomwatchConfig::load_or_default("/nonexistent/ransomwatch.toml")
            .await
            .unwrap();
        assert_eq!(config.output.alerts_path, "data/alerts.csv");
    }

    #[tokio::test]
    async fn load_or_default_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ransomwatch.toml");
        std::fs::write(&path, "[general\nlog_level = 1").unwrap();
        let result = RansomwatchConfig::load_or_default(&path).await;
        assert!(result.is_err());
    }
}
