//! 탐지기 설정
//!
//! [`DetectorConfig`]는 core의 [`RansomwatchConfig`](ransomwatch_core::config::RansomwatchConfig)를
//! 기반으로 탐지 실행에 필요한 값을 모아 둡니다. 임계값과 대체 차단 목록은
//! 전역 상수가 아닌 설정값으로 각 파서 생성자에 전달됩니다.
//!
//! # 사용 예시
//! ```ignore
//! use ransomwatch_core::config::RansomwatchConfig;
//! use ransomwatch_detector::config::DetectorConfig;
//!
//! let core_config = RansomwatchConfig::default();
//! let config = DetectorConfig::from_core(&core_config);
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use ransomwatch_core::config::RansomwatchConfig;

use crate::error::DetectorError;

/// 기본 대용량 전송 임계값 (바이트)
pub const DEFAULT_LARGE_TRANSFER_THRESHOLD: u64 = 5_000_000;

/// 기본 원격 피드 타임아웃 (초)
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

/// 기본 스킵 라인 샘플 수
pub const DEFAULT_MAX_SKIP_SAMPLES: usize = 10;

/// 탐지기 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// 로컬 C2 도메인 목록 파일
    pub blocklist_path: PathBuf,
    /// 원격 hosts 피드 URL
    pub remote_feed_url: Option<String>,
    /// 원격 피드 요청 타임아웃 (초)
    pub fetch_timeout_secs: u64,
    /// 목록 파일이 없을 때 사용할 도메인
    pub fallback_domains: Vec<String>,
    /// DNS 쿼리 로그 경로
    pub dns_log_path: PathBuf,
    /// 프록시/방화벽 로그 경로
    pub proxy_log_path: PathBuf,
    /// 대용량 전송 임계값 (바이트, 초과 시 알림)
    pub large_transfer_threshold_bytes: u64,
    /// 파일당 보관할 스킵 라인 샘플 수
    pub max_skip_samples: usize,
    /// 알림 CSV 출력 경로
    pub alerts_path: PathBuf,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self::from_core(&RansomwatchConfig::default())
    }
}

impl DetectorConfig {
    /// core 설정에서 탐지기 설정을 생성합니다.
    ///
    /// 빈 `remote_url`은 원격 피드를 사용하지 않는다는 뜻입니다.
    pub fn from_core(core: &RansomwatchConfig) -> Self {
        let remote_feed_url = Some(core.blocklist.remote_url.trim())
            .filter(|url| !url.is_empty())
            .map(str::to_owned);

        Self {
            blocklist_path: PathBuf::from(&core.blocklist.path),
            remote_feed_url,
            fetch_timeout_secs: core.blocklist.fetch_timeout_secs,
            fallback_domains: core.blocklist.fallback_domains.clone(),
            dns_log_path: PathBuf::from(&core.detection.dns_log_path),
            proxy_log_path: PathBuf::from(&core.detection.proxy_log_path),
            large_transfer_threshold_bytes: core.detection.large_transfer_threshold_bytes,
            max_skip_samples: core.detection.max_skip_samples,
            alerts_path: PathBuf::from(&core.output.alerts_path),
        }
    }

    /// 원격 피드 타임아웃
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), DetectorError> {
        const MAX_FETCH_TIMEOUT_SECS: u64 = 300;
        const MAX_SKIP_SAMPLES: usize = 10_000;

        if self.fetch_timeout_secs == 0 || self.fetch_timeout_secs > MAX_FETCH_TIMEOUT_SECS {
            return Err(DetectorError::Config {
                field: "fetch_timeout_secs".to_owned(),
                reason: format!("must be 1-{MAX_FETCH_TIMEOUT_SECS}"),
            });
        }

        if self.max_skip_samples > MAX_SKIP_SAMPLES {
            return Err(DetectorError::Config {
                field: "max_skip_samples".to_owned(),
                reason: format!("must be 0-{MAX_SKIP_SAMPLES}"),
            });
        }

        if !self.fallback_domains.iter().any(|d| !d.trim().is_empty()) {
            return Err(DetectorError::Config {
                field: "fallback_domains".to_owned(),
                reason: "at least one fallback domain is required".to_owned(),
            });
        }

        if let Some(url) = &self.remote_feed_url
            && !(url.starts_with("http://") || url.starts_with("https://"))
        {
            return Err(DetectorError::Config {
                field: "remote_feed_url".to_owned(),
                reason: format!("'{url}' must start with http:// or https://"),
            });
        }

        for (field, path) in [
            ("blocklist_path", &self.blocklist_path),
            ("dns_log_path", &self.dns_log_path),
            ("proxy_log_path", &self.proxy_log_path),
            ("alerts_path", &self.alerts_path),
        ] {
            if path.as_os_str().is_empty() {
                return Err(DetectorError::Config {
                    field: field.to_owned(),
                    reason: "path must not be empty".to_owned(),
                });
            }
        }

        Ok(())
    }
}

/// 탐지기 설정 빌더
///
/// 3개 이상의 설정 필드가 있으므로 빌더 패턴을 사용합니다.
#[derive(Default)]
pub struct DetectorConfigBuilder {
    config: DetectorConfig,
}

impl DetectorConfigBuilder {
    /// 기본값에서 시작하는 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 기존 설정에서 시작하는 빌더를 생성합니다.
    pub fn from_config(config: DetectorConfig) -> Self {
        Self { config }
    }

    /// 로컬 차단 목록 경로를 설정합니다.
    pub fn blocklist_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.blocklist_path = path.into();
        self
    }

    /// 원격 피드 URL을 설정합니다.
    pub fn remote_feed_url(mut self, url: Option<String>) -> Self {
        self.config.remote_feed_url = url;
        self
    }

    /// 원격 피드 타임아웃(초)을 설정합니다.
    pub fn fetch_timeout_secs(mut self, secs: u64) -> Self {
        self.config.fetch_timeout_secs = secs;
        self
    }

    /// 대체 차단 목록을 설정합니다.
    pub fn fallback_domains(mut self, domains: Vec<String>) -> Self {
        self.config.fallback_domains = domains;
        self
    }

    /// DNS 로그 경로를 설정합니다.
    pub fn dns_log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.dns_log_path = path.into();
        self
    }

    /// 프록시 로그 경로를 설정합니다.
    pub fn proxy_log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.proxy_log_path = path.into();
        self
    }

    /// 대용량 전송 임계값을 설정합니다.
    pub fn large_transfer_threshold_bytes(mut self, bytes: u64) -> Self {
        self.config.large_transfer_threshold_bytes = bytes;
        self
    }

    /// 스킵 라인 샘플 수를 설정합니다.
    pub fn max_skip_samples(mut self, n: usize) -> Self {
        self.config.max_skip_samples = n;
        self
    }

    /// 알림 CSV 출력 경로를 설정합니다.
    pub fn alerts_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.alerts_path = path.into();
        self
    }

    /// 설정을 검증하고 `DetectorConfig`를 생성합니다.
    pub fn build(self) -> Result<DetectorConfig, DetectorError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
