//! C2 도메인 차단 목록 -- 로컬 목록 파일 또는 원격 hosts 피드에서 로드합니다.
//!
//! 두 경로 모두 실패해도 호출자에게 에러를 전달하지 않습니다.
//! 로컬 파일이 없으면 설정된 대체 목록을, 원격 피드가 실패하면 로컬 목록을 사용하고
//! 그 사실을 경고 로그로 남깁니다. 어떤 목록이 사용되었는지는
//! [`Blocklist::source`]로 확인할 수 있습니다.
//!
//! # 로컬 목록 형식
//! ```text
//! # ransomware C2
//! malicious-c2-domain.com
//! ransomware-site.net
//! ```
//!
//! # 원격 피드 형식 (hosts)
//! ```text
//! 0.0.0.0 ads.example.com
//! 127.0.0.1 tracker.example.com
//! ```

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use metrics::counter;
use serde::Serialize;

use ransomwatch_core::metrics as m;

use crate::config::DEFAULT_FETCH_TIMEOUT_SECS;
use crate::error::DetectorError;

/// 차단 목록 출처
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "location", rename_all = "snake_case")]
pub enum BlocklistSource {
    /// 로컬 목록 파일
    File(PathBuf),
    /// 원격 hosts 피드
    Remote(String),
    /// 내장 대체 목록
    Fallback,
}

impl BlocklistSource {
    /// 메트릭 레이블 값
    fn label(&self) -> &'static str {
        match self {
            Self::File(_) => "file",
            Self::Remote(_) => "remote",
            Self::Fallback => "fallback",
        }
    }
}

impl fmt::Display for BlocklistSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "file {}", path.display()),
            Self::Remote(url) => write!(f, "remote feed {url}"),
            Self::Fallback => f.write_str("built-in fallback list"),
        }
    }
}

/// C2 도메인 차단 목록
///
/// 실행마다 한 번 로드되며 이후에는 읽기 전용입니다.
/// 도메인은 원문 그대로 저장되며 대소문자 정규화를 하지 않습니다.
#[derive(Debug, Clone)]
pub struct Blocklist {
    domains: HashSet<String>,
    source: BlocklistSource,
}

impl Blocklist {
    /// 도메인 목록과 출처로 차단 목록을 생성합니다.
    pub fn new<I, S>(domains: I, source: BlocklistSource) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            domains: domains.into_iter().map(Into::into).collect(),
            source,
        }
    }

    /// 정확히 일치하는 도메인이 있는지 확인합니다.
    pub fn contains(&self, domain: &str) -> bool {
        self.domains.contains(domain)
    }

    /// 도메인 수
    pub fn len(&self) -> usize {
        self.domains.len()
    }

    /// 비어 있는지 여부
    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    /// 출처
    pub fn source(&self) -> &BlocklistSource {
        &self.source
    }

    /// 도메인 집합
    pub fn domains(&self) -> &HashSet<String> {
        &self.domains
    }

    /// 정렬된 도메인 목록
    pub fn sorted_domains(&self) -> Vec<&str> {
        let mut domains: Vec<&str> = self.domains.iter().map(String::as_str).collect();
        domains.sort_unstable();
        domains
    }
}

/// 로컬 목록 본문에서 도메인을 추출합니다.
///
/// 각 라인은 앞뒤 공백을 제거하며, 빈 라인과 `#`으로 시작하는 라인은 무시합니다.
pub fn parse_domain_list(content: &str) -> HashSet<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_owned)
        .collect()
}

/// hosts 형식 본문에서 도메인을 추출합니다.
///
/// 주석이 아니고 공백으로 구분된 토큰이 두 개 이상인 라인의 두 번째 토큰이 도메인입니다.
pub fn parse_hosts(content: &str) -> HashSet<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_whitespace().nth(1))
        .map(str::to_owned)
        .collect()
}

/// 차단 목록 제공자
///
/// 대체 목록과 원격 요청 타임아웃을 생성 시점에 주입받습니다.
#[derive(Debug, Clone)]
pub struct BlocklistProvider {
    fallback_domains: Vec<String>,
    fetch_timeout: Duration,
}

impl BlocklistProvider {
    /// 대체 목록으로 새 제공자를 생성합니다.
    pub fn new(fallback_domains: Vec<String>) -> Self {
        Self {
            fallback_domains,
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
        }
    }

    /// 원격 요청 타임아웃을 설정합니다.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// 내장 대체 목록
    pub fn fallback(&self) -> Blocklist {
        let domains = self
            .fallback_domains
            .iter()
            .map(|d| d.trim())
            .filter(|d| !d.is_empty());
        Blocklist::new(domains, BlocklistSource::Fallback)
    }

    /// 로컬 목록 파일에서 차단 목록을 로드합니다.
    ///
    /// 파일이 없거나 읽을 수 없으면 대체 목록을 반환합니다.
    pub async fn load_local_list(&self, path: impl AsRef<Path>) -> Blocklist {
        let path = path.as_ref();

        let blocklist = match tokio::fs::read(path).await {
            Ok(bytes) => {
                let content = String::from_utf8_lossy(&bytes);
                let domains = parse_domain_list(&content);
                tracing::info!(
                    path = %path.display(),
                    count = domains.len(),
                    "loaded C2 domain list"
                );
                Blocklist {
                    domains,
                    source: BlocklistSource::File(path.to_path_buf()),
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    path = %path.display(),
                    "C2 domain list not found, using default C2 list"
                );
                self.fallback()
            }
            Err(e) => {
                tracing::error!(
                    path = %path.display(),
                    error = %e,
                    "failed to read C2 domain list, using default C2 list"
                );
                self.fallback()
            }
        };

        counter!(m::BLOCKLIST_LOADS_TOTAL, m::LABEL_BLOCKLIST_SOURCE => blocklist.source.label())
            .increment(1);
        blocklist
    }

    /// 원격 hosts 피드에서 차단 목록을 가져옵니다.
    ///
    /// 네트워크 에러, HTTP 에러 상태, 타임아웃, 빈 피드는 모두 실패로 간주하여
    /// `local_path`의 로컬 목록으로 대체합니다. 에러는 호출자에게 전달되지 않습니다.
    pub async fn fetch_remote_list(&self, url: &str, local_path: impl AsRef<Path>) -> Blocklist {
        match self.try_fetch(url).await {
            Ok(domains) => {
                tracing::info!(url, count = domains.len(), "fetched remote C2 domain feed");
                counter!(m::BLOCKLIST_LOADS_TOTAL, m::LABEL_BLOCKLIST_SOURCE => "remote")
                    .increment(1);
                Blocklist {
                    domains,
                    source: BlocklistSource::Remote(url.to_owned()),
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "error fetching C2 list, falling back to local list");
                counter!(m::BLOCKLIST_FETCH_FAILURES_TOTAL).increment(1);
                self.load_local_list(local_path).await
            }
        }
    }

    async fn try_fetch(&self, url: &str) -> Result<HashSet<String>, DetectorError> {
        let fetch_err = |reason: String| DetectorError::Fetch {
            url: url.to_owned(),
            reason,
        };

        let client = reqwest::Client::builder()
            .timeout(self.fetch_timeout)
            .build()
            .map_err(|e| fetch_err(format!("failed to build http client: {e}")))?;

        let response = client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                fetch_err(format!("timed out after {:?}", self.fetch_timeout))
            } else {
                fetch_err(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(fetch_err(format!("HTTP {status}")));
        }

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                fetch_err(format!("timed out after {:?}", self.fetch_timeout))
            } else {
                fetch_err(format!("failed to read body: {e}"))
            }
        })?;

        let domains = parse_hosts(&body);
        if domains.is_empty() {
            return Err(fetch_err("feed contained no domains".to_owned()));
        }

        Ok(domains)
    }
}

impl Default for BlocklistProvider {
    fn default() -> Self {
        Self::new(vec![
            "malicious-c2-domain.com".to_owned(),
            "ransomware-site.net".to_owned(),
        ])
    }
}
