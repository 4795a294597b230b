//! 탐지 파이프라인 오케스트레이션 -- 한 번의 실행 흐름을 관리합니다.
//!
//! [`DetectionPipeline`]은 실행마다 차단 목록을 한 번 로드하고, DNS 로그와
//! 프록시 로그를 순서대로 스캔한 뒤, 알림을 집계하여 CSV로 기록합니다.
//!
//! # 실행 흐름
//! ```text
//! remote feed? --fail--> local list --missing--> fallback
//!        |
//!        v
//!   DnsLogParser -> ProxyLogParser -> aggregate -> write_alerts -> RunSummary
//! ```
//!
//! 입력 문제(파일 없음, 형식 오류 라인, 원격 피드 실패)는 내부에서 복구됩니다.
//! 결과 저장 실패는 실행 전체를 실패시킵니다.

use std::path::PathBuf;

use serde::Serialize;

use crate::alert::{AlertCollection, SeverityCounts, aggregate};
use crate::blocklist::{Blocklist, BlocklistProvider, BlocklistSource};
use crate::config::DetectorConfig;
use crate::error::DetectorError;
use crate::parser::{DnsLogParser, ParseStats, ProxyLogParser};
use crate::sink::write_alerts;

/// 한 번의 실행 결과 요약
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// 사용된 차단 목록 출처
    pub blocklist_source: BlocklistSource,
    /// 차단 목록 도메인 수
    pub blocklist_size: usize,
    /// DNS 로그 통계
    pub dns: ParseStats,
    /// 프록시 로그 통계
    pub proxy: ParseStats,
    /// 집계된 알림
    pub alerts: AlertCollection,
    /// 알림 CSV 경로
    pub alerts_path: PathBuf,
}

impl RunSummary {
    /// 심각도별 알림 수
    pub fn severity_counts(&self) -> SeverityCounts {
        self.alerts.severity_counts()
    }

    /// 탐지된 지표가 없는지 여부
    pub fn is_clean(&self) -> bool {
        self.alerts.is_empty()
    }
}

/// 탐지 파이프라인
///
/// # 사용 예시
/// ```ignore
/// use ransomwatch_detector::{DetectionPipeline, DetectorConfig};
///
/// let pipeline = DetectionPipeline::new(DetectorConfig::default());
/// let summary = pipeline.run().await?;
/// for alert in &summary.alerts {
///     println!("{alert}");
/// }
/// ```
pub struct DetectionPipeline {
    config: DetectorConfig,
    provider: BlocklistProvider,
}

impl DetectionPipeline {
    /// 설정으로 새 파이프라인을 생성합니다.
    pub fn new(config: DetectorConfig) -> Self {
        let provider = BlocklistProvider::new(config.fallback_domains.clone())
            .with_fetch_timeout(config.fetch_timeout());
        Self { config, provider }
    }

    /// 설정을 반환합니다.
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// 차단 목록을 로드합니다.
    ///
    /// 원격 피드 URL이 설정되어 있으면 먼저 시도하고, 실패하면 로컬 목록을 사용합니다.
    pub async fn load_blocklist(&self) -> Blocklist {
        match &self.config.remote_feed_url {
            Some(url) => {
                self.provider
                    .fetch_remote_list(url, &self.config.blocklist_path)
                    .await
            }
            None => {
                self.provider
                    .load_local_list(&self.config.blocklist_path)
                    .await
            }
        }
    }

    /// 탐지를 실행하고 알림을 CSV로 기록합니다.
    ///
    /// 로그 파일이 없으면 해당 로그는 알림 없이 넘어갑니다.
    /// 로그 읽기 에러(파일 없음 제외)와 결과 저장 실패는 에러로 반환됩니다.
    pub async fn run(&self) -> Result<RunSummary, DetectorError> {
        let blocklist = self.load_blocklist().await;
        tracing::info!(
            source = %blocklist.source(),
            domains = blocklist.len(),
            "blocklist ready"
        );

        let dns = DnsLogParser::new(&blocklist)
            .with_max_skip_samples(self.config.max_skip_samples)
            .parse_file(&self.config.dns_log_path)
            .await?;

        let proxy = ProxyLogParser::new(self.config.large_transfer_threshold_bytes)
            .with_max_skip_samples(self.config.max_skip_samples)
            .parse_file(&self.config.proxy_log_path)
            .await?;

        let (dns_alerts, dns_stats) = dns.into_parts();
        let (proxy_alerts, proxy_stats) = proxy.into_parts();
        let alerts = aggregate(dns_alerts, proxy_alerts);

        write_alerts(&self.config.alerts_path, &alerts).await?;

        if alerts.is_empty() {
            tracing::info!("no ransomware indicators detected");
        } else {
            let counts = alerts.severity_counts();
            tracing::info!(
                total = counts.total(),
                high = counts.high,
                medium = counts.medium,
                "ransomware indicators detected"
            );
        }

        Ok(RunSummary {
            blocklist_source: blocklist.source().clone(),
            blocklist_size: blocklist.len(),
            dns: dns_stats,
            proxy: proxy_stats,
            alerts,
            alerts_path: self.config.alerts_path.clone(),
        })
    }
}
