//! 통합 테스트 -- 탐지 파이프라인 전체 흐름 검증
//!
//! 차단 목록 로드부터 CSV 기록까지 임시 디렉토리에서 실행합니다.

use std::path::Path;

use ransomwatch_core::types::{AlertType, Severity};
use ransomwatch_detector::{
    BlocklistSource, DetectionPipeline, DetectorConfig, DetectorConfigBuilder, DetectorError,
    parse_dns_logs, parse_proxy_logs, read_alerts,
};

const DNS_LOG: &str = "\
2024-01-01 12:00:00 client 10.0.0.5#53 query: malicious-c2-domain.com IN A
2024-01-01 12:00:05 client 10.0.0.6#53 query: example.com IN A
2024-01-01 12:00:07 client 10.0.0.8#53 query: ransomware-site.net
2024-01-01 12:00:09 client 10.0.0.9#53 query: ransomware-site.net IN AAAA
";

const PROXY_LOG: &str = "\
2024-01-01 12:05:00 10.0.0.7:50432 TCP_MISS 200 POST http://exfil.example/upload - 6000000
2024-01-01 12:05:01 10.0.0.7:50433 TCP_MISS 200 GET cdn.example/lib.js - 5000000
2024-01-01 12:05:02 10.0.0.7:50434 TCP_MISS 200 GET drop.example - lots
2024-01-01 12:05:03 10.0.0.4:50435 TCP_MISS 200 PUT drop.example/x - 5000001
";

fn config_in(dir: &Path) -> DetectorConfig {
    DetectorConfigBuilder::new()
        .blocklist_path(dir.join("c2_domains.txt"))
        .dns_log_path(dir.join("dns.log"))
        .proxy_log_path(dir.join("proxy.log"))
        .alerts_path(dir.join("out").join("alerts.csv"))
        .max_skip_samples(5)
        .build()
        .expect("valid config")
}

/// 전체 흐름: 로컬 목록 -> DNS/프록시 스캔 -> CSV
#[tokio::test]
async fn test_full_run_writes_ordered_csv() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("c2_domains.txt"),
        "# C2\nmalicious-c2-domain.com\nransomware-site.net\n",
    )
    .unwrap();
    std::fs::write(dir.path().join("dns.log"), DNS_LOG).unwrap();
    std::fs::write(dir.path().join("proxy.log"), PROXY_LOG).unwrap();

    let summary = DetectionPipeline::new(config_in(dir.path()))
        .run()
        .await
        .expect("run should succeed");

    assert!(matches!(summary.blocklist_source, BlocklistSource::File(_)));
    assert_eq!(summary.blocklist_size, 2);

    // DNS 알림이 먼저, 각 파일의 라인 순서대로
    let types: Vec<AlertType> = summary.alerts.iter().map(|a| a.alert_type()).collect();
    assert_eq!(
        types,
        vec![
            AlertType::C2DomainMatch,
            AlertType::C2DomainMatch,
            AlertType::LargeFileTransfer,
            AlertType::LargeFileTransfer,
        ]
    );
    let clients: Vec<&str> = summary.alerts.iter().map(|a| a.client_ip.as_str()).collect();
    assert_eq!(clients, vec!["10.0.0.5", "10.0.0.9", "10.0.0.7", "10.0.0.4"]);

    assert_eq!(summary.dns.skipped.count(), 1);
    assert_eq!(summary.proxy.skipped.count(), 1);
    let counts = summary.severity_counts();
    assert_eq!((counts.high, counts.medium), (2, 2));

    let rows = read_alerts(&summary.alerts_path).await.unwrap();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0].severity, "High");
    assert_eq!(rows[0].domain.as_deref(), Some("malicious-c2-domain.com"));
    assert_eq!(rows[2].destination.as_deref(), Some("exfil.example"));
    assert_eq!(rows[3].bytes_transferred, Some(5_000_001));
}

/// 목록 파일이 없으면 내장 대체 목록으로 탐지
#[tokio::test]
async fn test_missing_blocklist_uses_fallback() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("dns.log"), DNS_LOG).unwrap();

    let summary = DetectionPipeline::new(config_in(dir.path()))
        .run()
        .await
        .unwrap();

    assert_eq!(summary.blocklist_source, BlocklistSource::Fallback);
    assert_eq!(summary.alerts.len(), 2);
    assert!(summary.alerts.iter().all(|a| a.severity() == Severity::High));
}

/// 프록시 로그가 없어도 DNS 알림만으로 실행 완료
#[tokio::test]
async fn test_missing_proxy_log_completes_with_dns_alerts() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("dns.log"), DNS_LOG).unwrap();

    let summary = DetectionPipeline::new(config_in(dir.path()))
        .run()
        .await
        .unwrap();

    assert!(summary.dns.file_found);
    assert!(!summary.proxy.file_found);
    assert!(
        summary
            .alerts
            .iter()
            .all(|a| a.alert_type() == AlertType::C2DomainMatch)
    );

    let proxy_alerts = parse_proxy_logs(dir.path().join("proxy.log")).await.unwrap();
    assert!(proxy_alerts.is_empty());
}

/// 탐지 결과가 없으면 헤더만 있는 CSV
#[tokio::test]
async fn test_no_indicators_writes_header_only_csv() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("dns.log"),
        "2024-01-01 12:00:05 client 10.0.0.6#53 query: example.com IN A\n",
    )
    .unwrap();

    let summary = DetectionPipeline::new(config_in(dir.path()))
        .run()
        .await
        .unwrap();
    assert!(summary.is_clean());

    let csv = std::fs::read_to_string(&summary.alerts_path).unwrap();
    assert_eq!(
        csv,
        "timestamp,client_ip,alert_type,severity,domain,destination,bytes_transferred\n"
    );
}

/// 결과 저장 실패는 실행 실패
#[tokio::test]
async fn test_output_write_failure_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("dns.log"), DNS_LOG).unwrap();

    // 출력 경로가 디렉토리
    let alerts_dir = dir.path().join("alerts.csv");
    std::fs::create_dir(&alerts_dir).unwrap();

    let config = DetectorConfigBuilder::from_config(config_in(dir.path()))
        .alerts_path(&alerts_dir)
        .build()
        .unwrap();

    let result = DetectionPipeline::new(config).run().await;
    assert!(matches!(result, Err(DetectorError::OutputWrite { .. })));
}

/// 자유 함수 API: 로그 파일 경로와 차단 목록만으로 탐지
#[tokio::test]
async fn test_free_function_api() {
    let dir = tempfile::tempdir().unwrap();
    let dns_path = dir.path().join("dns.log");
    std::fs::write(&dns_path, DNS_LOG).unwrap();
    let proxy_path = dir.path().join("proxy.log");
    std::fs::write(&proxy_path, PROXY_LOG).unwrap();

    let pipeline = DetectionPipeline::new(config_in(dir.path()));
    let blocklist = pipeline.load_blocklist().await;

    let dns_alerts = parse_dns_logs(&dns_path, &blocklist).await.unwrap();
    let proxy_alerts = parse_proxy_logs(&proxy_path).await.unwrap();
    let collection = ransomwatch_detector::aggregate(dns_alerts.clone(), proxy_alerts.clone());

    assert_eq!(collection.len(), dns_alerts.len() + proxy_alerts.len());
    assert_eq!(collection.as_slice()[0], dns_alerts[0]);
    assert_eq!(
        collection.as_slice()[dns_alerts.len()],
        proxy_alerts[0]
    );
}
