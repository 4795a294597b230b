//! 알림 CSV 싱크
//!
//! 알림 컬렉션을 고정 헤더의 CSV 파일로 기록하고 다시 읽습니다.
//! 열은 두 알림 유형의 필드 합집합이며, 해당 유형에 없는 필드는 빈 값입니다.
//! 알림이 없어도 헤더만 있는 파일을 생성합니다.
//!
//! ```text
//! timestamp,client_ip,alert_type,severity,domain,destination,bytes_transferred
//! 2024-01-01 12:00:00,10.0.0.5,C2 Domain Match,High,malicious-c2-domain.com,,
//! 2024-01-01 12:05:00,10.0.0.7,Large File Transfer,Medium,,evil.com,6000000
//! ```

use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use ransomwatch_core::types::Alert;

use crate::alert::AlertCollection;
use crate::error::DetectorError;

/// CSV 열 순서
pub const CSV_COLUMNS: [&str; 7] = [
    "timestamp",
    "client_ip",
    "alert_type",
    "severity",
    "domain",
    "destination",
    "bytes_transferred",
];

/// CSV 한 행
///
/// 읽기 시에는 외부에서 편집된 파일도 받아들이도록 유형과 심각도를 문자열로 둡니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertRow {
    pub timestamp: String,
    pub client_ip: String,
    pub alert_type: String,
    pub severity: String,
    pub domain: Option<String>,
    pub destination: Option<String>,
    pub bytes_transferred: Option<u64>,
}

impl From<&Alert> for AlertRow {
    fn from(alert: &Alert) -> Self {
        Self {
            timestamp: alert.timestamp.clone(),
            client_ip: alert.client_ip.clone(),
            alert_type: alert.alert_type().as_str().to_owned(),
            severity: alert.severity().as_str().to_owned(),
            domain: alert.domain().map(str::to_owned),
            destination: alert.destination().map(str::to_owned),
            bytes_transferred: alert.bytes_transferred(),
        }
    }
}

/// 알림을 CSV로 기록합니다. 헤더는 항상 먼저 기록됩니다.
pub fn write_alerts_csv<W: Write>(writer: W, alerts: &AlertCollection) -> Result<(), csv::Error> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    csv_writer.write_record(CSV_COLUMNS)?;
    for alert in alerts {
        csv_writer.serialize(AlertRow::from(alert))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// 알림 컬렉션을 CSV 파일로 기록합니다. 기존 파일은 덮어씁니다.
///
/// 상위 디렉토리가 없으면 생성합니다. 실패는 실행 전체의 치명적 에러입니다.
pub async fn write_alerts(
    path: impl AsRef<Path>,
    alerts: &AlertCollection,
) -> Result<(), DetectorError> {
    let path = path.as_ref();
    let write_err = |reason: String| DetectorError::OutputWrite {
        path: path.display().to_string(),
        reason,
    };

    let mut buf = Vec::new();
    write_alerts_csv(&mut buf, alerts).map_err(|e| write_err(e.to_string()))?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| write_err(e.to_string()))?;
    }

    tokio::fs::write(path, &buf)
        .await
        .map_err(|e| write_err(e.to_string()))?;

    tracing::info!(path = %path.display(), rows = alerts.len(), "alerts written");
    Ok(())
}

/// CSV에서 알림 행을 읽습니다.
pub fn read_alerts_csv<R: Read>(reader: R) -> Result<Vec<AlertRow>, csv::Error> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader)
        .deserialize()
        .collect()
}

/// 알림 CSV 파일을 읽습니다.
pub async fn read_alerts(path: impl AsRef<Path>) -> Result<Vec<AlertRow>, DetectorError> {
    let path = path.as_ref();
    let read_err = |reason: String| DetectorError::OutputRead {
        path: path.display().to_string(),
        reason,
    };

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| read_err(e.to_string()))?;
    read_alerts_csv(bytes.as_slice()).map_err(|e| read_err(e.to_string()))
}

/// 심각도 값별 행 수를 많은 순으로 반환합니다. 개수가 같으면 이름순입니다.
pub fn count_by_severity(rows: &[AlertRow]) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for row in rows {
        *counts.entry(row.severity.as_str()).or_default() += 1;
    }

    let mut entries: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(severity, n)| (severity.to_owned(), n))
        .collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    entries
}
