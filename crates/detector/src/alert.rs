//! 알림 집계 -- DNS 알림과 프록시 알림을 하나의 순서 있는 컬렉션으로 병합합니다.
//!
//! 순서 규칙: DNS 알림(파일 순서) 다음에 프록시 알림(파일 순서).
//! 컬렉션은 생성 후 변경되지 않으며 출력 싱크로 한 번 전달됩니다.

use serde::Serialize;

use ransomwatch_core::types::{Alert, Severity};

/// 순서 있는 알림 컬렉션
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AlertCollection {
    alerts: Vec<Alert>,
}

impl AlertCollection {
    /// 알림 수
    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    /// 알림이 없는지 여부
    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }

    /// 알림 순회
    pub fn iter(&self) -> std::slice::Iter<'_, Alert> {
        self.alerts.iter()
    }

    /// 알림 슬라이스
    pub fn as_slice(&self) -> &[Alert] {
        &self.alerts
    }

    /// 심각도별 알림 수
    pub fn severity_counts(&self) -> SeverityCounts {
        SeverityCounts::from_severities(self.alerts.iter().map(Alert::severity))
    }
}

impl<'a> IntoIterator for &'a AlertCollection {
    type Item = &'a Alert;
    type IntoIter = std::slice::Iter<'a, Alert>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for AlertCollection {
    type Item = Alert;
    type IntoIter = std::vec::IntoIter<Alert>;

    fn into_iter(self) -> Self::IntoIter {
        self.alerts.into_iter()
    }
}

/// 두 알림 목록을 DNS 먼저 이어 붙입니다. 각 목록의 내부 순서는 유지됩니다.
pub fn aggregate(dns_alerts: Vec<Alert>, proxy_alerts: Vec<Alert>) -> AlertCollection {
    let mut alerts = dns_alerts;
    alerts.extend(proxy_alerts);
    AlertCollection { alerts }
}

/// 심각도별 알림 수
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeverityCounts {
    /// High 알림 수
    pub high: usize,
    /// Medium 알림 수
    pub medium: usize,
}

impl SeverityCounts {
    /// 심각도 목록에서 집계합니다.
    pub fn from_severities(severities: impl IntoIterator<Item = Severity>) -> Self {
        severities
            .into_iter()
            .fold(Self::default(), |mut counts, severity| {
                match severity {
                    Severity::High => counts.high += 1,
                    Severity::Medium => counts.medium += 1,
                }
                counts
            })
    }

    /// 전체 알림 수
    pub fn total(&self) -> usize {
        self.high + self.medium
    }

    /// 심각도별 (심각도, 개수), 높은 심각도 먼저
    pub fn entries(&self) -> [(Severity, usize); 2] {
        [(Severity::High, self.high), (Severity::Medium, self.medium)]
    }
}
