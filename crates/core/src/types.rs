//! 도메인 타입 -- 시스템 전역에서 사용되는 공통 타입
//!
//! 탐지기와 CLI가 공유하는 알림 데이터 구조를 정의합니다.
//! 알림의 심각도는 알림 유형에서만 결정되므로, 유형과 심각도가
//! 어긋난 알림은 구성할 수 없습니다.

use std::fmt;

use serde::{Deserialize, Serialize};

/// 보안 알림
///
/// 로그 한 줄에서 탐지된 랜섬웨어 지표를 나타냅니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    /// 로그에 기록된 타임스탬프 (원문 그대로, 날짜와 시각을 공백으로 연결)
    pub timestamp: String,
    /// 요청을 보낸 클라이언트 IP
    pub client_ip: String,
    /// 알림 종류별 상세 정보
    pub kind: AlertKind,
}

/// 알림 종류별 상세 정보
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "alert_type")]
pub enum AlertKind {
    /// 차단 목록에 있는 도메인 조회
    #[serde(rename = "C2 Domain Match")]
    C2DomainMatch {
        /// 조회된 도메인
        domain: String,
    },
    /// 임계값을 초과한 전송량
    #[serde(rename = "Large File Transfer")]
    LargeFileTransfer {
        /// 목적지 도메인
        destination: String,
        /// 전송 바이트 수
        bytes_transferred: u64,
    },
}

impl Alert {
    /// C2 도메인 매칭 알림을 생성합니다.
    pub fn c2_domain_match(
        timestamp: impl Into<String>,
        client_ip: impl Into<String>,
        domain: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: timestamp.into(),
            client_ip: client_ip.into(),
            kind: AlertKind::C2DomainMatch {
                domain: domain.into(),
            },
        }
    }

    /// 대용량 전송 알림을 생성합니다.
    pub fn large_file_transfer(
        timestamp: impl Into<String>,
        client_ip: impl Into<String>,
        destination: impl Into<String>,
        bytes_transferred: u64,
    ) -> Self {
        Self {
            timestamp: timestamp.into(),
            client_ip: client_ip.into(),
            kind: AlertKind::LargeFileTransfer {
                destination: destination.into(),
                bytes_transferred,
            },
        }
    }

    /// 알림 유형
    pub fn alert_type(&self) -> AlertType {
        match self.kind {
            AlertKind::C2DomainMatch { .. } => AlertType::C2DomainMatch,
            AlertKind::LargeFileTransfer { .. } => AlertType::LargeFileTransfer,
        }
    }

    /// 심각도 (알림 유형에서 결정)
    pub fn severity(&self) -> Severity {
        self.alert_type().severity()
    }

    /// C2 매칭 알림의 도메인
    pub fn domain(&self) -> Option<&str> {
        match &self.kind {
            AlertKind::C2DomainMatch { domain } => Some(domain),
            AlertKind::LargeFileTransfer { .. } => None,
        }
    }

    /// 대용량 전송 알림의 목적지
    pub fn destination(&self) -> Option<&str> {
        match &self.kind {
            AlertKind::LargeFileTransfer { destination, .. } => Some(destination),
            AlertKind::C2DomainMatch { .. } => None,
        }
    }

    /// 대용량 전송 알림의 전송 바이트 수
    pub fn bytes_transferred(&self) -> Option<u64> {
        match self.kind {
            AlertKind::LargeFileTransfer {
                bytes_transferred, ..
            } => Some(bytes_transferred),
            AlertKind::C2DomainMatch { .. } => None,
        }
    }

    /// 알림 대상 (도메인 또는 목적지)
    pub fn target(&self) -> &str {
        match &self.kind {
            AlertKind::C2DomainMatch { domain } => domain,
            AlertKind::LargeFileTransfer { destination, .. } => destination,
        }
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} at {}: Client {} -> {}",
            self.severity(),
            self.alert_type(),
            self.timestamp,
            self.client_ip,
            self.target(),
        )
    }
}

/// 알림 유형
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlertType {
    /// 차단 목록 도메인 조회
    #[serde(rename = "C2 Domain Match")]
    C2DomainMatch,
    /// 대용량 전송
    #[serde(rename = "Large File Transfer")]
    LargeFileTransfer,
}

impl AlertType {
    /// 알림 유형에 대응하는 심각도
    pub fn severity(self) -> Severity {
        match self {
            Self::C2DomainMatch => Severity::High,
            Self::LargeFileTransfer => Severity::Medium,
        }
    }

    /// 출력용 라벨
    pub fn as_str(self) -> &'static str {
        match self {
            Self::C2DomainMatch => "C2 Domain Match",
            Self::LargeFileTransfer => "Large File Transfer",
        }
    }
}

impl fmt::Display for AlertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 심각도 레벨
///
/// `Ord` 구현으로 심각도 비교가 가능합니다 (`Medium < High`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// 휴리스틱 기반 의심 신호
    Medium,
    /// 확인된 C2 지표
    High,
}

impl Severity {
    /// 문자열에서 심각도를 파싱합니다.
    ///
    /// 대소문자를 구분하지 않습니다.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "medium" | "med" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }

    /// 출력용 라벨
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn c2_alert_is_high_severity() {
        let alert = Alert::c2_domain_match("2024-01-01 12:00:00", "10.0.0.5", "evil.com");
        assert_eq!(alert.alert_type(), AlertType::C2DomainMatch);
        assert_eq!(alert.severity(), Severity::High);
        assert_eq!(alert.domain(), Some("evil.com"));
        assert_eq!(alert.destination(), None);
        assert_eq!(alert.bytes_transferred(), None);
    }

    #[test]
    fn large_transfer_alert_is_medium_severity() {
        let alert =
            Alert::large_file_transfer("2024-01-01 12:00:00", "10.0.0.7", "evil.com", 6_000_000);
        assert_eq!(alert.alert_type(), AlertType::LargeFileTransfer);
        assert_eq!(alert.severity(), Severity::Medium);
        assert_eq!(alert.domain(), None);
        assert_eq!(alert.destination(), Some("evil.com"));
        assert_eq!(alert.bytes_transferred(), Some(6_000_000));
    }

    #[test]
    fn severity_ordering() {
        assert!(Severity::High > Severity::Medium);
    }

    #[test]
    fn severity_from_str_loose() {
        assert_eq!(Severity::from_str_loose("HIGH"), Some(Severity::High));
        assert_eq!(Severity::from_str_loose(" medium "), Some(Severity::Medium));
        assert_eq!(Severity::from_str_loose("critical"), None);
    }

    #[test]
    fn alert_display_matches_console_summary() {
        let alert = Alert::c2_domain_match(
            "2024-01-01 12:00:00",
            "10.0.0.5",
            "malicious-c2-domain.com",
        );
        assert_eq!(
            alert.to_string(),
            "[High] C2 Domain Match at 2024-01-01 12:00:00: Client 10.0.0.5 -> malicious-c2-domain.com"
        );
    }

    #[test]
    fn alert_json_carries_type_label() {
        let alert = Alert::large_file_transfer("t", "1.1.1.1", "x.com", 10);
        let json = serde_json::to_value(&alert).unwrap();
        assert_eq!(json["kind"]["alert_type"], "Large File Transfer");
        assert_eq!(json["kind"]["bytes_transferred"], 10);
    }
}
