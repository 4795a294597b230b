//! 메트릭 이름 상수
//!
//! 탐지 파이프라인이 기록하는 카운터의 이름을 중앙에서 정의합니다.
//! 각 모듈은 이 상수를 사용하여 `metrics::counter!()` 매크로를 호출합니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `ransomwatch_`
//! - 접미어: `_total` (counter)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(
//!     ransomwatch_core::metrics::LINES_READ_TOTAL,
//!     ransomwatch_core::metrics::LABEL_LOG_FORMAT => "dns"
//! )
//! .increment(1);
//! ```

/// 로그 형식 레이블 키 (dns, proxy)
pub const LABEL_LOG_FORMAT: &str = "format";

/// 알림 유형 레이블 키
pub const LABEL_ALERT_TYPE: &str = "alert_type";

/// 차단 목록 출처 레이블 키 (file, remote, fallback)
pub const LABEL_BLOCKLIST_SOURCE: &str = "source";

/// 읽은 로그 라인 수 (counter, label: format)
pub const LINES_READ_TOTAL: &str = "ransomwatch_lines_read_total";

/// 형식 오류로 건너뛴 라인 수 (counter, label: format)
pub const LINES_SKIPPED_TOTAL: &str = "ransomwatch_lines_skipped_total";

/// 생성된 알림 수 (counter, label: alert_type)
pub const ALERTS_GENERATED_TOTAL: &str = "ransomwatch_alerts_generated_total";

/// 차단 목록 로드 횟수 (counter, label: source)
pub const BLOCKLIST_LOADS_TOTAL: &str = "ransomwatch_blocklist_loads_total";

/// 원격 피드 요청 실패 수 (counter)
pub const BLOCKLIST_FETCH_FAILURES_TOTAL: &str = "ransomwatch_blocklist_fetch_failures_total";
