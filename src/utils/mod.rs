//! 시간 관련 유틸리티

pub mod logging;

use chrono::{DateTime, Utc};

/// DateTime<Utc>를 타임스탬프(밀리초)로 변환
pub fn datetime_to_timestamp(dt: DateTime<Utc>) -> i64 {
  dt.timestamp_millis()
}

/// 현재 시간을 타임스탬프(밀리초)로 반환
pub fn current_timestamp_ms() -> i64 {
  datetime_to_timestamp(Utc::now())
}
