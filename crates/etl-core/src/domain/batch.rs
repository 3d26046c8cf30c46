//! 백필 배치 구간 계산.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{EtlError, EtlResult};

/// 1년 근사치 (일). 달력 연도 계산을 하지 않습니다.
pub const DAYS_PER_BATCH_YEAR: i64 = 365;

/// 백필 배치 구간 `[start, end]` (양 끝 포함).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Batch {
    /// `end - start` 일수.
    pub fn span_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

impl std::fmt::Display for Batch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// `[start, now)` 구간을 `years`년 단위 배치로 분할합니다.
///
/// 첫 배치는 `[start, min(start + years·365일, now)]`, 이후 배치는 직전 배치
/// 종료일 다음 날부터 시작합니다. 배치 시작일이 `now` 이상이 되면 멈춥니다.
/// 따라서 마지막 배치의 종료일은 `now` 또는 `now - 1일` 입니다.
pub fn calculate_batches(start: NaiveDate, now: NaiveDate, years: u32) -> EtlResult<Vec<Batch>> {
    if years == 0 {
        return Err(EtlError::InvalidBatchSize(years));
    }

    let width = Duration::days(DAYS_PER_BATCH_YEAR * i64::from(years));
    let mut batches = Vec::new();
    let mut current = start;

    while current < now {
        let end = (current + width).min(now);
        batches.push(Batch {
            start: current,
            end,
        });
        current = end + Duration::days(1);
    }

    Ok(batches)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_five_year_batches() {
        let batches = calculate_batches(date(2016, 3, 1), date(2025, 2, 7), 5).unwrap();

        assert_eq!(batches.len(), 2);
        // 2016-03-01 + 1825일 (2020-02-29 포함)
        assert_eq!(batches[0].start, date(2016, 3, 1));
        assert_eq!(batches[0].end, date(2021, 2, 28));
        assert_eq!(batches[1].start, date(2021, 3, 1));
        assert_eq!(batches[1].end, date(2025, 2, 7));
    }

    #[test]
    fn test_single_short_batch() {
        let batches = calculate_batches(date(2024, 1, 1), date(2024, 6, 30), 5).unwrap();
        assert_eq!(
            batches,
            vec![Batch {
                start: date(2024, 1, 1),
                end: date(2024, 6, 30)
            }]
        );
    }

    #[test]
    fn test_start_at_or_after_now_is_empty() {
        let now = date(2024, 1, 1);
        assert!(calculate_batches(now, now, 5).unwrap().is_empty());
        assert!(calculate_batches(date(2024, 2, 1), now, 5).unwrap().is_empty());
    }

    #[test]
    fn test_last_batch_may_end_day_before_now() {
        // 첫 배치가 now - 1일에 끝나면 다음 시작일 == now 이므로 중단
        let start = date(2020, 1, 1);
        let now = start + Duration::days(366);
        let batches = calculate_batches(start, now, 1).unwrap();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].end, now - Duration::days(1));
    }

    #[test]
    fn test_zero_width_rejected() {
        assert!(matches!(
            calculate_batches(date(2020, 1, 1), date(2024, 1, 1), 0),
            Err(EtlError::InvalidBatchSize(0))
        ));
    }
}
