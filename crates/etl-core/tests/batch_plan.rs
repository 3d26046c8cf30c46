//! 백필 배치 구간 속성 테스트.

use chrono::{Duration, NaiveDate};
use etl_core::{calculate_batches, DAYS_PER_BATCH_YEAR};
use proptest::prelude::*;

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1980, 1, 1).unwrap()
}

proptest! {
    #[test]
    fn batches_are_gapless_and_bounded(
        start_offset in 0i64..15_000,
        span in 1i64..16_000,
        years in 1u32..10,
    ) {
        let start = base_date() + Duration::days(start_offset);
        let now = start + Duration::days(span);
        let batches = calculate_batches(start, now, years).unwrap();
        let width = DAYS_PER_BATCH_YEAR * i64::from(years);

        prop_assert!(!batches.is_empty());
        prop_assert_eq!(batches[0].start, start);

        for batch in &batches {
            prop_assert!(batch.start <= batch.end);
            prop_assert!(batch.span_days() <= width);
            prop_assert!(batch.end <= now);
        }

        // 연속 배치는 겹치지 않고 하루 간격으로 이어짐
        for pair in batches.windows(2) {
            prop_assert_eq!(pair[1].start, pair[0].end + Duration::days(1));
        }

        let last = batches[batches.len() - 1];
        prop_assert!(last.end == now || last.end == now - Duration::days(1));
    }

    #[test]
    fn non_final_batches_have_full_width(
        span in 1i64..16_000,
        years in 1u32..10,
    ) {
        let start = base_date();
        let now = start + Duration::days(span);
        let batches = calculate_batches(start, now, years).unwrap();
        let width = DAYS_PER_BATCH_YEAR * i64::from(years);

        for batch in &batches[..batches.len() - 1] {
            prop_assert_eq!(batch.span_days(), width);
        }
    }
}

#[test]
fn five_year_plan_from_2016_covers_range() {
    let start = NaiveDate::from_ymd_opt(2016, 3, 1).unwrap();
    let now = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
    let batches = calculate_batches(start, now, 5).unwrap();

    assert_eq!(batches.len(), 3);
    assert_eq!(batches[0].start, start);
    assert_eq!(batches[2].end, now);
}
