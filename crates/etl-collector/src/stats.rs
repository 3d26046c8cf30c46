//! 수집 통계 구조체.

use std::time::Duration;

use etl_data::{BackfillSummary, Extraction, FailureKind};
use serde::{Deserialize, Serialize};

/// 수집 작업 통계
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollectionStats {
    /// 총 시도 횟수 (엔티티 또는 배치)
    pub total: usize,
    /// 성공 횟수
    pub success: usize,
    /// 에러 횟수
    pub errors: usize,
    /// 빈 데이터 (조회 성공, 데이터 없음)
    pub empty: usize,
    /// 조회된 총 행 수
    pub rows_fetched: usize,
    /// 새로 저장된 행 수
    pub rows_inserted: u64,
    /// 실패한 키 (종목, 지표, 배치)
    pub failed_keys: Vec<String>,
    /// 소요 시간
    #[serde(skip)]
    pub elapsed: Duration,
}

impl CollectionStats {
    /// 새 통계 객체 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 추출 결과로 통계 생성
    pub fn from_extraction<R>(extraction: &Extraction<R>) -> Self {
        let empty = extraction
            .failures
            .iter()
            .filter(|f| f.kind == FailureKind::NoData)
            .count();

        Self {
            total: extraction.attempted,
            success: extraction.succeeded(),
            errors: extraction.failures.len() - empty,
            empty,
            rows_fetched: extraction.records.len(),
            failed_keys: extraction.failed_keys(),
            ..Default::default()
        }
    }

    /// 배치 백필 결과로 통계 생성
    ///
    /// 데이터가 없던 배치는 실패가 아닌 `empty`로 집계합니다.
    pub fn from_backfill(summary: &BackfillSummary) -> Self {
        let errors = summary.failed_batches.len();
        let empty = summary.empty_batches.len();

        Self {
            total: summary.batches_total,
            success: summary.batches_total.saturating_sub(errors + empty),
            errors,
            empty,
            rows_fetched: summary.rows_extracted,
            rows_inserted: summary.rows_inserted,
            failed_keys: summary.failed_batches.clone(),
            ..Default::default()
        }
    }

    /// 성공률 계산 (%)
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.success as f64 / self.total as f64) * 100.0
        }
    }

    /// 통계 요약 로그 출력
    pub fn log_summary(&self, operation: &str) {
        tracing::info!(
            operation = operation,
            total = self.total,
            success = self.success,
            errors = self.errors,
            empty = self.empty,
            rows_fetched = self.rows_fetched,
            rows_inserted = self.rows_inserted,
            success_rate = format!("{:.1}%", self.success_rate()),
            elapsed = %etl_core::format_duration(self.elapsed),
            "수집 완료"
        );
        if !self.failed_keys.is_empty() {
            tracing::warn!(
                operation = operation,
                failed = %self.failed_keys.join(", "),
                "실패 항목"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use etl_data::EntityFailure;

    #[test]
    fn test_from_extraction_separates_empty() {
        let extraction: Extraction<u8> = Extraction {
            records: vec![1, 2, 3],
            failures: vec![
                EntityFailure {
                    key: "VALE3.SA".into(),
                    kind: FailureKind::NoData,
                    reason: "no data returned".into(),
                },
                EntityFailure {
                    key: "ITUB4.SA".into(),
                    kind: FailureKind::Error,
                    reason: "HTTP 404".into(),
                },
            ],
            attempted: 4,
        };

        let stats = CollectionStats::from_extraction(&extraction);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.success, 2);
        assert_eq!(stats.empty, 1);
        assert_eq!(stats.errors, 1);
        assert_eq!(stats.rows_fetched, 3);
        assert_eq!(stats.failed_keys, vec!["VALE3.SA", "ITUB4.SA"]);
        assert!((stats.success_rate() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_from_backfill_separates_empty_batches() {
        let summary = BackfillSummary {
            indicators: 2,
            batches_total: 5,
            failed_batches: vec!["433:2015-01-01 to 2019-12-31".into()],
            empty_batches: vec![
                "189:2015-01-01 to 2019-12-31".into(),
                "189:2020-01-01 to 2024-12-31".into(),
            ],
            rows_extracted: 120,
            rows_inserted: 80,
            ..Default::default()
        };

        let stats = CollectionStats::from_backfill(&summary);
        assert_eq!(stats.total, 5);
        assert_eq!(stats.success, 2);
        assert_eq!(stats.errors, 1);
        assert_eq!(stats.empty, 2);
        assert_eq!(stats.rows_fetched, 120);
        assert_eq!(stats.rows_inserted, 80);
        assert_eq!(stats.failed_keys, vec!["433:2015-01-01 to 2019-12-31"]);
        assert!((stats.success_rate() - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_success_rate_empty() {
        assert_eq!(CollectionStats::new().success_rate(), 0.0);
    }
}
