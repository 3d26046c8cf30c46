//! 적재 후 검증 결과.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 테이블 하나에 대한 읽기 전용 집계 스냅샷.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// 대상 테이블 (예: "raw.stocks")
    pub table: String,
    pub total_rows: i64,
    /// 그룹 컬럼 고유값 수 (티커 수, 지표 수)
    pub distinct_groups: i64,
    /// 자연 키 고유값 수
    pub distinct_keys: i64,
    pub min_date: Option<NaiveDate>,
    pub max_date: Option<NaiveDate>,
    /// 그룹별 행 수
    pub group_counts: BTreeMap<String, i64>,
    /// 품질 검사 이름 → 위반 행 수
    pub checks: BTreeMap<String, i64>,
}

impl ValidationResult {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ..Default::default()
        }
    }

    /// 모든 품질 검사의 위반 건수가 0이면 통과.
    pub fn passed(&self) -> bool {
        self.checks.values().all(|&count| count == 0)
    }

    /// 위반이 있는 검사 목록.
    pub fn failed_checks(&self) -> Vec<(&str, i64)> {
        self.checks
            .iter()
            .filter(|(_, &count)| count > 0)
            .map(|(name, &count)| (name.as_str(), count))
            .collect()
    }

    /// 자연 키 기준 중복 행 수.
    pub fn duplicate_keys(&self) -> i64 {
        self.total_rows - self.distinct_keys
    }

    pub fn is_empty(&self) -> bool {
        self.total_rows == 0
    }

    /// 요약 로그 출력
    pub fn log_summary(&self) {
        tracing::info!(
            table = %self.table,
            total_rows = self.total_rows,
            distinct_groups = self.distinct_groups,
            distinct_keys = self.distinct_keys,
            min_date = ?self.min_date,
            max_date = ?self.max_date,
            passed = self.passed(),
            "검증 요약"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passed_and_failed_checks() {
        let mut result = ValidationResult::new("raw.stocks");
        result.total_rows = 100;
        result.distinct_keys = 100;
        result.checks.insert("null_close".to_string(), 0);
        result.checks.insert("invalid_range".to_string(), 0);
        assert!(result.passed());
        assert_eq!(result.duplicate_keys(), 0);

        result.checks.insert("non_positive_close".to_string(), 3);
        assert!(!result.passed());
        assert_eq!(result.failed_checks(), vec![("non_positive_close", 3)]);
    }

    #[test]
    fn test_empty_result_passes_without_checks() {
        let result = ValidationResult::new("raw.indicators");
        assert!(result.is_empty());
        assert!(result.passed());
    }
}
