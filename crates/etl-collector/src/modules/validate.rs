//! 적재 데이터 품질 리포트 모듈.

use std::fmt::Write as _;

use etl_core::ValidationResult;
use etl_data::{Validator, INDICATORS_TABLE, STOCKS_TABLE};
use sqlx::PgPool;

use crate::error::CollectorError;
use crate::Result;

/// 테이블 하나의 품질 결과
#[derive(Debug, Clone)]
pub struct TableQuality {
    pub result: ValidationResult,
    /// 최근 N시간 적재 행 수 (`fresh_hours` 지정 시)
    pub fresh_rows: Option<i64>,
}

impl TableQuality {
    pub fn passed(&self) -> bool {
        self.result.passed() && self.fresh_rows != Some(0)
    }
}

/// `raw.stocks`, `raw.indicators` 품질 리포트
#[derive(Debug, Clone)]
pub struct QualityReport {
    pub tables: Vec<TableQuality>,
    pub fresh_hours: Option<u32>,
}

impl QualityReport {
    pub fn passed(&self) -> bool {
        self.tables.iter().all(TableQuality::passed)
    }

    /// 실패한 테이블이 있으면 `Validation` 에러
    pub fn ensure_passed(&self) -> Result<()> {
        let failed: Vec<&str> = self
            .tables
            .iter()
            .filter(|t| !t.passed())
            .map(|t| t.result.table.as_str())
            .collect();

        if failed.is_empty() {
            Ok(())
        } else {
            Err(CollectorError::Validation(format!(
                "quality checks failed for {}",
                failed.join(", ")
            )))
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();

        for table in &self.tables {
            let result = &table.result;
            let _ = writeln!(out, "=== {} ===", result.table);
            let _ = writeln!(out, "총 행 수: {}", result.total_rows);
            let _ = writeln!(out, "고유 그룹 수: {}", result.distinct_groups);
            let _ = writeln!(
                out,
                "고유 키 수: {} (중복 {})",
                result.distinct_keys,
                result.duplicate_keys()
            );
            match (result.min_date, result.max_date) {
                (Some(min), Some(max)) => {
                    let _ = writeln!(out, "기간: {} ~ {}", min, max);
                }
                _ => {
                    let _ = writeln!(out, "기간: -");
                }
            }
            for (name, count) in &result.checks {
                let _ = writeln!(out, "  {}: {}", name, count);
            }
            if !result.group_counts.is_empty() {
                let _ = writeln!(out, "그룹별 행 수:");
                for (group, count) in &result.group_counts {
                    let _ = writeln!(out, "  {}: {}", group, count);
                }
            }
            if let (Some(hours), Some(rows)) = (self.fresh_hours, table.fresh_rows) {
                let _ = writeln!(out, "최근 {}시간 적재: {}", hours, rows);
            }
            let _ = writeln!(out, "결과: {}\n", if table.passed() { "PASS" } else { "FAIL" });
        }

        out
    }
}

/// 품질 리포트 생성.
///
/// 읽기 전용 집계만 수행합니다. `fresh_hours`가 있으면 테이블마다
/// 최근 적재 행 수도 확인합니다.
pub async fn quality_report(pool: &PgPool, fresh_hours: Option<u32>) -> Result<QualityReport> {
    let validator = Validator::new(pool.clone());
    let mut tables = Vec::new();

    for spec in [&STOCKS_TABLE, &INDICATORS_TABLE] {
        let result = validator.summarize_table(spec).await?;
        let fresh_rows = match fresh_hours {
            Some(hours) => Some(validator.recent_load_count(spec, hours).await?),
            None => None,
        };
        tables.push(TableQuality { result, fresh_rows });
    }

    Ok(QualityReport {
        tables,
        fresh_hours,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn stocks(null_close: i64) -> ValidationResult {
        let mut result = ValidationResult::new("raw.stocks");
        result.total_rows = 40;
        result.distinct_groups = 2;
        result.distinct_keys = 40;
        result.min_date = NaiveDate::from_ymd_opt(2024, 1, 2);
        result.max_date = NaiveDate::from_ymd_opt(2024, 1, 31);
        result.checks.insert("null_close".into(), null_close);
        result.checks.insert("invalid_range".into(), 0);
        result
    }

    #[test]
    fn test_report_passes_when_checks_clean() {
        let report = QualityReport {
            tables: vec![TableQuality {
                result: stocks(0),
                fresh_rows: None,
            }],
            fresh_hours: None,
        };
        assert!(report.passed());
        assert!(report.ensure_passed().is_ok());

        let rendered = report.render();
        assert!(rendered.contains("=== raw.stocks ==="));
        assert!(rendered.contains("기간: 2024-01-02 ~ 2024-01-31"));
        assert!(rendered.contains("결과: PASS"));
    }

    #[test]
    fn test_report_fails_on_check_violation() {
        let report = QualityReport {
            tables: vec![TableQuality {
                result: stocks(3),
                fresh_rows: None,
            }],
            fresh_hours: None,
        };
        assert!(!report.passed());
        assert!(matches!(
            report.ensure_passed(),
            Err(CollectorError::Validation(msg)) if msg.contains("raw.stocks")
        ));
        assert!(report.render().contains("결과: FAIL"));
    }

    #[test]
    fn test_report_fails_without_fresh_rows() {
        let report = QualityReport {
            tables: vec![TableQuality {
                result: stocks(0),
                fresh_rows: Some(0),
            }],
            fresh_hours: Some(24),
        };
        assert!(!report.passed());
        assert!(report.render().contains("최근 24시간 적재: 0"));
    }
}
