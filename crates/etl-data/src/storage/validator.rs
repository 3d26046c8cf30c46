//! 적재 후 검증기.
//!
//! 읽기 전용 집계 쿼리만 수행합니다.

use chrono::NaiveDate;
use etl_core::ValidationResult;
use sqlx::PgPool;
use tracing::{info, warn};

use super::loader::{Loadable, TableSpec};
use super::tables::{INDICATORS_TABLE, STOCKS_TABLE};
use crate::error::Result;

/// 테이블 집계 검증기.
#[derive(Clone)]
pub struct Validator {
    pool: PgPool,
}

impl Validator {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 레코드 타입의 대상 테이블 집계.
    pub async fn summarize<R: Loadable>(&self) -> Result<ValidationResult> {
        self.summarize_table(R::TABLE).await
    }

    /// `raw.stocks`, `raw.indicators` 집계.
    pub async fn summarize_all(&self) -> Result<Vec<ValidationResult>> {
        Ok(vec![
            self.summarize_table(&STOCKS_TABLE).await?,
            self.summarize_table(&INDICATORS_TABLE).await?,
        ])
    }

    /// 행 수, 고유 그룹/키 수, 날짜 범위, 그룹별 행 수, 품질 검사 위반 수.
    pub async fn summarize_table(&self, spec: &TableSpec) -> Result<ValidationResult> {
        let table = spec.qualified_name();
        let mut result = ValidationResult::new(table.clone());

        let (total_rows, distinct_groups, distinct_keys, min_date, max_date): (
            i64,
            i64,
            i64,
            Option<NaiveDate>,
            Option<NaiveDate>,
        ) = sqlx::query_as(&format!(
            r#"
            SELECT
                COUNT(*) AS total_rows,
                COUNT(DISTINCT {group}) AS distinct_groups,
                COUNT(DISTINCT ({key})) AS distinct_keys,
                MIN({date}) AS min_date,
                MAX({date}) AS max_date
            FROM {table}
            "#,
            group = spec.group_column,
            key = spec.natural_key.join(", "),
            date = spec.date_column,
            table = table,
        ))
        .fetch_one(&self.pool)
        .await?;

        result.total_rows = total_rows;
        result.distinct_groups = distinct_groups;
        result.distinct_keys = distinct_keys;
        result.min_date = min_date;
        result.max_date = max_date;

        let groups: Vec<(String, i64)> = sqlx::query_as(&format!(
            "SELECT {group}::text, COUNT(*) FROM {table} GROUP BY {group} ORDER BY {group}",
            group = spec.group_column,
            table = table,
        ))
        .fetch_all(&self.pool)
        .await?;
        result.group_counts = groups.into_iter().collect();

        for (name, predicate) in spec.quality_checks {
            let (count,): (i64,) = sqlx::query_as(&format!(
                "SELECT COUNT(*) FROM {} WHERE {}",
                table, predicate
            ))
            .fetch_one(&self.pool)
            .await?;

            if count > 0 {
                warn!(table = %table, check = *name, violations = count, "품질 검사 위반");
            }
            result.checks.insert(name.to_string(), count);
        }

        result.log_summary();
        Ok(result)
    }

    /// 최근 `hours`시간 내 적재된 행 수.
    pub async fn recent_load_count(&self, spec: &TableSpec, hours: u32) -> Result<i64> {
        let hours = i32::try_from(hours).unwrap_or(i32::MAX);
        let (count,): (i64,) = sqlx::query_as(&format!(
            "SELECT COUNT(*) FROM {} WHERE loaded_at > NOW() - make_interval(hours => $1)",
            spec.qualified_name()
        ))
        .bind(hours)
        .fetch_one(&self.pool)
        .await?;

        info!(table = %spec.qualified_name(), hours = hours, rows = count, "최근 적재 확인");
        Ok(count)
    }
}
