//! 멱등 적재기.
//!
//! 한 번의 `load` 호출은 하나의 트랜잭션에서 수행됩니다:
//!
//! 1. `DROP TABLE IF EXISTS temp_<table>_<millis>` (이전 실행 잔여물)
//! 2. 대상 테이블 구조로 임시 스테이징 테이블 생성 (`ON COMMIT DROP`)
//! 3. 1000행 단위 UNNEST 일괄 삽입 (`loaded_at`, `source` 포함)
//! 4. `INSERT ... SELECT DISTINCT ON (key) ... ON CONFLICT (key) DO NOTHING`
//! 5. 스테이징 테이블 삭제 후 커밋
//!
//! 실패 시 롤백하므로 스테이징 테이블과 부분 병합 결과가 남지 않습니다.
//! 반환값은 병합으로 새로 생긴 행 수이며, 입력 내 중복이나 기존 행과 겹치는
//! 레코드는 포함하지 않습니다.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgArguments, PgConnection, PgPool};
use sqlx::query::Query;
use sqlx::Postgres;
use tracing::{debug, error, info, warn};

use crate::error::{DataError, Result};
use crate::extractor::RecordSink;

/// 스테이징 삽입 청크 크기.
const STAGING_CHUNK_SIZE: usize = 1000;

/// 적재 대상 테이블 정의.
#[derive(Debug)]
pub struct TableSpec {
    pub schema: &'static str,
    pub name: &'static str,
    /// 적재 시 반드시 있어야 하는 컬럼
    pub required_columns: &'static [&'static str],
    /// 기본 자연 키
    pub natural_key: &'static [&'static str],
    /// 그룹별 집계 컬럼 (티커, 지표 코드)
    pub group_column: &'static str,
    pub date_column: &'static str,
    /// 품질 검사 (이름, 위반 조건)
    pub quality_checks: &'static [(&'static str, &'static str)],
}

impl TableSpec {
    /// `schema.name`
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.schema, self.name)
    }
}

/// 웨어하우스에 적재할 수 있는 레코드.
pub trait Loadable: Sized + Send + Sync {
    /// 대상 테이블
    const TABLE: &'static TableSpec;

    /// 레코드가 제공하는 컬럼과 PostgreSQL 타입 (바인딩 순서)
    const COLUMNS: &'static [(&'static str, &'static str)];

    /// 출처 태그
    fn source_tag(&self) -> &str;

    /// `COLUMNS` 순서대로 컬럼 배열을 바인딩합니다.
    fn bind_columns<'q>(
        query: Query<'q, Postgres, PgArguments>,
        chunk: &[Self],
    ) -> Query<'q, Postgres, PgArguments>;

    fn column_names() -> Vec<&'static str> {
        Self::COLUMNS.iter().map(|(name, _)| *name).collect()
    }
}

/// 적재 전 입력 검증. I/O 없이 실패합니다.
pub fn check_preconditions<R: Loadable>(records: &[R], natural_key: &[&str]) -> Result<()> {
    if records.is_empty() {
        return Err(DataError::EmptyInput);
    }

    let columns = R::column_names();
    let table = R::TABLE.qualified_name();

    let missing: Vec<String> = R::TABLE
        .required_columns
        .iter()
        .filter(|c| !columns.contains(c))
        .map(|c| c.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(DataError::MissingColumns { table, missing });
    }

    if natural_key.is_empty() || natural_key.iter().any(|k| !columns.contains(k)) {
        return Err(DataError::InvalidNaturalKey {
            table,
            key: natural_key.iter().map(|k| k.to_string()).collect(),
        });
    }

    Ok(())
}

/// 멱등 적재기.
#[derive(Clone)]
pub struct Loader {
    pool: PgPool,
}

impl Loader {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// 테이블 기본 자연 키로 적재합니다.
    pub async fn load_records<R: Loadable>(&self, records: &[R]) -> Result<u64> {
        self.load(records, R::TABLE.natural_key).await
    }

    /// 레코드를 스테이징 후 병합하고 새로 삽입된 행 수를 반환합니다.
    pub async fn load<R: Loadable>(&self, records: &[R], natural_key: &[&str]) -> Result<u64> {
        check_preconditions(records, natural_key)?;

        let table = R::TABLE.qualified_name();
        let loaded_at = Utc::now();
        let staging = format!("temp_{}_{}", R::TABLE.name, loaded_at.timestamp_millis());

        info!(table = %table, rows = records.len(), "적재 시작");

        let mut tx = self.pool.begin().await?;
        match merge_via_staging(&mut tx, records, natural_key, &staging, loaded_at).await {
            Ok(inserted) => {
                tx.commit().await?;
                info!(
                    table = %table,
                    rows = records.len(),
                    inserted = inserted,
                    skipped = records.len() as u64 - inserted.min(records.len() as u64),
                    "적재 완료"
                );
                Ok(inserted)
            }
            Err(e) => {
                error!(table = %table, staging = %staging, error = %e, "적재 실패, 롤백");
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(error = %rollback_err, "롤백 실패");
                }
                Err(e)
            }
        }
    }
}

async fn merge_via_staging<R: Loadable>(
    conn: &mut PgConnection,
    records: &[R],
    natural_key: &[&str],
    staging: &str,
    loaded_at: DateTime<Utc>,
) -> Result<u64> {
    let target = R::TABLE.qualified_name();
    let mut columns = R::column_names();
    columns.extend(["loaded_at", "source"]);
    let column_list = columns.join(", ");
    let key_list = natural_key.join(", ");

    sqlx::query(&format!("DROP TABLE IF EXISTS {}", staging))
        .execute(&mut *conn)
        .await?;

    sqlx::query(&format!(
        "CREATE TEMP TABLE {} ON COMMIT DROP AS SELECT {} FROM {} WITH NO DATA",
        staging, column_list, target
    ))
    .execute(&mut *conn)
    .await?;

    let insert_sql = staging_insert_sql::<R>(staging, &column_list);
    for chunk in records.chunks(STAGING_CHUNK_SIZE) {
        let loaded: Vec<DateTime<Utc>> = vec![loaded_at; chunk.len()];
        let sources: Vec<String> = chunk.iter().map(|r| r.source_tag().to_string()).collect();

        R::bind_columns(sqlx::query(&insert_sql), chunk)
            .bind(loaded)
            .bind(sources)
            .execute(&mut *conn)
            .await?;
    }
    debug!(staging = %staging, rows = records.len(), "스테이징 완료");

    let result = sqlx::query(&format!(
        r#"
        INSERT INTO {target} ({columns})
        SELECT DISTINCT ON ({key}) {columns}
        FROM {staging}
        ORDER BY {key}
        ON CONFLICT ({key}) DO NOTHING
        "#,
        target = target,
        columns = column_list,
        key = key_list,
        staging = staging,
    ))
    .execute(&mut *conn)
    .await?;

    sqlx::query(&format!("DROP TABLE IF EXISTS {}", staging))
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected())
}

/// `INSERT INTO staging (...) SELECT * FROM UNNEST($1::type[], ...)`
fn staging_insert_sql<R: Loadable>(staging: &str, column_list: &str) -> String {
    let arrays: Vec<String> = R::COLUMNS
        .iter()
        .map(|(_, pg_type)| pg_type)
        .chain([&"timestamptz", &"text"])
        .enumerate()
        .map(|(i, pg_type)| format!("${}::{}[]", i + 1, pg_type))
        .collect();

    format!(
        "INSERT INTO {} ({}) SELECT * FROM UNNEST({})",
        staging,
        column_list,
        arrays.join(", ")
    )
}

#[async_trait]
impl<R: Loadable> RecordSink<R> for Loader {
    async fn write(&self, records: &[R]) -> Result<u64> {
        self.load_records(records).await
    }
}
