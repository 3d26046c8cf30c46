//! raw 스키마 DDL.
//!
//! 자연 키 고유 제약이 `ON CONFLICT` 병합의 충돌 대상입니다.

use sqlx::PgPool;
use tracing::info;

use crate::error::Result;

/// `raw.stocks`, `raw.indicators` 생성 DDL.
pub const RAW_SCHEMA_SQL: &str = r#"
CREATE SCHEMA IF NOT EXISTS raw;

CREATE TABLE IF NOT EXISTS raw.stocks (
    id BIGSERIAL PRIMARY KEY,
    ticker VARCHAR(20) NOT NULL,
    date DATE NOT NULL,
    open_price NUMERIC(18, 4),
    high_price NUMERIC(18, 4),
    low_price NUMERIC(18, 4),
    close_price NUMERIC(18, 4),
    volume BIGINT,
    adj_close NUMERIC(18, 4),
    loaded_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    source VARCHAR(50) NOT NULL DEFAULT 'yahoo_finance',
    CONSTRAINT stocks_ticker_date_key UNIQUE (ticker, date)
);

CREATE INDEX IF NOT EXISTS idx_stocks_date ON raw.stocks (date);

CREATE TABLE IF NOT EXISTS raw.indicators (
    id BIGSERIAL PRIMARY KEY,
    indicator_code VARCHAR(20) NOT NULL,
    indicator_name VARCHAR(100) NOT NULL,
    date DATE NOT NULL,
    value NUMERIC,
    unit VARCHAR(50),
    frequency VARCHAR(20),
    loaded_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    source VARCHAR(50) NOT NULL DEFAULT 'bcb_api',
    CONSTRAINT indicators_code_date_key UNIQUE (indicator_code, date)
);

CREATE INDEX IF NOT EXISTS idx_indicators_date ON raw.indicators (date);
"#;

/// raw 스키마와 테이블이 없으면 생성합니다.
pub async fn ensure_raw_schema(pool: &PgPool) -> Result<()> {
    sqlx::raw_sql(RAW_SCHEMA_SQL).execute(pool).await?;
    info!("raw 스키마 확인 완료");
    Ok(())
}
