//! raw 테이블 정의와 레코드 바인딩.

use etl_core::{IndicatorRecord, PriceRecord, PRICE_SOURCE};
use sqlx::postgres::PgArguments;
use sqlx::query::Query;
use sqlx::Postgres;

use super::loader::{Loadable, TableSpec};

/// `raw.stocks`: 종목 일봉.
pub const STOCKS_TABLE: TableSpec = TableSpec {
    schema: "raw",
    name: "stocks",
    required_columns: &[
        "ticker",
        "date",
        "open_price",
        "high_price",
        "low_price",
        "close_price",
        "volume",
    ],
    natural_key: &["ticker", "date"],
    group_column: "ticker",
    date_column: "date",
    quality_checks: &[
        ("null_close", "close_price IS NULL"),
        ("non_positive_close", "close_price <= 0"),
        ("invalid_range", "high_price < low_price"),
    ],
};

/// `raw.indicators`: 거시 지표 관측값.
pub const INDICATORS_TABLE: TableSpec = TableSpec {
    schema: "raw",
    name: "indicators",
    required_columns: &[
        "indicator_code",
        "indicator_name",
        "date",
        "value",
        "unit",
        "frequency",
    ],
    natural_key: &["indicator_code", "date"],
    group_column: "indicator_code",
    date_column: "date",
    quality_checks: &[("null_value", "value IS NULL")],
};

impl Loadable for PriceRecord {
    const TABLE: &'static TableSpec = &STOCKS_TABLE;
    const COLUMNS: &'static [(&'static str, &'static str)] = &[
        ("ticker", "text"),
        ("date", "date"),
        ("open_price", "numeric"),
        ("high_price", "numeric"),
        ("low_price", "numeric"),
        ("close_price", "numeric"),
        ("volume", "int8"),
        ("adj_close", "numeric"),
    ];

    fn source_tag(&self) -> &str {
        PRICE_SOURCE
    }

    fn bind_columns<'q>(
        query: Query<'q, Postgres, PgArguments>,
        chunk: &[Self],
    ) -> Query<'q, Postgres, PgArguments> {
        query
            .bind(chunk.iter().map(|r| r.ticker.clone()).collect::<Vec<_>>())
            .bind(chunk.iter().map(|r| r.date).collect::<Vec<_>>())
            .bind(chunk.iter().map(|r| r.open_price).collect::<Vec<_>>())
            .bind(chunk.iter().map(|r| r.high_price).collect::<Vec<_>>())
            .bind(chunk.iter().map(|r| r.low_price).collect::<Vec<_>>())
            .bind(chunk.iter().map(|r| r.close_price).collect::<Vec<_>>())
            .bind(chunk.iter().map(|r| r.volume).collect::<Vec<_>>())
            .bind(chunk.iter().map(|r| r.adj_close).collect::<Vec<_>>())
    }
}

impl Loadable for IndicatorRecord {
    const TABLE: &'static TableSpec = &INDICATORS_TABLE;
    const COLUMNS: &'static [(&'static str, &'static str)] = &[
        ("indicator_code", "text"),
        ("indicator_name", "text"),
        ("date", "date"),
        ("value", "numeric"),
        ("unit", "text"),
        ("frequency", "text"),
    ];

    fn source_tag(&self) -> &str {
        &self.source
    }

    fn bind_columns<'q>(
        query: Query<'q, Postgres, PgArguments>,
        chunk: &[Self],
    ) -> Query<'q, Postgres, PgArguments> {
        query
            .bind(chunk.iter().map(|r| r.indicator_code.clone()).collect::<Vec<_>>())
            .bind(chunk.iter().map(|r| r.indicator_name.clone()).collect::<Vec<_>>())
            .bind(chunk.iter().map(|r| r.date).collect::<Vec<_>>())
            .bind(chunk.iter().map(|r| r.value).collect::<Vec<_>>())
            .bind(chunk.iter().map(|r| r.unit.clone()).collect::<Vec<_>>())
            .bind(
                chunk
                    .iter()
                    .map(|r| r.frequency.as_str().to_string())
                    .collect::<Vec<_>>(),
            )
    }
}
