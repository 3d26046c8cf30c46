//! Yahoo Finance 일봉 어댑터.
//!
//! `yahoo_finance_api`로 `[start 00:00 UTC, end 00:00 UTC)` 구간을 조회하므로
//! 구간은 `[start, end)` 입니다 (종료일 미포함).
//!
//! 타임스탬프는 응답 메타데이터의 `gmtoffset`을 적용해 거래소 현지 날짜로
//! 변환합니다. 가격은 소수점 4자리로 반올림합니다.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use etl_core::{ExtractionConfig, PriceRecord};
use rust_decimal::Decimal;
use time::OffsetDateTime;
use tracing::{debug, warn};
use yahoo_finance_api as yahoo;

use super::PriceSource;
use crate::error::{DataError, Result};
use crate::retry::RetryPolicy;
use crate::throttle::RateLimiter;

/// 가격 반올림 자릿수.
const PRICE_SCALE: u32 = 4;

/// Yahoo Finance 일봉 클라이언트.
pub struct YahooFinanceClient {
    connector: yahoo::YahooConnector,
    limiter: RateLimiter,
    retry: RetryPolicy,
}

impl YahooFinanceClient {
    /// 추출 설정으로 클라이언트를 생성합니다.
    pub fn new(config: &ExtractionConfig) -> Result<Self> {
        let connector = yahoo::YahooConnector::new()
            .map_err(|e| DataError::Request(format!("Yahoo Finance 연결 실패: {}", e)))?;

        Ok(Self {
            connector,
            limiter: RateLimiter::new(config.price_call_spacing()),
            retry: RetryPolicy::from_config(config),
        })
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    async fn fetch_once(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceRecord>> {
        let response = self
            .connector
            .get_quote_history(ticker, midnight_utc(start)?, midnight_utc(end)?)
            .await
            .map_err(DataError::from)?;

        // 구간에 거래일이 없으면 quote 목록 자체가 비어 있거나 누락됨
        let quotes = match response.quotes() {
            Ok(quotes) => quotes,
            Err(e) => {
                debug!(ticker = ticker, error = %e, "Yahoo quote 없음");
                return Ok(Vec::new());
            }
        };
        let gmtoffset = response
            .metadata()
            .map(|meta| i64::from(meta.gmtoffset))
            .unwrap_or_default();

        Ok(quotes_to_records(ticker, start, end, gmtoffset, &quotes))
    }
}

#[async_trait]
impl PriceSource for YahooFinanceClient {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    async fn fetch_prices(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceRecord>> {
        let operation = format!("yahoo:{}", ticker);
        self.limiter
            .run(|| self.retry.run(&operation, || self.fetch_once(ticker, start, end)))
            .await
    }
}

impl From<yahoo::YahooError> for DataError {
    fn from(err: yahoo::YahooError) -> Self {
        match err {
            yahoo::YahooError::ConnectionFailed(e) => DataError::Network(e.to_string()),
            // 상태 줄 ("429 Too Many Requests")
            yahoo::YahooError::FetchFailed(status_line) => {
                let status = status_line
                    .split_whitespace()
                    .next()
                    .and_then(|code| code.parse::<u16>().ok());
                match status {
                    Some(status) => DataError::HttpStatus {
                        status,
                        body: status_line,
                    },
                    None => DataError::Request(status_line),
                }
            }
            other => DataError::Parse(other.to_string()),
        }
    }
}

fn midnight_utc(date: NaiveDate) -> Result<OffsetDateTime> {
    let timestamp = date
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default();
    OffsetDateTime::from_unix_timestamp(timestamp)
        .map_err(|e| DataError::Request(format!("잘못된 날짜 {}: {}", date, e)))
}

/// 유한한 값만 소수점 4자리 Decimal로 변환
fn to_price(value: f64) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    Decimal::from_f64_retain(value).map(|d| d.round_dp(PRICE_SCALE))
}

/// quote 목록을 `[start, end)` 구간의 레코드로 변환합니다.
///
/// OHLC 값이 없는 행과 종가가 0 이하인 행은 경고 후 제외합니다.
/// 수정 종가가 없으면 종가를 사용합니다.
fn quotes_to_records(
    ticker: &str,
    start: NaiveDate,
    end: NaiveDate,
    gmtoffset: i64,
    quotes: &[yahoo::Quote],
) -> Vec<PriceRecord> {
    let mut records = Vec::with_capacity(quotes.len());

    for quote in quotes {
        let ts = quote.timestamp as i64;
        let Some(date) = DateTime::from_timestamp(ts + gmtoffset, 0).map(|dt| dt.date_naive())
        else {
            warn!(ticker = ticker, timestamp = ts, "잘못된 타임스탬프, 행 건너뜀");
            continue;
        };
        if date < start || date >= end {
            continue;
        }

        let prices = (
            to_price(quote.open),
            to_price(quote.high),
            to_price(quote.low),
            to_price(quote.close),
        );
        let (Some(open_price), Some(high_price), Some(low_price), Some(close_price)) = prices
        else {
            warn!(ticker = ticker, date = %date, "OHLC 값 누락, 행 건너뜀");
            continue;
        };

        if close_price <= Decimal::ZERO {
            warn!(ticker = ticker, date = %date, close = %close_price, "종가 0 이하, 행 건너뜀");
            continue;
        }

        let adj_close = to_price(quote.adjclose)
            .filter(|adj| *adj > Decimal::ZERO)
            .unwrap_or(close_price);

        records.push(PriceRecord {
            ticker: ticker.to_string(),
            date,
            open_price,
            high_price,
            low_price,
            close_price,
            volume: i64::try_from(quote.volume).unwrap_or(i64::MAX),
            adj_close,
        });
    }

    debug!(ticker = ticker, rows = records.len(), "Yahoo 일봉 변환 완료");
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    const SAO_PAULO_OFFSET: i64 = -10_800;

    fn quote(timestamp: i64, open: f64, close: f64, adjclose: f64, volume: u64) -> yahoo::Quote {
        yahoo::Quote {
            timestamp: timestamp as _,
            open,
            high: open.max(close) + 0.5,
            low: open.min(close) - 0.5,
            volume: volume as _,
            close,
            adjclose,
        }
    }

    // 2024-01-02 ~ 2024-01-05, 13:00 UTC
    fn quotes() -> Vec<yahoo::Quote> {
        vec![
            quote(1704200400, 37.1, 37.512345, 33.12, 41_200_000),
            quote(1704286800, 37.5, 0.0, 0.0, 30_000_000),
            quote(1704373200, f64::NAN, 37.9, 33.4, 100),
            quote(1704459600, 38.0, 38.2, f64::NAN, 0),
        ]
    }

    #[test]
    fn test_quotes_to_records_filters_rows() {
        let records = quotes_to_records(
            "PETR4.SA",
            date(2024, 1, 1),
            date(2024, 1, 10),
            SAO_PAULO_OFFSET,
            &quotes(),
        );

        // 종가 0, OHLC 누락 행 제거
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].date, date(2024, 1, 2));
        assert_eq!(records[0].close_price, dec!(37.5123));
        assert_eq!(records[0].adj_close, dec!(33.12));
        assert_eq!(records[0].volume, 41_200_000);

        // 수정 종가 누락
        assert_eq!(records[1].date, date(2024, 1, 5));
        assert_eq!(records[1].volume, 0);
        assert_eq!(records[1].adj_close, records[1].close_price);
    }

    #[test]
    fn test_quotes_to_records_end_is_exclusive() {
        let records = quotes_to_records(
            "PETR4.SA",
            date(2024, 1, 2),
            date(2024, 1, 5),
            SAO_PAULO_OFFSET,
            &quotes(),
        );

        assert_eq!(records.len(), 1);
        assert!(records
            .iter()
            .all(|r| r.date >= date(2024, 1, 2) && r.date < date(2024, 1, 5)));
    }

    #[test]
    fn test_gmtoffset_shifts_date() {
        // 2024-01-03 01:00 UTC = 2024-01-02 22:00 (UTC-3)
        let late = vec![quote(1704243600, 5.0, 5.1, 5.1, 0)];

        let local = quotes_to_records(
            "X",
            date(2024, 1, 1),
            date(2024, 1, 10),
            SAO_PAULO_OFFSET,
            &late,
        );
        assert_eq!(local[0].date, date(2024, 1, 2));

        let utc = quotes_to_records("X", date(2024, 1, 1), date(2024, 1, 10), 0, &late);
        assert_eq!(utc[0].date, date(2024, 1, 3));
    }

    #[test]
    fn test_fetch_failed_status_is_classified() {
        let err = DataError::from(yahoo::YahooError::FetchFailed("429 Too Many Requests".into()));
        assert!(matches!(err, DataError::HttpStatus { status: 429, .. }));
        assert!(err.is_transient());

        let err = DataError::from(yahoo::YahooError::FetchFailed("404 Not Found".into()));
        assert!(!err.is_transient());
    }

    #[test]
    fn test_midnight_utc() {
        assert_eq!(
            midnight_utc(date(2024, 1, 1)).unwrap().unix_timestamp(),
            1_704_067_200
        );
    }
}
