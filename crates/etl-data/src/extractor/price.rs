//! 주가 추출기.

use std::sync::Arc;

use chrono::NaiveDate;
use etl_core::{market_today, resolve_date_range, ExtractionConfig, PriceRecord};
use tracing::{error, info, warn};

use super::{EntityFailure, Extraction};
use crate::error::{DataError, Result};
use crate::provider::PriceSource;

/// 설정된 종목 전체에 대한 일봉 추출기.
pub struct PriceExtractor {
    config: Arc<ExtractionConfig>,
    source: Arc<dyn PriceSource>,
    today: Option<NaiveDate>,
}

impl PriceExtractor {
    pub fn new(config: Arc<ExtractionConfig>, source: Arc<dyn PriceSource>) -> Self {
        Self {
            config,
            source,
            today: None,
        }
    }

    /// 기준일 고정 (기본값은 상파울루 기준 오늘).
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(market_today)
    }

    /// `[start, end)` 구간의 일봉을 설정된 종목 순서대로 추출합니다.
    ///
    /// 종목별 실패는 기록 후 계속 진행하고, 모든 종목이 실패하면
    /// `AllEntitiesFailed`를 반환합니다. 조회 결과가 비어 있는 종목도 실패로 봅니다.
    pub async fn extract_historical(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Extraction<PriceRecord>> {
        let (start, end) = resolve_date_range(start, end, self.today(), self.config.sanity_floor)?;
        let tickers = &self.config.stock_tickers;

        info!(
            source = self.source.name(),
            tickers = tickers.len(),
            start = %start,
            end = %end,
            "주가 추출 시작"
        );

        let mut extraction = Extraction::new(tickers.len());

        for (i, ticker) in tickers.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(self.config.rate_limit_delay()).await;
            }

            match self.source.fetch_prices(ticker, start, end).await {
                Ok(records) if records.is_empty() => {
                    warn!(ticker = %ticker, "조회 데이터 없음");
                    extraction.failures.push(EntityFailure::no_data(ticker));
                }
                Ok(records) => {
                    info!(ticker = %ticker, rows = records.len(), "종목 추출 완료");
                    extraction.records.extend(records);
                }
                Err(e) => {
                    error!(ticker = %ticker, error = %e, "종목 추출 실패");
                    extraction.failures.push(EntityFailure::error(ticker, &e));
                }
            }
        }

        if !tickers.is_empty() && extraction.failures.len() == tickers.len() {
            return Err(DataError::AllEntitiesFailed {
                kind: "tickers",
                failed: extraction.failed_keys(),
            });
        }

        extraction.log_summary("prices");
        Ok(extraction)
    }

    /// 최근 `lookback_days`일 (미지정 시 설정값) 증분 추출.
    pub async fn extract_incremental(
        &self,
        lookback_days: Option<u32>,
    ) -> Result<Extraction<PriceRecord>> {
        let today = self.today();
        let start = self.config.incremental_start(today, lookback_days);
        info!(start = %start, end = %today, "주가 증분 추출");
        self.extract_historical(start, today).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::testing::FakeSource;
    use tokio::time::Instant;
    use std::time::Duration;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn config(tickers: &[&str]) -> Arc<ExtractionConfig> {
        Arc::new(ExtractionConfig::default().with_tickers(tickers.iter().copied()))
    }

    fn extractor(tickers: &[&str], source: Arc<FakeSource>) -> PriceExtractor {
        PriceExtractor::new(config(tickers), source).with_today(date(2025, 2, 7))
    }

    #[tokio::test(start_paused = true)]
    async fn test_partial_failure_keeps_other_tickers() {
        let source = Arc::new(FakeSource::failing(&["VALE3.SA"]));
        let extraction = extractor(&["PETR4", "VALE3", "ITUB4"], source.clone())
            .extract_historical(date(2024, 1, 1), date(2024, 1, 31))
            .await
            .unwrap();

        assert_eq!(extraction.attempted, 3);
        assert_eq!(extraction.succeeded(), 2);
        assert_eq!(extraction.failed_keys(), vec!["VALE3.SA"]);

        // 설정 순서 유지
        let tickers: Vec<&str> = extraction.records.iter().map(|r| r.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["PETR4.SA", "PETR4.SA", "ITUB4.SA", "ITUB4.SA"]);
        assert_eq!(source.calls().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_failed_raises_with_keys() {
        let source = Arc::new(FakeSource::failing(&["PETR4.SA"]).with_empty(&["VALE3.SA"]));
        let result = extractor(&["PETR4", "VALE3"], source)
            .extract_historical(date(2024, 1, 1), date(2024, 1, 31))
            .await;

        match result {
            Err(DataError::AllEntitiesFailed { kind, failed }) => {
                assert_eq!(kind, "tickers");
                assert_eq!(failed, vec!["PETR4.SA", "VALE3.SA"]);
            }
            other => panic!("unexpected result: {:?}", other.map(|e| e.records.len())),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_range_fails_before_any_call() {
        let source = Arc::new(FakeSource::default());
        let extractor = extractor(&["PETR4"], source.clone());

        let result = extractor
            .extract_historical(date(2024, 2, 1), date(2024, 1, 1))
            .await;
        assert!(matches!(result, Err(DataError::Core(_))));

        let result = extractor
            .extract_historical(date(1999, 1, 1), date(2024, 1, 1))
            .await;
        assert!(matches!(result, Err(DataError::Core(_))));

        assert!(source.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_future_end_is_clamped_to_today() {
        let source = Arc::new(FakeSource::default());
        extractor(&["PETR4"], source.clone())
            .extract_historical(date(2025, 1, 1), date(2026, 1, 1))
            .await
            .unwrap();

        assert_eq!(source.calls()[0].2, date(2025, 2, 7));
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_between_tickers_only() {
        let source = Arc::new(FakeSource::default());
        let start = Instant::now();

        extractor(&["PETR4", "VALE3", "ITUB4"], source)
            .extract_historical(date(2024, 1, 1), date(2024, 1, 31))
            .await
            .unwrap();

        // 3종목 사이 2회 x 500ms
        assert_eq!(start.elapsed(), Duration::from_millis(1_000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_incremental_uses_lookback() {
        let source = Arc::new(FakeSource::default());
        extractor(&["PETR4"], source.clone())
            .extract_incremental(None)
            .await
            .unwrap();

        let (_, start, end) = source.calls()[0].clone();
        assert_eq!(start, date(2025, 2, 2));
        assert_eq!(end, date(2025, 2, 7));
    }
}
