//! 주가/지표 통합 백필 모듈.
//!
//! 지정 구간에 대해 주가 → 지표 순서로 추출/적재하고, BCB 환율 시리즈가
//! 적재되지 않았으면 Yahoo `USDBRL=X` 종가로 대체합니다.

use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDate;
use etl_core::{
    resolve_date_range, ExtractionConfig, Frequency, IndicatorRecord, PriceRecord,
    ValidationResult, PRICE_SOURCE,
};
use etl_data::{
    BcbClient, IndicatorExtractor, Loader, PriceExtractor, PriceSource, Validator,
    YahooFinanceClient,
};
use sqlx::PgPool;
use tracing::{error, info, warn};

use crate::stats::CollectionStats;
use crate::Result;

/// BCB 환율 시리즈 코드
const BCB_USD_BRL_CODE: &str = "1";
/// Yahoo 환율 티커
const YAHOO_USD_BRL_TICKER: &str = "USDBRL=X";
const FALLBACK_CODE: &str = "USDBRL";
const FALLBACK_NAME: &str = "USD_BRL";
const FALLBACK_UNIT: &str = "BRL/USD";

/// 통합 백필 옵션
#[derive(Debug, Clone)]
pub struct BackfillOptions {
    pub start: NaiveDate,
    /// 미지정 시 오늘
    pub end: Option<NaiveDate>,
    pub prices: bool,
    pub indicators: bool,
}

/// 통합 백필 결과
#[derive(Debug, Default)]
pub struct BackfillReport {
    pub prices: Option<CollectionStats>,
    pub indicators: Option<CollectionStats>,
    /// Yahoo 대체 환율 적재 행 수
    pub usd_brl_fallback_rows: Option<u64>,
    pub validations: Vec<ValidationResult>,
}

/// 통합 백필 실행.
///
/// # 동작
/// 1. 주가 구간 추출 및 적재 (`prices`)
/// 2. 지표 구간 추출 및 적재 (`indicators`)
/// 3. 지표 테이블에 BCB 환율(`1`)이 없으면 Yahoo 환율로 대체
/// 4. 테이블별 검증 요약
pub async fn run_backfill(
    pool: &PgPool,
    config: Arc<ExtractionConfig>,
    options: &BackfillOptions,
) -> Result<BackfillReport> {
    let started = Instant::now();
    let loader = Loader::new(pool.clone());
    let validator = Validator::new(pool.clone());
    let mut report = BackfillReport::default();

    info!(
        start = %options.start,
        end = ?options.end,
        prices = options.prices,
        indicators = options.indicators,
        "=== 통합 백필 시작 ==="
    );

    if options.prices {
        let step = Instant::now();
        let extractor = PriceExtractor::new(
            Arc::clone(&config),
            Arc::new(YahooFinanceClient::new(&config)?),
        );
        let end = options.end.unwrap_or_else(|| extractor.today());
        let extraction = extractor.extract_historical(options.start, end).await?;

        let mut stats = CollectionStats::from_extraction(&extraction);
        if !extraction.records.is_empty() {
            stats.rows_inserted = loader.load_records(&extraction.records).await?;
        }
        stats.elapsed = step.elapsed();
        stats.log_summary("주가 백필");

        report
            .validations
            .push(validator.summarize::<PriceRecord>().await?);
        report.prices = Some(stats);
    }

    if options.indicators {
        let step = Instant::now();
        let extractor =
            IndicatorExtractor::new(Arc::clone(&config), Arc::new(BcbClient::new(&config)?));
        let end = options.end.unwrap_or_else(|| extractor.today());
        let extraction = extractor.extract_historical(options.start, end).await?;

        let mut stats = CollectionStats::from_extraction(&extraction);
        if !extraction.records.is_empty() {
            stats.rows_inserted = loader.load_records(&extraction.records).await?;
        }
        stats.elapsed = step.elapsed();
        stats.log_summary("지표 백필");
        report.indicators = Some(stats);

        let mut validation = validator.summarize::<IndicatorRecord>().await?;
        if !validation.group_counts.contains_key(BCB_USD_BRL_CODE) {
            warn!("BCB 환율 시리즈 없음, Yahoo Finance 대체 시도");
            let yahoo = YahooFinanceClient::new(&config)?;
            let inserted = backfill_usd_brl_fallback(
                &yahoo,
                &loader,
                &config,
                options.start,
                end,
                extractor.today(),
            )
            .await;
            report.usd_brl_fallback_rows = Some(inserted);
            validation = validator.summarize::<IndicatorRecord>().await?;
        }
        report.validations.push(validation);
    }

    info!(
        elapsed = %etl_core::format_duration(started.elapsed()),
        "=== 통합 백필 완료 ==="
    );
    Ok(report)
}

/// Yahoo 환율로 USD/BRL 지표 적재. 실패는 로그만 남기고 0을 반환합니다.
async fn backfill_usd_brl_fallback(
    source: &dyn PriceSource,
    loader: &Loader,
    config: &ExtractionConfig,
    start: NaiveDate,
    end: NaiveDate,
    today: NaiveDate,
) -> u64 {
    let (start, end) = match resolve_date_range(start, end, today, config.sanity_floor) {
        Ok(range) => range,
        Err(e) => {
            error!(error = %e, "USD/BRL 대체 구간 오류");
            return 0;
        }
    };

    let prices = match source.fetch_prices(YAHOO_USD_BRL_TICKER, start, end).await {
        Ok(prices) if prices.is_empty() => {
            warn!(ticker = YAHOO_USD_BRL_TICKER, "Yahoo Finance 환율 데이터 없음");
            return 0;
        }
        Ok(prices) => prices,
        Err(e) => {
            error!(ticker = YAHOO_USD_BRL_TICKER, error = %e, "Yahoo Finance 환율 추출 실패");
            return 0;
        }
    };

    let records = usd_brl_records(&prices);
    info!(rows = records.len(), "USD/BRL 대체 데이터 추출");

    match loader.load_records(&records).await {
        Ok(inserted) => {
            info!(rows = records.len(), inserted = inserted, "USD/BRL 대체 데이터 적재");
            inserted
        }
        Err(e) => {
            error!(error = %e, "USD/BRL 대체 데이터 적재 실패");
            0
        }
    }
}

/// 환율 종가를 지표 레코드로 변환
fn usd_brl_records(prices: &[PriceRecord]) -> Vec<IndicatorRecord> {
    prices
        .iter()
        .map(|p| {
            IndicatorRecord::new(FALLBACK_CODE, FALLBACK_NAME, p.date, p.close_price)
                .with_metadata(Frequency::Daily, FALLBACK_UNIT)
                .with_source(PRICE_SOURCE)
        })
        .collect()
}
