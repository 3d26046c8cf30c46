//! B3 종목 일봉 수집 모듈.
//!
//! Yahoo Finance에서 일봉을 추출해 `raw.stocks`에 멱등 적재합니다.

use std::sync::Arc;
use std::time::Instant;

use etl_core::{ExtractionConfig, PriceRecord};
use etl_data::{Loader, PriceExtractor, Validator, YahooFinanceClient};
use sqlx::PgPool;
use tracing::{info, warn};

use super::{PriceCollectOptions, PriceMode};
use crate::stats::CollectionStats;
use crate::Result;

/// 주가 수집 실행.
///
/// # 동작
/// 1. 모드에 따라 증분 또는 지정 구간 추출
/// 2. 추출된 레코드를 스테이징 후 병합 적재
/// 3. `raw.stocks` 집계 검증 로그
///
/// # 인자
/// * `pool` - 데이터베이스 연결 풀
/// * `config` - 추출 설정 (종목 필터 적용 후)
/// * `options` - 수집 옵션
pub async fn collect_prices(
    pool: &PgPool,
    config: Arc<ExtractionConfig>,
    options: &PriceCollectOptions,
) -> Result<CollectionStats> {
    let start = Instant::now();

    let source = Arc::new(YahooFinanceClient::new(&config)?);
    let extractor = PriceExtractor::new(Arc::clone(&config), source);

    let extraction = match options.mode {
        PriceMode::Incremental => extractor.extract_incremental(options.lookback_days).await?,
        PriceMode::Historical => {
            let today = extractor.today();
            let from = options.start.unwrap_or(config.start_date);
            let to = options.end.unwrap_or_else(|| config.end_date_or(today));
            extractor.extract_historical(from, to).await?
        }
    };

    let mut stats = CollectionStats::from_extraction(&extraction);

    if extraction.records.is_empty() {
        warn!("적재할 주가 데이터 없음");
    } else {
        let loader = Loader::new(pool.clone());
        stats.rows_inserted = loader.load_records(&extraction.records).await?;
        info!(
            rows = extraction.records.len(),
            inserted = stats.rows_inserted,
            "주가 적재 완료"
        );

        Validator::new(pool.clone()).summarize::<PriceRecord>().await?;
    }

    stats.elapsed = start.elapsed();
    Ok(stats)
}
