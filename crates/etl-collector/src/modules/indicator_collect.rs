//! BCB 거시 지표 수집 모듈.
//!
//! 증분/구간 모드는 한 번에 추출 후 적재하고, 전체 이력 모드는 지표별
//! 배치 단위로 추출하며 배치마다 적재합니다.

use std::sync::Arc;
use std::time::Instant;

use etl_core::{ExtractionConfig, IndicatorRecord};
use etl_data::{BcbClient, IndicatorExtractor, Loader, RecordSink, Validator};
use sqlx::PgPool;
use tracing::{info, warn};

use super::{IndicatorCollectOptions, IndicatorMode};
use crate::stats::CollectionStats;
use crate::Result;

/// 지표 수집 실행.
///
/// `pool`이 없으면 추출만 수행합니다 (`--no-load`).
/// 전체 이력 모드는 배치마다 적재하며, 지표를 지정하면 그 지표만 처리합니다.
pub async fn collect_indicators(
    pool: Option<&PgPool>,
    config: Arc<ExtractionConfig>,
    options: &IndicatorCollectOptions,
) -> Result<CollectionStats> {
    let start = Instant::now();

    let source = Arc::new(BcbClient::new(&config)?);
    let extractor = IndicatorExtractor::new(Arc::clone(&config), source);
    let loader = pool.map(|p| Loader::new(p.clone()));

    let mut stats = match options.mode {
        IndicatorMode::FullHistorical => {
            let sink = loader
                .as_ref()
                .map(|l| l as &dyn RecordSink<IndicatorRecord>);
            let summary = match options.indicator.as_deref() {
                Some(code) => {
                    extractor
                        .extract_indicator_batched(code, options.batch_size_years, sink)
                        .await?
                }
                None => {
                    extractor
                        .extract_full_historical_batched(options.batch_size_years, sink)
                        .await?
                }
            };
            CollectionStats::from_backfill(&summary)
        }
        IndicatorMode::Incremental | IndicatorMode::Historical => {
            let extraction = if options.mode == IndicatorMode::Incremental {
                extractor.extract_incremental(options.lookback_days).await?
            } else {
                let today = extractor.today();
                let from = options.start.unwrap_or(config.start_date);
                let to = options.end.unwrap_or_else(|| config.end_date_or(today));
                extractor.extract_historical(from, to).await?
            };

            let mut stats = CollectionStats::from_extraction(&extraction);
            match loader.as_ref() {
                Some(loader) if !extraction.records.is_empty() => {
                    stats.rows_inserted = loader.load_records(&extraction.records).await?;
                    info!(
                        rows = extraction.records.len(),
                        inserted = stats.rows_inserted,
                        "지표 적재 완료"
                    );
                }
                Some(_) => warn!("적재할 지표 데이터 없음"),
                None => info!(rows = extraction.records.len(), "적재 생략 (--no-load)"),
            }
            stats
        }
    };

    if let Some(pool) = pool {
        Validator::new(pool.clone())
            .summarize::<IndicatorRecord>()
            .await?;
    }

    stats.elapsed = start.elapsed();
    Ok(stats)
}
