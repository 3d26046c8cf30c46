//! 수집 워크플로우 모듈.

pub mod backfill;
pub mod indicator_collect;
pub mod plan;
pub mod price_collect;
pub mod validate;

use std::sync::Arc;

use chrono::NaiveDate;
use clap::ValueEnum;
use etl_core::ExtractionConfig;

use crate::Result;

pub use backfill::{run_backfill, BackfillOptions, BackfillReport};
pub use indicator_collect::collect_indicators;
pub use plan::{IndicatorPlan, PricePlan, WindowPlan};
pub use price_collect::collect_prices;
pub use validate::{quality_report, QualityReport};

/// 주가 수집 모드
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PriceMode {
    /// 최근 N일
    Incremental,
    /// 지정 구간
    Historical,
}

/// 지표 수집 모드
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum IndicatorMode {
    /// 최근 N일
    Incremental,
    /// 지정 구간
    Historical,
    /// 최초 기록일부터 배치 백필
    FullHistorical,
}

/// 주가 수집 옵션
#[derive(Debug, Clone)]
pub struct PriceCollectOptions {
    pub mode: PriceMode,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub lookback_days: Option<u32>,
}

/// 지표 수집 옵션
#[derive(Debug, Clone)]
pub struct IndicatorCollectOptions {
    pub mode: IndicatorMode,
    /// 단일 지표만 수집
    pub indicator: Option<String>,
    /// 배치 크기 (년)
    pub batch_size_years: Option<u32>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub lookback_days: Option<u32>,
}

/// 종목 필터 적용
pub fn scoped_price_config(
    config: &ExtractionConfig,
    symbol: Option<&str>,
) -> Arc<ExtractionConfig> {
    match symbol {
        Some(symbol) => Arc::new(config.clone().with_tickers([symbol])),
        None => Arc::new(config.clone()),
    }
}

/// 지표 필터 적용. 설정에 없는 코드면 에러.
pub fn scoped_indicator_config(
    config: &ExtractionConfig,
    indicator: Option<&str>,
) -> Result<Arc<ExtractionConfig>> {
    match indicator {
        Some(code) => Ok(Arc::new(config.clone().only_indicator(code)?)),
        None => Ok(Arc::new(config.clone())),
    }
}
