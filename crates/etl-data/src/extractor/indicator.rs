//! 거시 지표 추출기.
//!
//! 단일 구간 추출 외에, 지표별 최초 기록일부터 오늘까지를 N년 단위 배치로
//! 나누어 백필합니다. 배치 실패는 기록 후 건너뛰는 best-effort 작업입니다.

use std::sync::Arc;

use chrono::NaiveDate;
use etl_core::{
    calculate_batches, format_duration, market_today, resolve_date_range, Batch, EtlError,
    ExtractionConfig, IndicatorDefinition, IndicatorRecord,
};
use tracing::{error, info, warn};

use super::{EntityFailure, Extraction, RecordSink};
use crate::error::{DataError, Result};
use crate::provider::IndicatorSource;

/// 배치 백필 결과.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackfillSummary {
    /// 처리한 지표 수
    pub indicators: usize,
    /// 시작일이 없어 건너뛴 지표
    pub skipped_indicators: Vec<String>,
    pub batches_total: usize,
    /// 실패한 배치 (`code:start to end`)
    pub failed_batches: Vec<String>,
    /// 데이터가 없었던 배치
    pub empty_batches: Vec<String>,
    /// 조회된 행 수
    pub rows_extracted: usize,
    /// 새로 저장된 행 수 (싱크가 있을 때만 의미 있음)
    pub rows_inserted: u64,
}

impl BackfillSummary {
    fn merge(&mut self, other: BackfillSummary) {
        self.indicators += other.indicators;
        self.skipped_indicators.extend(other.skipped_indicators);
        self.batches_total += other.batches_total;
        self.failed_batches.extend(other.failed_batches);
        self.empty_batches.extend(other.empty_batches);
        self.rows_extracted += other.rows_extracted;
        self.rows_inserted += other.rows_inserted;
    }
}

/// 설정된 지표 전체에 대한 추출기.
pub struct IndicatorExtractor {
    config: Arc<ExtractionConfig>,
    source: Arc<dyn IndicatorSource>,
    today: Option<NaiveDate>,
}

impl IndicatorExtractor {
    pub fn new(config: Arc<ExtractionConfig>, source: Arc<dyn IndicatorSource>) -> Self {
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

    /// `[start, end]` 구간을 설정된 지표 순서대로 추출합니다.
    ///
    /// 모든 지표가 실패하면 실패한 코드 목록과 함께 `AllEntitiesFailed`.
    pub async fn extract_historical(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Extraction<IndicatorRecord>> {
        let (start, end) = resolve_date_range(start, end, self.today(), self.config.sanity_floor)?;
        let indicators = &self.config.indicators;

        info!(
            source = self.source.name(),
            indicators = indicators.len(),
            start = %start,
            end = %end,
            "지표 추출 시작"
        );

        let mut extraction = Extraction::new(indicators.len());

        for (i, definition) in indicators.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(self.config.rate_limit_delay()).await;
            }

            let code = &definition.code;
            match self
                .source
                .fetch_indicator(code, &definition.name, start, end)
                .await
            {
                Ok(records) if records.is_empty() => {
                    warn!(indicator = %code, name = %definition.name, "조회 데이터 없음");
                    extraction.failures.push(EntityFailure::no_data(code));
                }
                Ok(records) => {
                    info!(indicator = %code, name = %definition.name, rows = records.len(), "지표 추출 완료");
                    extraction.records.extend(records);
                }
                Err(e) => {
                    error!(indicator = %code, error = %e, "지표 추출 실패");
                    extraction.failures.push(EntityFailure::error(code, &e));
                }
            }
        }

        if !indicators.is_empty() && extraction.failures.len() == indicators.len() {
            return Err(DataError::AllEntitiesFailed {
                kind: "indicators",
                failed: extraction.failed_keys(),
            });
        }

        extraction.log_summary("indicators");
        Ok(extraction)
    }

    /// 최근 `lookback_days`일 (미지정 시 설정값) 증분 추출.
    pub async fn extract_incremental(
        &self,
        lookback_days: Option<u32>,
    ) -> Result<Extraction<IndicatorRecord>> {
        let today = self.today();
        let start = self.config.incremental_start(today, lookback_days);
        info!(start = %start, end = %today, "지표 증분 추출");
        self.extract_historical(start, today).await
    }

    /// 단일 지표의 `[start, end]` 구간 조회.
    ///
    /// 설정되지 않은 코드는 I/O 없이 `UnknownIndicator`.
    pub async fn extract_single(
        &self,
        code: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<IndicatorRecord>> {
        let definition = self
            .config
            .indicator(code)
            .ok_or_else(|| EtlError::UnknownIndicator(code.to_string()))?;
        self.source
            .fetch_indicator(code, &definition.name, start, end)
            .await
    }

    /// 전체 지표 배치 백필.
    ///
    /// 지표마다 최초 기록일부터 오늘까지 `batch_size_years`년 단위로 조회하고,
    /// `sink`가 있으면 배치마다 적재합니다. 시작일이 없는 지표는 건너뜁니다.
    pub async fn extract_full_historical_batched(
        &self,
        batch_size_years: Option<u32>,
        sink: Option<&dyn RecordSink<IndicatorRecord>>,
    ) -> Result<BackfillSummary> {
        let years = batch_size_years.unwrap_or(self.config.batch_size_years);
        if years == 0 {
            return Err(EtlError::InvalidBatchSize(years).into());
        }

        let started = std::time::Instant::now();
        let mut summary = BackfillSummary::default();

        info!(
            indicators = self.config.indicators.len(),
            batch_size_years = years,
            load = sink.is_some(),
            "전체 이력 배치 추출 시작"
        );

        for definition in &self.config.indicators {
            let Some(start) = definition.start_date else {
                warn!(indicator = %definition.code, "시작일 미설정, 건너뜀");
                summary.skipped_indicators.push(definition.code.clone());
                continue;
            };

            let indicator_summary = self.backfill(definition, start, years, sink).await?;
            summary.merge(indicator_summary);
        }

        info!(
            rows_extracted = summary.rows_extracted,
            rows_inserted = summary.rows_inserted,
            batches = summary.batches_total,
            failed_batches = summary.failed_batches.len(),
            elapsed = %format_duration(started.elapsed()),
            "전체 이력 배치 추출 완료"
        );
        Ok(summary)
    }

    /// 단일 지표 배치 백필. `sink`가 있으면 배치마다 적재합니다.
    ///
    /// 전체 백필과 달리 시작일이 없으면 건너뛰지 않고 `MissingStartDate`.
    pub async fn extract_indicator_batched(
        &self,
        code: &str,
        batch_size_years: Option<u32>,
        sink: Option<&dyn RecordSink<IndicatorRecord>>,
    ) -> Result<BackfillSummary> {
        let years = batch_size_years.unwrap_or(self.config.batch_size_years);
        if years == 0 {
            return Err(EtlError::InvalidBatchSize(years).into());
        }
        let start = self.config.indicator_start_date(code)?;
        let definition = self
            .config
            .indicator(code)
            .ok_or_else(|| EtlError::UnknownIndicator(code.to_string()))?;

        self.backfill(definition, start, years, sink).await
    }

    async fn backfill(
        &self,
        definition: &IndicatorDefinition,
        start: NaiveDate,
        years: u32,
        sink: Option<&dyn RecordSink<IndicatorRecord>>,
    ) -> Result<BackfillSummary> {
        let today = self.today();
        let batches = calculate_batches(start, today, years)?;
        let code = &definition.code;

        info!(
            indicator = %code,
            name = %definition.name,
            start = %start,
            end = %today,
            batches = batches.len(),
            "지표 백필 시작"
        );

        let mut summary = BackfillSummary {
            indicators: 1,
            batches_total: batches.len(),
            ..Default::default()
        };

        for (i, batch) in batches.iter().enumerate() {
            info!(indicator = %code, batch = i + 1, total = batches.len(), range = %batch, "배치 처리");

            match self.run_batch(definition, batch, sink).await {
                Ok(None) => {
                    warn!(indicator = %code, range = %batch, "배치 데이터 없음");
                    summary.empty_batches.push(format!("{}:{}", code, batch));
                }
                Ok(Some((extracted, inserted))) => {
                    summary.rows_extracted += extracted;
                    summary.rows_inserted += inserted;
                    info!(indicator = %code, rows = extracted, inserted = inserted, "배치 완료");
                    tokio::time::sleep(self.config.rate_limit_delay() * 2).await;
                }
                Err(e) => {
                    error!(indicator = %code, batch = i + 1, error = %e, "배치 실패, 다음 배치로 진행");
                    summary.failed_batches.push(format!("{}:{}", code, batch));
                }
            }
        }

        info!(
            indicator = %code,
            rows_extracted = summary.rows_extracted,
            rows_inserted = summary.rows_inserted,
            "지표 백필 완료"
        );
        Ok(summary)
    }

    /// 배치 하나를 조회하고 싱크가 있으면 적재합니다. 데이터가 없으면 `None`.
    async fn run_batch(
        &self,
        definition: &IndicatorDefinition,
        batch: &Batch,
        sink: Option<&dyn RecordSink<IndicatorRecord>>,
    ) -> Result<Option<(usize, u64)>> {
        let records = self
            .source
            .fetch_indicator(&definition.code, &definition.name, batch.start, batch.end)
            .await?;

        if records.is_empty() {
            return Ok(None);
        }

        let inserted = match sink {
            Some(sink) => sink.write(&records).await?,
            None => 0,
        };
        Ok(Some((records.len(), inserted)))
    }
}
