//! Dry-run 실행 계획.
//!
//! 네트워크나 데이터베이스에 접근하지 않고, 실제 실행 시 조회할 구간과
//! 배치 목록을 계산합니다.

use std::fmt::Write as _;

use chrono::NaiveDate;
use etl_core::{calculate_batches, Batch, ExtractionConfig};

use crate::Result;

/// 배치당 예상 소요 시간 (분)
const MINUTES_PER_BATCH: (usize, usize) = (2, 5);

/// 지표 하나의 백필 계획
#[derive(Debug, Clone)]
pub struct IndicatorPlanEntry {
    pub code: String,
    pub name: String,
    pub start: NaiveDate,
    /// 데이터 기간 (년)
    pub years_of_data: f64,
    pub batches: Vec<Batch>,
}

/// 전체 이력 배치 백필 계획
#[derive(Debug, Clone)]
pub struct IndicatorPlan {
    pub batch_size_years: u32,
    pub end: NaiveDate,
    pub entries: Vec<IndicatorPlanEntry>,
    /// 시작일이 없어 건너뛰는 지표
    pub skipped: Vec<String>,
}

impl IndicatorPlan {
    /// 설정된 지표 순서대로 배치 계획을 계산합니다.
    pub fn build(config: &ExtractionConfig, batch_size_years: u32, today: NaiveDate) -> Result<Self> {
        let mut entries = Vec::with_capacity(config.indicators.len());
        let mut skipped = Vec::new();

        for definition in &config.indicators {
            let Some(start) = definition.start_date else {
                skipped.push(definition.code.clone());
                continue;
            };

            entries.push(IndicatorPlanEntry {
                code: definition.code.clone(),
                name: definition.name.clone(),
                start,
                years_of_data: (today - start).num_days() as f64 / 365.25,
                batches: calculate_batches(start, today, batch_size_years)?,
            });
        }

        Ok(Self {
            batch_size_years,
            end: today,
            entries,
            skipped,
        })
    }

    pub fn total_batches(&self) -> usize {
        self.entries.iter().map(|e| e.batches.len()).sum()
    }

    /// 예상 소요 시간 범위 (분)
    pub fn estimated_minutes(&self) -> (usize, usize) {
        let total = self.total_batches();
        (total * MINUTES_PER_BATCH.0, total * MINUTES_PER_BATCH.1)
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "전체 이력 배치 백필 계획 (배치 크기: {}년, 종료일: {})",
            self.batch_size_years, self.end
        );

        for entry in &self.entries {
            let _ = writeln!(
                out,
                "\n[{}] {}: 시작일 {}, {:.1}년, {}개 배치",
                entry.code,
                entry.name,
                entry.start,
                entry.years_of_data,
                entry.batches.len()
            );
            for (i, batch) in entry.batches.iter().enumerate() {
                let _ = writeln!(out, "  {:>2}. {}", i + 1, batch);
            }
        }

        if !self.skipped.is_empty() {
            let _ = writeln!(out, "\n시작일 미설정 (건너뜀): {}", self.skipped.join(", "));
        }

        let (low, high) = self.estimated_minutes();
        let _ = writeln!(out, "\n총 배치: {}", self.total_batches());
        let _ = writeln!(out, "예상 소요 시간: {}-{}분", low, high);
        out
    }
}

/// 단일 구간 추출 계획 (증분/구간 모드)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowPlan {
    /// "prices" 또는 "indicators"
    pub kind: &'static str,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// 종목 또는 지표 코드
    pub entities: Vec<String>,
}

impl WindowPlan {
    /// 증분 모드: `[today - lookback, today]`
    pub fn incremental(
        kind: &'static str,
        config: &ExtractionConfig,
        entities: Vec<String>,
        lookback_days: Option<u32>,
        today: NaiveDate,
    ) -> Self {
        Self {
            kind,
            start: config.incremental_start(today, lookback_days),
            end: today,
            entities,
        }
    }

    /// 구간 모드: 미지정 시 설정의 시작일/종료일
    pub fn historical(
        kind: &'static str,
        config: &ExtractionConfig,
        entities: Vec<String>,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Self {
        Self {
            kind,
            start: start.unwrap_or(config.start_date),
            end: end.unwrap_or_else(|| config.end_date_or(today)),
            entities,
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "추출 계획 ({})", self.kind);
        let _ = writeln!(out, "기간: {} ~ {}", self.start, self.end);
        let _ = writeln!(out, "대상 ({}개): {}", self.entities.len(), self.entities.join(", "));
        out
    }
}

/// 주가 추출 계획
pub type PricePlan = WindowPlan;
