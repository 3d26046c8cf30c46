//! 추출기.
//!
//! 설정된 엔티티(종목, 지표)를 순서대로 하나씩 조회합니다. 한 엔티티의 실패는
//! 기록만 하고 다음 엔티티로 진행하며, 모든 엔티티가 실패한 경우에만 에러를
//! 반환합니다.

mod indicator;
mod price;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::error::{DataError, Result};

pub use indicator::{BackfillSummary, IndicatorExtractor};
pub use price::PriceExtractor;

/// 엔티티 실패 유형.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// 조회는 성공했으나 데이터 없음
    NoData,
    /// 재시도 후에도 실패
    Error,
}

/// 엔티티 단위 실패 기록.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityFailure {
    /// 종목 코드 또는 지표 코드
    pub key: String,
    pub kind: FailureKind,
    pub reason: String,
}

impl EntityFailure {
    pub(crate) fn no_data(key: &str) -> Self {
        Self {
            key: key.to_string(),
            kind: FailureKind::NoData,
            reason: "no data returned".to_string(),
        }
    }

    pub(crate) fn error(key: &str, err: &DataError) -> Self {
        Self {
            key: key.to_string(),
            kind: FailureKind::Error,
            reason: err.to_string(),
        }
    }
}

/// 추출 결과.
///
/// 레코드는 설정된 엔티티 순서, 엔티티 내에서는 날짜 순입니다.
#[derive(Debug, Clone)]
pub struct Extraction<R> {
    pub records: Vec<R>,
    pub failures: Vec<EntityFailure>,
    /// 시도한 엔티티 수
    pub attempted: usize,
}

impl<R> Extraction<R> {
    pub(crate) fn new(attempted: usize) -> Self {
        Self {
            records: Vec::new(),
            failures: Vec::new(),
            attempted,
        }
    }

    /// 성공한 엔티티 수
    pub fn succeeded(&self) -> usize {
        self.attempted - self.failures.len()
    }

    /// 실패한 엔티티 키 목록
    pub fn failed_keys(&self) -> Vec<String> {
        self.failures.iter().map(|f| f.key.clone()).collect()
    }

    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }

    /// 추출 요약 로그 출력
    pub fn log_summary(&self, kind: &str) {
        info!(
            kind = kind,
            attempted = self.attempted,
            succeeded = self.succeeded(),
            rows = self.records.len(),
            "추출 완료"
        );
        if self.is_partial() {
            warn!(
                kind = kind,
                failed = self.failures.len(),
                keys = %self.failed_keys().join(", "),
                "일부 엔티티 추출 실패"
            );
        }
    }
}

/// 추출된 레코드를 받아 저장하는 대상.
///
/// 배치 백필에서 배치마다 적재할 때 사용합니다. 반환값은 새로 저장된 행 수입니다.
#[async_trait]
pub trait RecordSink<R: Sync>: Send + Sync {
    async fn write(&self, records: &[R]) -> Result<u64>;
}
