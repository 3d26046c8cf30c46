//! 시장 데이터 추출 및 적재.
//!
//! 이 crate는 다음을 제공합니다:
//! - 호출 간격 제한 (`RateLimiter`) 및 지수 백오프 재시도 (`RetryPolicy`)
//! - 데이터 소스 어댑터 (Yahoo Finance, BCB SGS API)
//! - 주가/지표 추출기 (부분 실패 허용, 배치 백필)
//! - 멱등 적재기 (스테이징 + 자연 키 충돌 무시 병합)
//! - 적재 후 검증기

pub mod error;
pub mod extractor;
pub mod provider;
pub mod retry;
pub mod storage;
pub mod throttle;

pub use error::{DataError, Result};
pub use extractor::{
    BackfillSummary, EntityFailure, Extraction, FailureKind, IndicatorExtractor, PriceExtractor,
    RecordSink,
};
pub use provider::{BcbClient, IndicatorSource, PriceSource, YahooFinanceClient};
pub use retry::RetryPolicy;
pub use storage::loader::{Loadable, Loader, TableSpec};
pub use storage::tables::{INDICATORS_TABLE, STOCKS_TABLE};
pub use storage::schema::{ensure_raw_schema, RAW_SCHEMA_SQL};
pub use storage::validator::Validator;
pub use throttle::RateLimiter;
