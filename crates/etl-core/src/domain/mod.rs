//! ETL 도메인 타입.
//!
//! - `PriceRecord` - 일별 주가 레코드
//! - `IndicatorRecord` - 거시 지표 관측값 레코드
//! - `Batch` - 백필 배치 구간
//! - `ValidationResult` - 적재 후 검증 스냅샷

mod batch;
mod indicator;
mod price;
mod validation;

pub use batch::*;
pub use indicator::*;
pub use price::*;
pub use validation::*;
