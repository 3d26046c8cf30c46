//! # ETL Core
//!
//! 시장 데이터 ETL 파이프라인의 핵심 도메인 타입과 규칙을 제공합니다.
//!
//! 이 크레이트는 I/O를 수행하지 않습니다:
//! - 추출 설정 (`ExtractionConfig`)
//! - 주가/지표 레코드와 지표 메타데이터 카탈로그
//! - 백필 배치 구간 계산
//! - 날짜 검증 및 BCB 날짜 형식 변환
//! - 적재 후 검증 결과 스냅샷
//! - 로깅 인프라

pub mod config;
pub mod dates;
pub mod domain;
pub mod error;
pub mod logging;

pub use config::{ExtractionConfig, IndicatorDefinition};
pub use dates::{
    clean_ticker, format_bcb_date, format_duration, market_today, parse_bcb_date,
    resolve_date_range,
};
pub use domain::*;
pub use error::{EtlError, EtlResult};
pub use logging::{init_logging, LogConfig, LogFormat};
