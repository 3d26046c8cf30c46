//! 시장 데이터 배치 수집기.
//!
//! 이 crate는 추출/적재 파이프라인을 실행하는 바이너리를 제공합니다:
//! - B3 종목 일봉 수집 (Yahoo Finance)
//! - BCB 거시 지표 수집 및 배치 백필
//! - 주가/지표 통합 백필 (USD/BRL Yahoo 대체 포함)
//! - 적재 데이터 품질 리포트

pub mod config;
pub mod error;
pub mod modules;
pub mod stats;

pub use config::CollectorConfig;
pub use error::{CollectorError, Result};
pub use stats::CollectionStats;
