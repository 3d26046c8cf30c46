//! ETL 핵심 에러 타입.
//!
//! 모든 변형은 네트워크나 데이터베이스 I/O 이전에 발생하는 설정/입력 에러입니다.

use chrono::NaiveDate;
use thiserror::Error;

/// 설정 및 입력 검증 에러.
#[derive(Debug, Error)]
pub enum EtlError {
    /// 시작일이 종료일보다 늦음
    #[error("Start date {start} is after end date {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    /// 시작일이 허용 하한보다 이전
    #[error("Start date {start} is before the sanity floor {floor}")]
    DateTooEarly { start: NaiveDate, floor: NaiveDate },

    /// 날짜 문자열 파싱 실패
    #[error("Invalid date '{input}': expected {expected}")]
    DateParse { input: String, expected: &'static str },

    /// 설정되지 않은 지표 코드
    #[error("Unknown indicator code: {0}")]
    UnknownIndicator(String),

    /// 지표 시작일 미설정
    #[error("No start date configured for indicator {0}")]
    MissingStartDate(String),

    /// 잘못된 배치 크기
    #[error("Batch size must be at least 1 year, got {0}")]
    InvalidBatchSize(u32),

    /// 설정 로드 에러
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

/// ETL 핵심 작업을 위한 Result 타입.
pub type EtlResult<T> = Result<T, EtlError>;
