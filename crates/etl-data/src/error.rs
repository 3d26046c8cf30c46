//! 데이터 모듈 오류 타입.

use etl_core::EtlError;
use thiserror::Error;

/// 추출/적재 관련 오류.
#[derive(Debug, Error)]
pub enum DataError {
    /// 연결 실패, 연결 재설정 등 네트워크 오류
    #[error("Network error: {0}")]
    Network(String),

    /// 요청 타임아웃
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// 성공이 아닌 HTTP 상태 코드
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// 요청 구성 오류
    #[error("Request error: {0}")]
    Request(String),

    /// 응답 파싱 오류
    #[error("Parse error: {0}")]
    Parse(String),

    /// 모든 엔티티 추출 실패
    #[error("All {kind} failed: {}", .failed.join(", "))]
    AllEntitiesFailed {
        kind: &'static str,
        failed: Vec<String>,
    },

    /// 빈 레코드 적재 시도
    #[error("Cannot load an empty record set")]
    EmptyInput,

    /// 필수 컬럼 누락
    #[error("Missing required columns for {table}: {}", .missing.join(", "))]
    MissingColumns { table: String, missing: Vec<String> },

    /// 자연 키 컬럼이 레코드 컬럼에 없음
    #[error("Invalid natural key for {table}: {}", .key.join(", "))]
    InvalidNaturalKey { table: String, key: Vec<String> },

    /// 데이터베이스 오류
    #[error("Database error: {0}")]
    Database(String),

    /// 설정/입력 오류
    #[error(transparent)]
    Core(#[from] EtlError),
}

impl DataError {
    /// 재시도 가능한 일시적 오류인지 확인.
    ///
    /// 네트워크/타임아웃, HTTP 5xx, HTTP 429만 재시도합니다.
    /// 인증 실패 등 4xx와 파싱 오류는 즉시 전파됩니다.
    pub fn is_transient(&self) -> bool {
        match self {
            DataError::Network(_) | DataError::Timeout(_) => true,
            DataError::HttpStatus { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for DataError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            DataError::Timeout(err.to_string())
        } else if let Some(status) = err.status() {
            DataError::HttpStatus {
                status: status.as_u16(),
                body: err.to_string(),
            }
        } else if err.is_decode() {
            DataError::Parse(err.to_string())
        } else if err.is_builder() {
            DataError::Request(err.to_string())
        } else {
            // connect, request, body 오류
            DataError::Network(err.to_string())
        }
    }
}

impl From<sqlx::Error> for DataError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => DataError::Database(db_err.message().to_string()),
            _ => DataError::Database(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for DataError {
    fn from(err: serde_json::Error) -> Self {
        DataError::Parse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DataError>;
