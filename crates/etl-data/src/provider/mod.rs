//! 데이터 소스 어댑터.
//!
//! ## Yahoo Finance
//! - `YahooFinanceClient`: B3 종목 일봉 (종료일 미포함 구간)
//!
//! ## BCB SGS API
//! - `BcbClient`: 거시 지표 시리즈 (양 끝 포함 구간)
//!
//! 추출기는 구체 클라이언트 대신 `PriceSource`/`IndicatorSource` 트레이트에
//! 의존합니다.

pub mod bcb;
pub mod yahoo;

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use etl_core::{IndicatorRecord, PriceRecord};

use crate::error::{DataError, Result};

pub use bcb::BcbClient;
pub use yahoo::YahooFinanceClient;

/// 브라우저 User-Agent. 일부 엔드포인트는 기본 UA 요청을 거부합니다.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// 에러 응답 본문 최대 보존 길이.
const MAX_ERROR_BODY: usize = 200;

/// 종목 일봉 소스.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// 소스 이름 (로그용)
    fn name(&self) -> &str;

    /// 한 종목의 일봉을 조회합니다. 데이터가 없으면 빈 벡터.
    async fn fetch_prices(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceRecord>>;
}

/// 지표 시리즈 소스.
#[async_trait]
pub trait IndicatorSource: Send + Sync {
    /// 소스 이름 (로그용)
    fn name(&self) -> &str;

    /// 한 지표의 관측값을 조회합니다. 데이터가 없으면 빈 벡터.
    async fn fetch_indicator(
        &self,
        code: &str,
        name: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<IndicatorRecord>>;
}

/// 공용 HTTP 클라이언트 생성.
pub(crate) fn build_http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(BROWSER_USER_AGENT)
        .build()
        .map_err(|e| DataError::Request(format!("HTTP 클라이언트 생성 실패: {}", e)))
}

/// 성공이 아닌 상태 코드를 `HttpStatus` 오류로 변환합니다.
pub(crate) async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let mut body = response.text().await.unwrap_or_default();
    if body.len() > MAX_ERROR_BODY {
        let cut = (0..=MAX_ERROR_BODY)
            .rev()
            .find(|&i| body.is_char_boundary(i))
            .unwrap_or(0);
        body.truncate(cut);
    }

    Err(DataError::HttpStatus {
        status: status.as_u16(),
        body,
    })
}
