//! 브라질 중앙은행(BCB) SGS 시계열 어댑터.
//!
//! `GET .../bcdata.sgs.{code}/dados?formato=json&dataInicial=dd/mm/YYYY&dataFinal=dd/mm/YYYY`
//!
//! 구간은 양 끝을 포함합니다. 응답은 `{"data": "dd/mm/YYYY", "valor": "..."}`
//! 배열이며, 날짜나 값이 잘못된 항목은 경고 후 건너뜁니다.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::NaiveDate;
use etl_core::{format_bcb_date, parse_bcb_date, ExtractionConfig, IndicatorRecord};
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::{debug, warn};

use super::{build_http_client, ensure_success, IndicatorSource, BROWSER_USER_AGENT};
use crate::error::{DataError, Result};
use crate::retry::RetryPolicy;
use crate::throttle::RateLimiter;

/// BCB SGS API 클라이언트.
pub struct BcbClient {
    client: reqwest::Client,
    /// `{code}` 자리표시자를 포함한 URL 템플릿
    url_template: String,
    limiter: RateLimiter,
    retry: RetryPolicy,
}

impl BcbClient {
    /// 추출 설정으로 클라이언트를 생성합니다.
    pub fn new(config: &ExtractionConfig) -> Result<Self> {
        Ok(Self {
            client: build_http_client(config.request_timeout())?,
            url_template: config.bcb_api_base_url.clone(),
            limiter: RateLimiter::new(config.indicator_call_spacing()),
            retry: RetryPolicy::from_config(config),
        })
    }

    /// URL 템플릿 교체 (테스트용 mock 서버 등).
    pub fn with_url_template(mut self, template: impl Into<String>) -> Self {
        self.url_template = template.into();
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn series_url(&self, code: &str) -> String {
        self.url_template.replace("{code}", code)
    }

    async fn fetch_once(
        &self,
        code: &str,
        name: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<IndicatorRecord>> {
        let start_param = format_bcb_date(start);
        let end_param = format_bcb_date(end);

        // 헤더가 없으면 406 응답
        let response = self
            .client
            .get(self.series_url(code))
            .query(&[
                ("formato", "json"),
                ("dataInicial", start_param.as_str()),
                ("dataFinal", end_param.as_str()),
            ])
            .header(reqwest::header::USER_AGENT, BROWSER_USER_AGENT)
            .header(reqwest::header::ACCEPT, "application/json")
            .header(
                reqwest::header::ACCEPT_LANGUAGE,
                "pt-BR,pt;q=0.9,en-US;q=0.8,en;q=0.7",
            )
            .send()
            .await?;

        let body: Value = ensure_success(response).await?.json().await?;
        parse_series(code, name, body)
    }
}

#[async_trait]
impl IndicatorSource for BcbClient {
    fn name(&self) -> &str {
        "bcb_api"
    }

    async fn fetch_indicator(
        &self,
        code: &str,
        name: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<IndicatorRecord>> {
        let operation = format!("bcb:{}", code);
        self.limiter
            .run(|| {
                self.retry
                    .run(&operation, || self.fetch_once(code, name, start, end))
            })
            .await
    }
}

/// SGS 응답 배열을 레코드로 변환합니다.
fn parse_series(code: &str, name: &str, body: Value) -> Result<Vec<IndicatorRecord>> {
    let items = match body {
        Value::Array(items) => items,
        other => {
            return Err(DataError::Parse(format!(
                "indicator {}: expected JSON array, got {}",
                code, other
            )))
        }
    };

    let mut records = Vec::with_capacity(items.len());
    for item in &items {
        match parse_observation(item) {
            Some((date, value)) => records.push(IndicatorRecord::new(code, name, date, value)),
            None => warn!(indicator = code, item = %item, "잘못된 관측값, 건너뜀"),
        }
    }

    debug!(indicator = code, rows = records.len(), "BCB 시리즈 파싱 완료");
    Ok(records)
}

fn parse_observation(item: &Value) -> Option<(NaiveDate, Decimal)> {
    let date = parse_bcb_date(item.get("data")?.as_str()?).ok()?;
    let value = match item.get("valor")? {
        Value::String(s) => Decimal::from_str(s.trim()).ok()?,
        Value::Number(n) => Decimal::from_str(&n.to_string()).ok()?,
        _ => return None,
    };
    Some((date, value))
}
