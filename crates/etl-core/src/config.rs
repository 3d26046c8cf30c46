//! 추출 설정.
//!
//! 추출 실행 한 번에 사용되는 불변 파라미터 집합입니다. 프로세스 시작 시
//! 한 번 생성한 뒤 `Arc<ExtractionConfig>`로 각 컴포넌트에 공유합니다.

use std::path::Path;
use std::time::Duration;

use chrono::{Duration as ChronoDuration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::dates::clean_ticker;
use crate::error::{EtlError, EtlResult};

/// BCB SGS 지표 정의.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorDefinition {
    /// SGS 시리즈 코드 (예: "432")
    pub code: String,
    /// 표시 이름 (예: "SELIC")
    pub name: String,
    /// 시리즈 최초 기록일 (백필 시작점)
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
}

impl IndicatorDefinition {
    fn new(code: &str, name: &str, start_date: (i32, u32, u32)) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            start_date: NaiveDate::from_ymd_opt(start_date.0, start_date.1, start_date.2),
        }
    }
}

/// 추출 설정.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// 기본 추출 시작일
    pub start_date: NaiveDate,
    /// 기본 추출 종료일 (None이면 오늘)
    pub end_date: Option<NaiveDate>,
    /// 증분 추출 시 조회 일수
    pub lookback_days: u32,
    /// 추출 대상 B3 티커 목록
    pub stock_tickers: Vec<String>,
    /// 추출 대상 BCB 지표 (설정 순서대로 처리)
    pub indicators: Vec<IndicatorDefinition>,
    /// 네트워크 호출 최대 시도 횟수
    pub retry_attempts: u32,
    /// 재시도 최소 대기 (밀리초)
    pub retry_min_wait_ms: u64,
    /// 재시도 최대 대기 (밀리초)
    pub retry_max_wait_ms: u64,
    /// HTTP 요청 타임아웃 (초)
    pub request_timeout_secs: u64,
    /// 엔티티 간 대기 (밀리초)
    pub rate_limit_delay_ms: u64,
    /// 주가 API 호출 간 최소 간격 (밀리초)
    pub price_call_spacing_ms: u64,
    /// 지표 API 호출 간 최소 간격 (밀리초)
    pub indicator_call_spacing_ms: u64,
    /// 백필 배치 크기 (년)
    pub batch_size_years: u32,
    /// 허용되는 가장 이른 추출 시작일
    pub sanity_floor: NaiveDate,
    /// BCB SGS URL 템플릿 (`{code}` 치환)
    pub bcb_api_base_url: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        let tickers = [
            "PETR4.SA", // Petrobras
            "VALE3.SA", // Vale
            "ITUB4.SA", // Itaú Unibanco
            "BBDC4.SA", // Bradesco
            "ABEV3.SA", // Ambev
            "B3SA3.SA", // B3
            "RENT3.SA", // Localiza
            "WEGE3.SA", // WEG
            "SUZB3.SA", // Suzano
            "RAIL3.SA", // Rumo
            "BBAS3.SA", // Banco do Brasil
            "GGBR4.SA", // Gerdau
            "VIVT3.SA", // Vivo
            "MGLU3.SA", // Magazine Luiza
            "LREN3.SA", // Lojas Renner
            "CSAN3.SA", // Cosan
            "RADL3.SA", // Raia Drogasil
            "PRIO3.SA", // PetroRio
            "HAPV3.SA", // Hapvida
            "TOTS3.SA", // Totvs
        ];

        Self {
            // BCB는 일별 시리즈를 10년 구간으로 제한
            start_date: NaiveDate::from_ymd_opt(2016, 3, 1).unwrap_or_default(),
            end_date: None,
            lookback_days: 5,
            stock_tickers: tickers.iter().map(|t| t.to_string()).collect(),
            indicators: vec![
                IndicatorDefinition::new("432", "SELIC", (1999, 3, 5)),
                IndicatorDefinition::new("433", "IPCA", (1980, 1, 1)),
                IndicatorDefinition::new("1", "USD_BRL", (1984, 11, 28)),
                IndicatorDefinition::new("12", "IPCA_12M", (1986, 3, 6)),
                IndicatorDefinition::new("24369", "CDI_Daily", (2012, 3, 1)),
                IndicatorDefinition::new("189", "IGP_M", (1989, 6, 1)),
                IndicatorDefinition::new("7832", "USD_BRL_PTAX", (1987, 2, 1)),
            ],
            retry_attempts: 3,
            retry_min_wait_ms: 1_000,
            retry_max_wait_ms: 10_000,
            // 대용량 일별 시리즈 대응
            request_timeout_secs: 180,
            rate_limit_delay_ms: 500,
            price_call_spacing_ms: 300,
            indicator_call_spacing_ms: 500,
            batch_size_years: 5,
            sanity_floor: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or_default(),
            bcb_api_base_url: "https://api.bcb.gov.br/dados/serie/bcdata.sgs.{code}/dados"
                .to_string(),
        }
    }
}

impl ExtractionConfig {
    /// 기본값 → TOML 파일(선택) → `ETL__` 환경 변수 순서로 설정을 로드합니다.
    pub fn load<P: AsRef<Path>>(path: Option<P>) -> EtlResult<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path.as_ref()).required(true));
        }
        let builder = builder.add_source(
            config::Environment::with_prefix("ETL")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("stock_tickers")
                .try_parsing(true),
        );

        let config: Self = builder.build()?.try_deserialize()?;
        Ok(config.normalized())
    }

    /// TOML 문자열에서 설정을 로드합니다.
    pub fn from_toml_str(toml: &str) -> EtlResult<Self> {
        let config: Self = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        Ok(config.normalized())
    }

    /// 티커 목록을 교체합니다 (정규화 포함).
    pub fn with_tickers<I, S>(mut self, tickers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.stock_tickers = tickers.into_iter().map(|t| clean_ticker(t.as_ref())).collect();
        self
    }

    /// 지표 목록을 단일 코드로 제한합니다.
    pub fn only_indicator(mut self, code: &str) -> EtlResult<Self> {
        let definition = self
            .indicator(code)
            .cloned()
            .ok_or_else(|| EtlError::UnknownIndicator(code.to_string()))?;
        self.indicators = vec![definition];
        Ok(self)
    }

    fn normalized(mut self) -> Self {
        self.stock_tickers = self.stock_tickers.iter().map(|t| clean_ticker(t)).collect();
        self
    }

    /// 지표 정의 조회.
    pub fn indicator(&self, code: &str) -> Option<&IndicatorDefinition> {
        self.indicators.iter().find(|i| i.code == code)
    }

    /// 지표 시작일 조회.
    ///
    /// 설정되지 않은 코드는 `UnknownIndicator`, 시작일이 없으면 `MissingStartDate`.
    pub fn indicator_start_date(&self, code: &str) -> EtlResult<NaiveDate> {
        let definition = self
            .indicator(code)
            .ok_or_else(|| EtlError::UnknownIndicator(code.to_string()))?;
        definition
            .start_date
            .ok_or_else(|| EtlError::MissingStartDate(code.to_string()))
    }

    /// 지표 코드에 해당하는 BCB URL.
    pub fn bcb_url(&self, code: &str) -> String {
        self.bcb_api_base_url.replace("{code}", code)
    }

    /// 기본 종료일 (미설정 시 `today`).
    pub fn end_date_or(&self, today: NaiveDate) -> NaiveDate {
        self.end_date.unwrap_or(today)
    }

    /// 증분 추출 시작일.
    pub fn incremental_start(&self, today: NaiveDate, lookback_days: Option<u32>) -> NaiveDate {
        let lookback = lookback_days.unwrap_or(self.lookback_days);
        today - ChronoDuration::days(i64::from(lookback))
    }

    pub fn retry_min_wait(&self) -> Duration {
        Duration::from_millis(self.retry_min_wait_ms)
    }

    pub fn retry_max_wait(&self) -> Duration {
        Duration::from_millis(self.retry_max_wait_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// 엔티티 간 대기 시간.
    pub fn rate_limit_delay(&self) -> Duration {
        Duration::from_millis(self.rate_limit_delay_ms)
    }

    pub fn price_call_spacing(&self) -> Duration {
        Duration::from_millis(self.price_call_spacing_ms)
    }

    pub fn indicator_call_spacing(&self) -> Duration {
        Duration::from_millis(self.indicator_call_spacing_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ExtractionConfig::default();
        assert_eq!(config.stock_tickers.len(), 20);
        assert_eq!(config.stock_tickers[0], "PETR4.SA");
        assert_eq!(config.indicators.len(), 7);
        assert_eq!(config.indicators[0].code, "432");
        assert_eq!(config.lookback_days, 5);
        assert_eq!(config.batch_size_years, 5);
        assert_eq!(
            config.start_date,
            NaiveDate::from_ymd_opt(2016, 3, 1).unwrap()
        );
    }

    #[test]
    fn test_bcb_url() {
        let config = ExtractionConfig::default();
        assert_eq!(
            config.bcb_url("432"),
            "https://api.bcb.gov.br/dados/serie/bcdata.sgs.432/dados"
        );
    }

    #[test]
    fn test_indicator_start_date() {
        let config = ExtractionConfig::default();
        assert_eq!(
            config.indicator_start_date("432").unwrap(),
            NaiveDate::from_ymd_opt(1999, 3, 5).unwrap()
        );
        assert!(matches!(
            config.indicator_start_date("9999"),
            Err(EtlError::UnknownIndicator(_))
        ));

        let mut config = config;
        config.indicators.push(IndicatorDefinition {
            code: "4380".to_string(),
            name: "SELIC_TARGET".to_string(),
            start_date: None,
        });
        assert!(matches!(
            config.indicator_start_date("4380"),
            Err(EtlError::MissingStartDate(_))
        ));
    }

    #[test]
    fn test_incremental_start() {
        let config = ExtractionConfig::default();
        let today = NaiveDate::from_ymd_opt(2025, 2, 7).unwrap();
        assert_eq!(
            config.incremental_start(today, None),
            NaiveDate::from_ymd_opt(2025, 2, 2).unwrap()
        );
        assert_eq!(
            config.incremental_start(today, Some(1)),
            NaiveDate::from_ymd_opt(2025, 2, 6).unwrap()
        );
    }

    #[test]
    fn test_from_toml_str_overrides_and_normalizes() {
        let config = ExtractionConfig::from_toml_str(
            r#"
            lookback_days = 10
            stock_tickers = ["petr4", "VALE3.SA"]
            rate_limit_delay_ms = 0

            [[indicators]]
            code = "432"
            name = "SELIC"
            start_date = "1999-03-05"
            "#,
        )
        .unwrap();

        assert_eq!(config.lookback_days, 10);
        assert_eq!(config.stock_tickers, vec!["PETR4.SA", "VALE3.SA"]);
        assert_eq!(config.indicators.len(), 1);
        assert_eq!(config.rate_limit_delay(), Duration::ZERO);
        // 지정하지 않은 값은 기본값 유지
        assert_eq!(config.retry_attempts, 3);
    }

    #[test]
    fn test_only_indicator() {
        let config = ExtractionConfig::default().only_indicator("433").unwrap();
        assert_eq!(config.indicators.len(), 1);
        assert_eq!(config.indicators[0].name, "IPCA");

        assert!(ExtractionConfig::default().only_indicator("nope").is_err());
    }
}
