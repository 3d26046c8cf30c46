//! 거시 지표 레코드와 메타데이터 카탈로그.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// BCB 지표 레코드 출처 태그.
pub const INDICATOR_SOURCE: &str = "bcb_api";

/// 관측 주기.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    /// 일별
    Daily,
    /// 월별
    Monthly,
    /// 카탈로그에 없는 시리즈
    Unknown,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Monthly => "monthly",
            Frequency::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 시리즈 메타데이터 (주기, 단위).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorMetadata {
    pub frequency: Frequency,
    pub unit: &'static str,
}

/// SGS 코드에 대한 정적 메타데이터를 조회합니다.
///
/// 알 수 없는 코드는 `Unknown` 주기와 빈 단위를 반환합니다.
pub fn indicator_metadata(code: &str) -> IndicatorMetadata {
    let (frequency, unit) = match code {
        "432" => (Frequency::Daily, "% per day"),      // SELIC
        "433" => (Frequency::Monthly, "% monthly"),    // IPCA
        "1" => (Frequency::Daily, "BRL/USD"),          // USD/BRL
        "12" => (Frequency::Monthly, "% 12 months"),   // IPCA 12개월
        "24369" => (Frequency::Daily, "% per day"),    // CDI
        "189" => (Frequency::Monthly, "% monthly"),    // IGP-M
        "7832" => (Frequency::Daily, "BRL/USD"),       // PTAX
        _ => (Frequency::Unknown, ""),
    };
    IndicatorMetadata { frequency, unit }
}

/// 지표 관측값 한 건.
///
/// 자연 키는 `(indicator_code, date)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorRecord {
    /// 시리즈 코드 (예: "432")
    pub indicator_code: String,
    /// 표시 이름 (예: "SELIC")
    pub indicator_name: String,
    /// 관측일
    pub date: NaiveDate,
    pub value: Decimal,
    pub unit: String,
    pub frequency: Frequency,
    /// 출처 태그
    pub source: String,
}

impl IndicatorRecord {
    /// 카탈로그 메타데이터로 주기/단위를 채운 BCB 레코드를 생성합니다.
    pub fn new(code: &str, name: &str, date: NaiveDate, value: Decimal) -> Self {
        let metadata = indicator_metadata(code);
        Self {
            indicator_code: code.to_string(),
            indicator_name: name.to_string(),
            date,
            value,
            unit: metadata.unit.to_string(),
            frequency: metadata.frequency,
            source: INDICATOR_SOURCE.to_string(),
        }
    }

    /// 출처 태그를 교체합니다.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// 주기/단위를 직접 지정합니다 (카탈로그 외 시리즈용).
    pub fn with_metadata(mut self, frequency: Frequency, unit: impl Into<String>) -> Self {
        self.frequency = frequency;
        self.unit = unit.into();
        self
    }
}
