//! 일별 주가 레코드.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 주가 레코드 출처 태그.
pub const PRICE_SOURCE: &str = "yahoo_finance";

/// 종목별 일봉 한 건.
///
/// 자연 키는 `(ticker, date)`. 종가가 0 이하인 레코드는 어댑터 경계에서 제거되므로
/// 이 타입의 값은 항상 `close_price > 0` 입니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRecord {
    /// 종목 코드 (예: "PETR4.SA")
    pub ticker: String,
    /// 거래일 (거래소 현지 날짜)
    pub date: NaiveDate,
    pub open_price: Decimal,
    pub high_price: Decimal,
    pub low_price: Decimal,
    pub close_price: Decimal,
    /// 거래량
    pub volume: i64,
    /// 수정 종가
    pub adj_close: Decimal,
}

impl PriceRecord {
    /// 고가/저가 범위가 올바른지 확인합니다.
    pub fn has_valid_range(&self) -> bool {
        self.high_price >= self.low_price
    }
}
