//! 날짜/티커 헬퍼.
//!
//! - BCB API 날짜 형식 (`dd/mm/YYYY`) 변환
//! - 추출 구간 검증 (시작일 ≤ 종료일, 하한, 미래 종료일 보정)
//! - B3 티커 정규화

use std::time::Duration;

use chrono::{NaiveDate, Utc};
use chrono_tz::America::Sao_Paulo;
use tracing::warn;

use crate::error::{EtlError, EtlResult};

/// BCB API 날짜 형식.
pub const BCB_DATE_FORMAT: &str = "%d/%m/%Y";

/// 설정/CLI 날짜 형식.
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// B3 티커 접미사.
const B3_SUFFIX: &str = ".SA";

/// BCB 응답의 `dd/mm/YYYY` 날짜를 파싱합니다.
///
/// 형식이 맞지 않으면 잘못된 날짜를 만들지 않고 에러를 반환합니다.
pub fn parse_bcb_date(input: &str) -> EtlResult<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), BCB_DATE_FORMAT).map_err(|_| EtlError::DateParse {
        input: input.to_string(),
        expected: "dd/mm/YYYY",
    })
}

/// 날짜를 BCB 요청 파라미터 형식으로 변환합니다.
pub fn format_bcb_date(date: NaiveDate) -> String {
    date.format(BCB_DATE_FORMAT).to_string()
}

/// `YYYY-MM-DD` 날짜를 파싱합니다.
pub fn parse_iso_date(input: &str) -> EtlResult<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), ISO_DATE_FORMAT).map_err(|_| EtlError::DateParse {
        input: input.to_string(),
        expected: "YYYY-MM-DD",
    })
}

/// 상파울루 기준 오늘 날짜.
pub fn market_today() -> NaiveDate {
    Utc::now().with_timezone(&Sao_Paulo).date_naive()
}

/// 추출 구간을 검증하고 정규화합니다.
///
/// - `start > end` 또는 `start < floor` 이면 에러
/// - `end`가 `today` 이후면 경고 후 `today`로 보정
pub fn resolve_date_range(
    start: NaiveDate,
    end: NaiveDate,
    today: NaiveDate,
    floor: NaiveDate,
) -> EtlResult<(NaiveDate, NaiveDate)> {
    if start > end {
        return Err(EtlError::InvalidDateRange { start, end });
    }
    if start < floor {
        return Err(EtlError::DateTooEarly { start, floor });
    }

    let end = if end > today {
        warn!(end = %end, today = %today, "End date is in the future, using today instead");
        today
    } else {
        end
    };

    // 보정 후에도 시작일이 미래인 경우
    if start > end {
        return Err(EtlError::InvalidDateRange { start, end });
    }

    Ok((start, end))
}

/// 티커를 대문자로 정규화하고 `.SA` 접미사를 보장합니다.
///
/// `"petr4"` → `"PETR4.SA"`, `"PETR4.SA"` → `"PETR4.SA"`
pub fn clean_ticker(ticker: &str) -> String {
    let ticker = ticker.trim().to_uppercase();
    if ticker.ends_with(B3_SUFFIX) {
        ticker
    } else {
        format!("{}{}", ticker, B3_SUFFIX)
    }
}

/// 소요 시간을 사람이 읽기 쉬운 형식으로 변환합니다.
///
/// 60초 미만은 `"45.0s"`, 이상은 `"2m 5.5s"`.
pub fn format_duration(elapsed: Duration) -> String {
    let seconds = elapsed.as_secs_f64();
    if seconds < 60.0 {
        return format!("{:.1}s", seconds);
    }
    let minutes = (seconds / 60.0).floor();
    format!("{}m {:.1}s", minutes as u64, seconds - minutes * 60.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_bcb_date() {
        let parsed = parse_bcb_date("15/01/2024").unwrap();
        assert_eq!(parsed, date(2024, 1, 15));
    }

    #[test]
    fn test_parse_bcb_date_rejects_malformed() {
        assert!(parse_bcb_date("2024-01-15").is_err());
        assert!(parse_bcb_date("32/01/2024").is_err());
        assert!(parse_bcb_date("15/13/2024").is_err());
        assert!(parse_bcb_date("").is_err());
        assert!(matches!(
            parse_bcb_date("abc"),
            Err(EtlError::DateParse { .. })
        ));
    }

    #[test]
    fn test_format_bcb_date() {
        assert_eq!(format_bcb_date(date(2024, 1, 5)), "05/01/2024");
        assert_eq!(
            parse_bcb_date(&format_bcb_date(date(1999, 3, 5))).unwrap(),
            date(1999, 3, 5)
        );
    }

    #[test]
    fn test_resolve_date_range() {
        let today = date(2025, 2, 7);
        let floor = date(2000, 1, 1);

        let (start, end) =
            resolve_date_range(date(2024, 1, 1), date(2024, 12, 31), today, floor).unwrap();
        assert_eq!(start, date(2024, 1, 1));
        assert_eq!(end, date(2024, 12, 31));

        // 미래 종료일은 오늘로 보정
        let (_, end) = resolve_date_range(date(2024, 1, 1), date(2030, 1, 1), today, floor).unwrap();
        assert_eq!(end, today);

        assert!(matches!(
            resolve_date_range(date(2024, 2, 1), date(2024, 1, 1), today, floor),
            Err(EtlError::InvalidDateRange { .. })
        ));
        assert!(matches!(
            resolve_date_range(date(1999, 12, 31), date(2024, 1, 1), today, floor),
            Err(EtlError::DateTooEarly { .. })
        ));
        // 시작일 == 종료일은 허용
        assert!(resolve_date_range(today, today, today, floor).is_ok());
    }

    #[test]
    fn test_clean_ticker() {
        assert_eq!(clean_ticker("PETR4"), "PETR4.SA");
        assert_eq!(clean_ticker("PETR4.SA"), "PETR4.SA");
        assert_eq!(clean_ticker("  vale3 "), "VALE3.SA");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs_f64(45.0)), "45.0s");
        assert_eq!(format_duration(Duration::from_secs_f64(125.5)), "2m 5.5s");
    }
}
