//! 수집기 로깅 초기화.
//!
//! 필터는 `RUST_LOG`, 없으면 CLI의 `--log-level`을 씁니다.
//! 출력 형식은 `LOG_FORMAT`으로 고릅니다. 스케줄러가 로그를 수집할 때는
//! `json`, 장시간 백필은 `compact`가 읽기 편합니다.

use tracing_subscriber::{
    filter::ParseError, fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// 로그 출력 형식.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    /// 모듈 경로 없이 한 줄
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            "compact" => Ok(Self::Compact),
            other => Err(format!("Unknown log format: {}", other)),
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// `EnvFilter` 지시문 (예: "info", "etl_data=debug,info")
    pub filter: String,
    pub format: LogFormat,
}

impl LogConfig {
    /// 환경 변수로 설정을 만듭니다. `RUST_LOG`가 없으면 `default_filter`.
    pub fn from_env(default_filter: &str) -> Self {
        let filter = std::env::var("RUST_LOG")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| default_filter.to_string());
        let format = std::env::var("LOG_FORMAT")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or_default();

        Self { filter, format }
    }

    fn env_filter(&self) -> Result<EnvFilter, ParseError> {
        EnvFilter::try_new(&self.filter)
    }
}

/// 전역 subscriber 설치. 잘못된 필터나 중복 설치는 에러.
pub fn init_logging(config: &LogConfig) -> Result<(), Box<dyn std::error::Error>> {
    let registry = tracing_subscriber::registry().with(config.env_filter()?);

    match config.format {
        LogFormat::Pretty => registry.with(fmt::layer().pretty()).try_init()?,
        LogFormat::Json => registry.with(fmt::layer().json()).try_init()?,
        LogFormat::Compact => registry
            .with(fmt::layer().compact().with_target(false))
            .try_init()?,
    }

    tracing::debug!(filter = %config.filter, format = ?config.format, "로깅 초기화");
    Ok(())
}
