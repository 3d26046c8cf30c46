//! 지수 백오프 재시도.
//!
//! 일시적 오류(`DataError::is_transient`)에 한해 최대 `max_attempts`회까지
//! 호출을 반복합니다. 대기 시간은 `min_wait · 2^(n-1)`이며 `max_wait`에서 멈춥니다.

use std::future::Future;
use std::time::Duration;

use etl_core::ExtractionConfig;
use tracing::warn;

use crate::error::Result;

/// 재시도 정책.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// 최초 시도를 포함한 최대 시도 횟수
    pub max_attempts: u32,
    pub min_wait: Duration,
    pub max_wait: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            min_wait: Duration::from_secs(1),
            max_wait: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, min_wait: Duration, max_wait: Duration) -> Self {
        Self {
            max_attempts,
            min_wait,
            max_wait,
        }
    }

    /// 추출 설정에서 정책을 생성합니다.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new(
            config.retry_attempts,
            config.retry_min_wait(),
            config.retry_max_wait(),
        )
    }

    /// `attempt`번째 실패 후 대기 시간 (1부터 시작).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.min_wait.saturating_mul(factor).min(self.max_wait)
    }

    /// 재시도 정책에 따라 `call`을 실행합니다.
    ///
    /// 일시적이지 않은 오류는 즉시 반환하고, 시도 횟수를 모두 소진하면
    /// 마지막 오류를 반환합니다.
    pub async fn run<F, Fut, T>(&self, operation: &str, mut call: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match call().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < max_attempts => {
                    let wait = self.backoff(attempt);
                    warn!(
                        operation = operation,
                        attempt = attempt,
                        max_attempts = max_attempts,
                        wait_ms = wait.as_millis() as u64,
                        error = %e,
                        "일시적 오류, 재시도 대기"
                    );
                    tokio::time::sleep(wait).await;
                    attempt += 1;
                }
                Err(e) => {
                    if e.is_transient() {
                        warn!(
                            operation = operation,
                            attempts = attempt,
                            error = %e,
                            "재시도 횟수 소진"
                        );
                    }
                    return Err(e);
                }
            }
        }
    }
}
