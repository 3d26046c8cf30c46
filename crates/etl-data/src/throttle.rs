//! 호출 간격 제한.
//!
//! 감싼 호출이 반환된 시점부터 최소 `delay`가 지나야 다음 호출을 시작합니다.
//! 어댑터마다 별도 인스턴스를 두므로 간격은 호출 대상별로 측정됩니다.
//!
//! 대기로 직렬화할 뿐 큐잉하지 않습니다. 같은 인스턴스를 여러 태스크에서 동시에
//! 호출하는 경우는 지원하지 않습니다.

use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

/// 최소 호출 간격 제한기.
#[derive(Debug)]
pub struct RateLimiter {
    delay: Duration,
    last_return: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_return: Mutex::new(None),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// 다음 호출까지 남은 대기 시간. 첫 호출은 0.
    pub fn remaining(&self) -> Duration {
        let last = *self.last_return.lock().unwrap_or_else(|e| e.into_inner());
        match last {
            Some(at) => self.delay.saturating_sub(at.elapsed()),
            None => Duration::ZERO,
        }
    }

    /// 직전 호출 반환 후 `delay`가 지날 때까지 대기합니다.
    pub async fn wait(&self) {
        let remaining = self.remaining();
        if !remaining.is_zero() {
            debug!(wait_ms = remaining.as_millis() as u64, "호출 간격 대기");
            tokio::time::sleep(remaining).await;
        }
    }

    /// 호출 반환 시점을 기록합니다.
    pub fn mark(&self) {
        *self.last_return.lock().unwrap_or_else(|e| e.into_inner()) = Some(Instant::now());
    }

    /// 간격을 지켜 `call`을 실행합니다.
    ///
    /// 결과가 실패여도 반환 시점은 기록됩니다.
    pub async fn run<F, Fut, T>(&self, call: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        self.wait().await;
        let output = call().await;
        self.mark();
        output
    }
}
