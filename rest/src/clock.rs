use async_trait::async_trait;
use tokio::time::Instant;

/// Time source for rate limit bookkeeping.
///
/// Uses tokio's [`Instant`] so that tests can run on a paused runtime and have sleeps
/// auto-advance.
#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;

    async fn sleep_until(&self, deadline: Instant);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep_until(&self, deadline: Instant) {
        tokio::time::sleep_until(deadline).await
    }
}
