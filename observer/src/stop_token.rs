use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;

#[derive(Debug, Default)]
struct Inner {
    stopped: AtomicBool,
    wake: Notify,
}

/// One-way cooperative cancellation flag shared by a controller and its
/// worker. Running → Stopped, never back; a new token per session.
#[derive(Clone, Debug, Default)]
pub struct StopToken {
    inner: Arc<Inner>,
}

impl StopToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent. Wakes every task parked in `stopped()`.
    pub fn stop(&self) {
        self.inner.stopped.store(true, Ordering::Release);
        self.inner.wake.notify_waiters();
    }

    pub fn is_stopped(&self) -> bool {
        self.inner.stopped.load(Ordering::Acquire)
    }

    /// Resolves once `stop` has been called.
    pub async fn stopped(&self) {
        loop {
            // register before checking so a concurrent stop is not missed
            let notified = self.inner.wake.notified();
            if self.is_stopped() {
                return;
            }
            notified.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn stop_is_one_way_and_idempotent() {
        let token = StopToken::new();
        assert!(!token.is_stopped());

        token.stop();
        token.stop();
        assert!(token.is_stopped());
    }

    #[test]
    fn clones_observe_the_same_flag() {
        let controller = StopToken::new();
        let worker = controller.clone();

        controller.stop();
        assert!(worker.is_stopped());

        let next_session = StopToken::new();
        assert!(!next_session.is_stopped());
    }

    #[tokio::test(start_paused = true)]
    async fn stopped_wakes_a_parked_waiter() {
        let token = StopToken::new();
        let waiter = tokio::spawn({
            let token = token.clone();
            async move { token.stopped().await }
        });

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(!waiter.is_finished());

        token.stop();
        waiter.await.unwrap();
    }

    #[tokio::test]
    async fn stopped_returns_immediately_when_already_stopped() {
        let token = StopToken::new();
        token.stop();
        token.stopped().await;
    }
}
