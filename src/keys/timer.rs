use std::future::Future;
use std::time::Duration;

use tokio::task::{AbortHandle, JoinHandle};
use tokio::time::Instant;
use tracing::debug;

/// One-shot deferred callback, used to delete a key pair once its
/// time-to-live has passed.
///
/// The callback is `FnOnce` and is dropped as soon as it has run, so the
/// timer never holds on to what it captured past its own firing. Dropping a
/// `LifecycleTimer` does not cancel it.
#[derive(Debug)]
pub struct LifecycleTimer {
    ttl: Duration,
    task: JoinHandle<()>,
}

impl LifecycleTimer {
    /// Run `on_expire` once, no earlier than `ttl` from now.
    ///
    /// Must be called from within a tokio runtime.
    pub fn arm<F, Fut>(ttl: Duration, on_expire: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        // A TTL past the clock's range never expires.
        let deadline = Instant::now().checked_add(ttl);
        let task = tokio::spawn(async move {
            match deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
            debug!(?ttl, "Lifecycle timer fired");
            on_expire().await;
        });
        Self { ttl, task }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// True once the callback has completed or the timer was canceled.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop a pending timer. Has no effect after it fired.
    pub fn cancel(&self) {
        self.task.abort();
    }

    pub(crate) fn abort_handle(&self) -> AbortHandle {
        self.task.abort_handle()
    }

    /// Wait until the callback has run, or the timer was canceled.
    pub async fn wait(self) {
        if let Err(e) = self.task.await {
            if !e.is_cancelled() {
                debug!(error = %e, "Lifecycle timer task failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting_timer(ttl: Duration) -> (LifecycleTimer, Arc<AtomicUsize>) {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        let timer = LifecycleTimer::arm(ttl, move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        (timer, fired)
    }

    async fn settle() {
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn fires_once_after_ttl() {
        let (timer, fired) = counting_timer(Duration::from_millis(50));

        tokio::time::advance(Duration::from_millis(10)).await;
        settle().await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert!(!timer.is_finished());

        tokio::time::advance(Duration::from_millis(41)).await;
        settle().await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_millis(500)).await;
        settle().await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(timer.is_finished());
        timer.wait().await;
    }

    #[tokio::test(start_paused = true)]
    async fn never_fires_early() {
        let (_timer, fired) = counting_timer(Duration::from_millis(50));

        tokio::time::advance(Duration::from_millis(49)).await;
        settle().await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn unrepresentable_ttl_never_fires() {
        let (timer, fired) = counting_timer(Duration::MAX);

        tokio::time::advance(Duration::from_secs(10 * 365 * 24 * 3600)).await;
        settle().await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert!(!timer.is_finished());
        timer.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn canceled_timer_never_fires() {
        let (timer, fired) = counting_timer(Duration::from_millis(50));

        timer.cancel();
        tokio::time::advance(Duration::from_millis(100)).await;
        settle().await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        timer.wait().await;
    }

    #[tokio::test(start_paused = true)]
    async fn callback_capture_released_after_firing() {
        let captured = Arc::new(());
        let held = captured.clone();
        let timer = LifecycleTimer::arm(Duration::from_millis(5), move || async move {
            drop(held);
        });
        assert_eq!(Arc::strong_count(&captured), 2);

        timer.wait().await;
        assert_eq!(Arc::strong_count(&captured), 1);
    }
}
