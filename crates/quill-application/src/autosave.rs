//! Debounced autosave timer.
//!
//! One cancellable scheduled task, bound to the active-chapter identity by
//! its caller. Re-arming cancels the previous timer so only the latest edit
//! burst ever fires; cancellation on chapter switch or teardown is part of
//! the contract, not incidental cleanup.

use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Handle for the single in-flight debounce timer.
#[derive(Default)]
pub struct Autosave {
    current: Mutex<Option<CancellationToken>>,
}

impl Autosave {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms the timer: after `delay`, `fire` runs unless the timer was
    /// cancelled or re-armed first.
    ///
    /// `fire` must re-read whatever it persists at fire time; the timer
    /// carries no captured content.
    pub fn arm<F, Fut>(&self, delay: Duration, fire: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send,
    {
        let token = CancellationToken::new();
        let armed = token.clone();
        {
            let mut slot = self.current.lock().unwrap();
            if let Some(previous) = slot.take() {
                previous.cancel();
            }
            *slot = Some(token);
        }

        tokio::spawn(async move {
            tokio::select! {
                _ = armed.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    // Once the delay elapses the save runs to completion;
                    // cancellation only prevents it from starting.
                    fire().await;
                }
            }
        });
    }

    /// Cancels the armed timer, if any.
    pub fn cancel(&self) {
        if let Some(token) = self.current.lock().unwrap().take() {
            token.cancel();
        }
    }
}

impl Drop for Autosave {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_rearm_fires_only_once() {
        let autosave = Autosave::new();
        let fired = Arc::new(AtomicUsize::new(0));

        for _ in 0..5 {
            let fired = fired.clone();
            autosave.arm(Duration::from_millis(20), move || async move {
                fired.fetch_add(1, Ordering::SeqCst);
            });
        }

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cancel_prevents_firing() {
        let autosave = Autosave::new();
        let fired = Arc::new(AtomicUsize::new(0));

        {
            let fired = fired.clone();
            autosave.arm(Duration::from_millis(20), move || async move {
                fired.fetch_add(1, Ordering::SeqCst);
            });
        }
        autosave.cancel();

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }
}
