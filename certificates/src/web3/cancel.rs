use std::{future::Future, sync::Arc};

use tokio::sync::watch;

/// Cooperative cancellation shared between the caller and a running mint.
#[derive(Clone, Debug)]
pub struct CancelToken {
    cancelled: Arc<watch::Sender<bool>>,
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelToken {
    pub fn new() -> Self {
        let (cancelled, _) = watch::channel(false);
        Self {
            cancelled: Arc::new(cancelled),
        }
    }

    pub fn cancel(&self) {
        self.cancelled.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancelled.borrow()
    }

    /// Resolves once [`cancel`](Self::cancel) has been called.
    pub async fn cancelled(&self) {
        let mut rx = self.cancelled.subscribe();
        // The sender lives as long as `self`, so this only returns on cancellation.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }

    /// Drives `fut` unless the token is cancelled first; `None` means cancelled.
    pub async fn run<F: Future>(&self, fut: F) -> Option<F::Output> {
        if self.is_cancelled() {
            return None;
        }

        tokio::select! {
            biased;
            _ = self.cancelled() => None,
            output = fut => Some(output),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn runs_future_to_completion() {
        let token = CancelToken::new();

        assert_eq!(token.run(async { 7 }).await, Some(7));
    }

    #[tokio::test]
    async fn cancelled_token_skips_future() {
        let token = CancelToken::new();
        token.cancel();

        assert!(token.is_cancelled());
        assert_eq!(token.run(async { 7 }).await, None);
    }

    #[tokio::test]
    async fn cancel_interrupts_pending_future() {
        let token = CancelToken::new();
        let handle = {
            let token = token.clone();
            tokio::spawn(async move { token.run(std::future::pending::<()>()).await })
        };

        tokio::time::sleep(Duration::from_millis(10)).await;
        token.cancel();

        assert_eq!(handle.await.unwrap(), None);
    }
}
