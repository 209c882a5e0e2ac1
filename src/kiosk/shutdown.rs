//! Process-wide termination flag.
//!
//! A `tokio::sync::watch` channel carrying `Option<ShutdownReason>`.  The
//! render loop polls [`ShutdownSignal::is_requested`] once per frame; async
//! tasks `select!` on [`ShutdownSignal::requested`] so they stop without
//! waiting for an in-flight blocking call.  The first request wins; later
//! requests keep the original reason.

use std::sync::Arc;

use tokio::sync::watch;

/// Why the kiosk is going down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// The spoken shutdown command.  Also runs the configured system command.
    VoiceCommand,
    /// SIGINT / Ctrl-C.
    Signal,
    /// `q` key or window close.
    Operator,
}

#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    tx: Arc<watch::Sender<Option<ShutdownReason>>>,
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownSignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    /// Request shutdown.  Returns `false` if it was already requested.
    pub fn request(&self, reason: ShutdownReason) -> bool {
        let first = self.tx.send_if_modified(|current| {
            if current.is_some() {
                return false;
            }
            *current = Some(reason);
            true
        });
        if first {
            log::info!("kiosk: shutdown requested ({reason:?})");
        }
        first
    }

    pub fn reason(&self) -> Option<ShutdownReason> {
        *self.tx.borrow()
    }

    pub fn is_requested(&self) -> bool {
        self.reason().is_some()
    }

    /// Resolves once shutdown has been requested.
    pub async fn requested(&self) -> ShutdownReason {
        let mut rx = self.tx.subscribe();
        let reason = match rx.wait_for(Option::is_some).await {
            Ok(reason) => (*reason).unwrap_or(ShutdownReason::Operator),
            // The sender lives in `self`, so the channel cannot close here.
            Err(_) => ShutdownReason::Operator,
        };
        reason
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn starts_clear() {
        let s = ShutdownSignal::new();
        assert!(!s.is_requested());
        assert_eq!(s.reason(), None);
    }

    #[test]
    fn first_reason_wins() {
        let s = ShutdownSignal::new();
        assert!(s.request(ShutdownReason::VoiceCommand));
        assert!(!s.request(ShutdownReason::Signal));
        assert_eq!(s.reason(), Some(ShutdownReason::VoiceCommand));
    }

    #[test]
    fn clones_share_state() {
        let s = ShutdownSignal::new();
        let other = s.clone();
        other.request(ShutdownReason::Operator);
        assert!(s.is_requested());
    }

    #[tokio::test]
    async fn requested_resolves_immediately_when_already_set() {
        let s = ShutdownSignal::new();
        s.request(ShutdownReason::Signal);
        assert_eq!(s.requested().await, ShutdownReason::Signal);
    }

    #[tokio::test]
    async fn requested_wakes_waiter() {
        let s = ShutdownSignal::new();
        let waiter = {
            let s = s.clone();
            tokio::spawn(async move { s.requested().await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        s.request(ShutdownReason::Operator);

        let reason = tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter finished")
            .expect("task joined");
        assert_eq!(reason, ShutdownReason::Operator);
    }
}
