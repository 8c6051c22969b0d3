//! Shutdown Scope
//!
//! A one-shot cancellation signal for the eviction worker.

use tokio::sync::watch;

/// Creates a connected trigger/listener pair.
///
/// # Example
/// ```ignore
/// let (trigger, shutdown) = shutdown_channel();
/// let handle = cache.start_worker(shutdown)?;
/// // Later:
/// trigger.cancel();
/// handle.await?;
/// ```
pub fn shutdown_channel() -> (ShutdownTrigger, Shutdown) {
    let (tx, rx) = watch::channel(false);
    (ShutdownTrigger { tx }, Shutdown { rx })
}

// == Shutdown Trigger ==
/// Fires the scope. Dropping the trigger fires it too.
#[derive(Debug)]
pub struct ShutdownTrigger {
    tx: watch::Sender<bool>,
}

impl ShutdownTrigger {
    /// Signals every listener. Idempotent.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    /// Returns true once `cancel` was called.
    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Creates another listener for this scope.
    pub fn subscribe(&self) -> Shutdown {
        Shutdown {
            rx: self.tx.subscribe(),
        }
    }
}

// == Shutdown ==
/// Listener side of a shutdown scope.
#[derive(Debug, Clone)]
pub struct Shutdown {
    rx: watch::Receiver<bool>,
}

impl Shutdown {
    /// Returns true if the scope has fired or its trigger is gone.
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow() || self.rx.has_changed().is_err()
    }

    /// Completes once the scope fires or its trigger is dropped.
    pub async fn cancelled(&mut self) {
        // Err means the trigger was dropped, which also ends the scope.
        let _ = self.rx.wait_for(|cancelled| *cancelled).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_cancel_wakes_listener() {
        let (trigger, mut shutdown) = shutdown_channel();
        assert!(!shutdown.is_cancelled());

        let waiter = tokio::spawn(async move {
            shutdown.cancelled().await;
        });

        trigger.cancel();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("listener should wake")
            .unwrap();
        assert!(trigger.is_cancelled());
    }

    #[tokio::test]
    async fn test_dropping_trigger_cancels() {
        let (trigger, mut shutdown) = shutdown_channel();
        drop(trigger);

        assert!(shutdown.is_cancelled());
        tokio::time::timeout(Duration::from_secs(1), shutdown.cancelled())
            .await
            .expect("dropped trigger should end the scope");
    }

    #[tokio::test]
    async fn test_subscribe_after_cancel_sees_state() {
        let (trigger, _shutdown) = shutdown_channel();
        trigger.cancel();

        let late = trigger.subscribe();
        assert!(late.is_cancelled());
    }
}
