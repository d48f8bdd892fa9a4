use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

use crate::database::models::Alert;

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("webhook delivery failed: {0}")]
    Webhook(String),

    #[error("notification channel unavailable: {0}")]
    Unavailable(String),
}

/// Outbound notification channel for raised and resolved alerts.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, alert: &Alert) -> Result<(), NotificationError>;
}

/// Channel that writes alerts to the structured log.
#[derive(Default)]
pub struct LogNotifier;

impl LogNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, alert: &Alert) -> Result<(), NotificationError> {
        warn!(
            kind = %alert.kind,
            service = %alert.service,
            resolved = alert.resolved,
            "ALERT [{}]: {}",
            alert.kind,
            alert.message
        );
        Ok(())
    }
}

/// Fan-out to several channels; every channel is attempted even when an
/// earlier one fails, and the first error is reported.
pub struct CompositeNotifier {
    channels: Vec<Box<dyn Notifier>>,
}

impl CompositeNotifier {
    pub fn new(channels: Vec<Box<dyn Notifier>>) -> Self {
        Self { channels }
    }
}

#[async_trait]
impl Notifier for CompositeNotifier {
    async fn notify(&self, alert: &Alert) -> Result<(), NotificationError> {
        let mut first_error = None;

        for channel in &self.channels {
            if let Err(e) = channel.notify(alert).await {
                warn!("notification channel failed: {e}");
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::AlertKind;
    use crate::monitoring::types::ServiceId;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingNotifier {
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    #[async_trait]
    impl Notifier for CountingNotifier {
        async fn notify(&self, _alert: &Alert) -> Result<(), NotificationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(NotificationError::Unavailable("test".into()))
            } else {
                Ok(())
            }
        }
    }

    fn alert() -> Alert {
        Alert::new(AlertKind::ServiceDown, ServiceId::new("GOV/1234/SYS", "getInfo"), "down")
    }

    #[tokio::test]
    async fn composite_attempts_all_channels_on_failure() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        let composite = CompositeNotifier::new(vec![
            Box::new(CountingNotifier { calls: first.clone(), fail: true }),
            Box::new(CountingNotifier { calls: second.clone(), fail: false }),
        ]);

        let result = composite.notify(&alert()).await;
        assert!(result.is_err());
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn log_notifier_always_succeeds() {
        assert!(LogNotifier::new().notify(&alert()).await.is_ok());
    }
}
