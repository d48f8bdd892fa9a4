//! Alert evaluation and notification delivery.
//!
//! The evaluator consumes classified check results, tracks consecutive
//! failures per service, and raises or resolves alerts in the store.
//! Raised alerts fan out to the configured notification channels.

pub mod evaluator;
pub mod notifier;
pub mod webhook;

pub use evaluator::AlertEvaluator;
pub use notifier::{CompositeNotifier, LogNotifier, NotificationError, Notifier};
pub use webhook::WebhookNotifier;
