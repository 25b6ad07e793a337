//! Downstream consumer of catalog change events.
//!
//! Subscribes to the single-change and bulk topics and turns every received
//! `ResourceEvent` into a `Notification` handed to a `Notifier`. Delivery is
//! best effort: a notifier must tolerate duplicates and gaps.

pub mod config;
pub mod listener;
pub mod notification;
pub mod notifier;

pub use config::ConsumerConfig;
pub use listener::{ListenerHandle, NotificationListener};
pub use notification::{Notification, NotificationKind};
pub use notifier::{LoggingNotifier, Notifier, NotifyError};
