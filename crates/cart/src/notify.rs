//! Notification sinks for user-facing error messages.

use tokio::sync::mpsc;

/// A message shown to the shopper, e.g. as a toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
}

impl Notification {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Fire-and-forget delivery of notifications.
pub trait Notifier: Send + Sync + 'static {
    fn notify(&self, notification: Notification);
}

/// Writes notifications to the tracing log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        tracing::error!(notification = %notification.message, "Cart notification");
    }
}

/// Forwards notifications to a UI loop over an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelNotifier {
    /// Create a notifier and the receiving end for the UI.
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notification: Notification) {
        if let Err(e) = self.tx.send(notification) {
            tracing::debug!(notification = %e.0.message, "Notification dropped, receiver closed");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_notifier_delivers_in_order() {
        let (notifier, mut rx) = ChannelNotifier::channel();
        notifier.notify(Notification::new("first"));
        notifier.notify(Notification::new("second"));

        assert_eq!(rx.try_recv().unwrap().message, "first");
        assert_eq!(rx.try_recv().unwrap().message, "second");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_channel_notifier_survives_closed_receiver() {
        let (notifier, rx) = ChannelNotifier::channel();
        drop(rx);
        notifier.notify(Notification::new("nobody listening"));
    }
}
