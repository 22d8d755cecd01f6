use {
    async_trait::async_trait,
    serde::{Deserialize, Serialize},
    tokio::sync::mpsc,
    tracing::warn,
};

/// Emitted when a channel attempted a delivery and it failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationFailed {
    pub notifiable: String,
    pub notification: String,
    pub channel: String,
    /// Channel-specific diagnostics (recipient, request, error).
    pub data: serde_json::Value,
}

/// Sink for channel failure events.
#[async_trait]
pub trait EventDispatcher: Send + Sync {
    async fn dispatch(&self, event: NotificationFailed);
}

/// Logs failure events and drops them.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDispatcher;

#[async_trait]
impl EventDispatcher for TracingDispatcher {
    async fn dispatch(&self, event: NotificationFailed) {
        warn!(
            channel = %event.channel,
            notifiable = %event.notifiable,
            notification = %event.notification,
            data = %event.data,
            "notification failed"
        );
    }
}

/// Forwards failure events to an unbounded channel.
#[async_trait]
impl EventDispatcher for mpsc::UnboundedSender<NotificationFailed> {
    async fn dispatch(&self, event: NotificationFailed) {
        if self.send(event).is_err() {
            warn!("failure event receiver dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use {super::*, serde_json::json};

    fn sample_event() -> NotificationFailed {
        NotificationFailed {
            notifiable: "user-42".into(),
            notification: "invoice_paid".into(),
            channel: "whatsapp".into(),
            data: json!({ "to": "233241234567@c.us" }),
        }
    }

    #[tokio::test]
    async fn forwards_to_channel() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        tx.dispatch(sample_event()).await;

        let received = rx.recv().await.unwrap();
        assert_eq!(received, sample_event());
    }

    #[tokio::test]
    async fn dropped_receiver_is_ignored() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        tx.dispatch(sample_event()).await;
    }

    #[tokio::test]
    async fn tracing_dispatcher_accepts_events() {
        TracingDispatcher.dispatch(sample_event()).await;
    }
}
