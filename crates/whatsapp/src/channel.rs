//! Notification channel: turns a notification into a WAHA send.

use std::sync::Arc;

use {
    serde_json::Value,
    tracing::{debug, warn},
    waha_channels::{EventDispatcher, Notifiable, Notification, NotificationFailed},
    waha_config::WahaConfig,
};

use crate::{
    client::WahaClient,
    error::{Error, Result},
    phone::PhoneFormatter,
    sender::{FailureReport, WhatsappOutbound, WhatsappSender},
};

/// A notification that can be delivered over WhatsApp.
pub trait WhatsappNotification: Notification {
    fn to_whatsapp(&self, notifiable: &dyn Notifiable) -> WhatsappOutbound;
}

/// Delivers notifications through a WAHA gateway.
pub struct WhatsappChannel {
    client: WahaClient,
    formatter: PhoneFormatter,
    events: Arc<dyn EventDispatcher>,
}

impl WhatsappChannel {
    /// Channel name used for routing and in failure events.
    pub const ID: &'static str = "whatsapp";

    /// Secondary routing key asked when the notifiable has no `whatsapp` route.
    pub const FALLBACK_ROUTE: &'static str = "waha";

    pub fn new(client: WahaClient, events: Arc<dyn EventDispatcher>) -> Self {
        Self {
            client,
            formatter: PhoneFormatter::default(),
            events,
        }
    }

    /// Client and phone formatter built from `config`.
    pub fn from_config(config: &WahaConfig, events: Arc<dyn EventDispatcher>) -> Self {
        Self::new(WahaClient::new(config), events)
            .with_formatter(PhoneFormatter::new(config.country_code.clone()))
    }

    #[must_use]
    pub fn with_formatter(mut self, formatter: PhoneFormatter) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn client(&self) -> &WahaClient {
        &self.client
    }

    /// Send `notification` to `notifiable`.
    ///
    /// Returns `Ok(None)` without contacting the gateway when the message is
    /// empty or no valid recipient resolves. A failed send calls the
    /// message's exception handler, dispatches [`NotificationFailed`] and
    /// returns the error.
    pub async fn send(
        &self,
        notifiable: &dyn Notifiable,
        notification: &dyn WhatsappNotification,
    ) -> Result<Option<Value>> {
        let mut message = notification.to_whatsapp(notifiable);

        if !message.can_send() {
            debug!(
                notification = notification.notification_type(),
                "nothing to send, skipping"
            );
            return Ok(None);
        }

        let Some(to) = self.resolve_recipient(&message, notifiable, notification) else {
            return Ok(None);
        };
        message.set_recipient(to);

        let response = match message.send(&self.client).await {
            Ok(response) => response,
            Err(e) => {
                self.report_failure(&message, notifiable, notification, &e)
                    .await;
                return Err(e);
            },
        };

        let body = response
            .json::<Value>()
            .await
            .map_err(|e| Error::InvalidResponse {
                message: e.to_string(),
            })?;
        Ok(Some(body))
    }

    /// Explicit `chatId` first, then the notifiable's routes. Phone numbers
    /// are normalized; well-formed chat identifiers pass through.
    fn resolve_recipient(
        &self,
        message: &WhatsappOutbound,
        notifiable: &dyn Notifiable,
        notification: &dyn Notification,
    ) -> Option<String> {
        let non_empty = |s: &String| !s.trim().is_empty();

        let raw = message
            .payload_value("chatId")
            .and_then(|v| v.as_str().map(str::to_string))
            .filter(non_empty)
            .or_else(|| {
                notifiable
                    .route_notification_for(Self::ID, notification)
                    .filter(non_empty)
            })
            .or_else(|| {
                notifiable
                    .route_notification_for(Self::FALLBACK_ROUTE, notification)
                    .filter(non_empty)
            });

        let Some(raw) = raw else {
            debug!(
                notifiable = %notifiable.notifiable_id(),
                "no WhatsApp route, skipping"
            );
            return None;
        };

        match self.formatter.normalize(&raw) {
            Ok(chat_id) => Some(chat_id),
            Err(e) => {
                warn!(
                    notifiable = %notifiable.notifiable_id(),
                    error = %e,
                    "skipping WhatsApp notification"
                );
                None
            },
        }
    }

    async fn report_failure(
        &self,
        message: &WhatsappOutbound,
        notifiable: &dyn Notifiable,
        notification: &dyn Notification,
        error: &Error,
    ) {
        let report = FailureReport {
            to: message
                .payload_value("chatId")
                .and_then(|v| v.as_str().map(str::to_string)),
            request: message.to_payload(),
            kind: error.kind(),
            error: error.to_string(),
        };

        warn!(
            to = report.to.as_deref().unwrap_or_default(),
            kind = report.kind,
            error = %error,
            "WhatsApp notification failed"
        );

        if let Some(handler) = message.exception_handler() {
            handler(&report);
        }

        let data = serde_json::to_value(&report).unwrap_or(Value::Null);
        self.events
            .dispatch(NotificationFailed {
                notifiable: notifiable.notifiable_id(),
                notification: notification.notification_type().to_string(),
                channel: Self::ID.to_string(),
                data,
            })
            .await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use {
        super::*,
        crate::{file::WhatsappFile, message::WhatsappMessage},
        secrecy::Secret,
        serde_json::json,
        tokio::sync::mpsc,
        waha_media::LocalStorage,
        wiremock::{
            Mock, MockServer, ResponseTemplate,
            matchers::{body_partial_json, method, path},
        },
    };

    struct User {
        phone: Option<&'static str>,
        fallback: Option<&'static str>,
    }

    impl Notifiable for User {
        fn notifiable_id(&self) -> String {
            "user-7".into()
        }

        fn route_notification_for(
            &self,
            channel: &str,
            _notification: &dyn Notification,
        ) -> Option<String> {
            match channel {
                WhatsappChannel::ID => self.phone.map(str::to_string),
                WhatsappChannel::FALLBACK_ROUTE => self.fallback.map(str::to_string),
                _ => None,
            }
        }
    }

    fn user(phone: &'static str) -> User {
        User {
            phone: Some(phone),
            fallback: None,
        }
    }

    struct OrderShipped(WhatsappOutbound);

    impl Notification for OrderShipped {
        fn notification_type(&self) -> &str {
            "order_shipped"
        }
    }

    impl WhatsappNotification for OrderShipped {
        fn to_whatsapp(&self, _notifiable: &dyn Notifiable) -> WhatsappOutbound {
            self.0.clone()
        }
    }

    fn notification(message: impl Into<WhatsappOutbound>) -> OrderShipped {
        OrderShipped(message.into())
    }

    fn channel(url: &str) -> (WhatsappChannel, mpsc::UnboundedReceiver<NotificationFailed>) {
        let config = WahaConfig {
            api_key: Some(Secret::new("test-key".into())),
            url: url.into(),
            ..Default::default()
        };
        let (tx, rx) = mpsc::unbounded_channel();
        (WhatsappChannel::from_config(&config, Arc::new(tx)), rx)
    }

    async fn gateway_expecting(requests: u64) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "abc" })))
            .expect(requests)
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn sends_text_and_returns_decoded_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/sendText"))
            .and(body_partial_json(json!({
                "session": "default",
                "chatId": "233241234567@c.us",
                "text": "Your order shipped"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "abc" })))
            .expect(1)
            .mount(&server)
            .await;

        let (channel, mut events) = channel(&server.uri());
        let result = channel
            .send(&user("0241234567"), &notification("Your order shipped"))
            .await
            .unwrap();

        assert_eq!(result, Some(json!({ "id": "abc" })));
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn empty_message_is_skipped() {
        let server = gateway_expecting(0).await;
        let (channel, _events) = channel(&server.uri());

        let result = channel
            .send(&user("0241234567"), &notification(""))
            .await
            .unwrap();
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn invalid_phone_is_skipped() {
        let server = gateway_expecting(0).await;
        let (channel, mut events) = channel(&server.uri());

        let result = channel
            .send(&user("123"), &notification("hello"))
            .await
            .unwrap();
        assert_eq!(result, None);
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn malformed_chat_id_is_skipped() {
        let server = gateway_expecting(0).await;
        let (channel, mut events) = channel(&server.uri());

        let result = channel
            .send(&user("not-a-number@c.us"), &notification("hello"))
            .await
            .unwrap();
        assert_eq!(result, None);
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn routed_chat_id_passes_through() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "chatId": "233241234567@c.us" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "abc" })))
            .expect(1)
            .mount(&server)
            .await;

        let (channel, _events) = channel(&server.uri());
        channel
            .send(&user("233241234567@c.us"), &notification("hello"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn no_route_is_skipped() {
        let server = gateway_expecting(0).await;
        let (channel, _events) = channel(&server.uri());
        let nobody = User {
            phone: None,
            fallback: Some(""),
        };

        let result = channel.send(&nobody, &notification("hello")).await.unwrap();
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn fallback_route_is_used() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "chatId": "233201112222@c.us" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "abc" })))
            .expect(1)
            .mount(&server)
            .await;

        let (channel, _events) = channel(&server.uri());
        let user = User {
            phone: None,
            fallback: Some("+233 20 111 2222"),
        };
        channel.send(&user, &notification("hello")).await.unwrap();
    }

    #[tokio::test]
    async fn explicit_chat_id_takes_priority() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "chatId": "120363025@g.us" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "abc" })))
            .expect(1)
            .mount(&server)
            .await;

        let (channel, _events) = channel(&server.uri());
        let message = WhatsappMessage::new("standup in 5").to("120363025@g.us");
        channel
            .send(&user("0241234567"), &notification(message))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn explicit_phone_number_is_normalized() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "chatId": "233551234567@c.us" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "abc" })))
            .expect(1)
            .mount(&server)
            .await;

        let (channel, _events) = channel(&server.uri());
        let message = WhatsappMessage::new("hello").to("055 123 4567");
        channel
            .send(&user("0241234567"), &notification(message))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn rejection_runs_handler_and_dispatches_event() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({ "description": "bad session" })),
            )
            .mount(&server)
            .await;

        let (channel, mut events) = channel(&server.uri());
        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);
        let message = WhatsappMessage::new("hello")
            .on_error(move |report| *sink.lock().unwrap() = Some(report.clone()));

        let err = channel
            .send(&user("0241234567"), &notification(message))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("400 - bad session"));

        let report = seen.lock().unwrap().take().unwrap();
        assert_eq!(report.to.as_deref(), Some("233241234567@c.us"));
        assert_eq!(report.kind, "gateway_rejected");
        assert_eq!(report.request.text.as_deref(), Some("hello"));

        let event = events.try_recv().unwrap();
        assert_eq!(event.channel, "whatsapp");
        assert_eq!(event.notifiable, "user-7");
        assert_eq!(event.notification, "order_shipped");
        assert_eq!(event.data["to"], "233241234567@c.us");
        assert_eq!(event.data["request"]["text"], "hello");
        assert_eq!(event.data["kind"], "gateway_rejected");
    }

    #[tokio::test]
    async fn unsupported_file_kind_fails_without_request() {
        let server = gateway_expecting(0).await;
        let (channel, mut events) = channel(&server.uri());

        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("clip.mp4"), b"\x00\x00\x00\x18ftyp").unwrap();
        let storage = LocalStorage::new(dir.path());
        let message = WhatsappFile::new().video(&storage, "clip.mp4").unwrap();

        let err = channel
            .send(&user("0241234567"), &notification(message))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedFileKind { .. }));
        assert_eq!(events.try_recv().unwrap().data["kind"], "unsupported_file_kind");
    }

    #[tokio::test]
    async fn sends_document_to_send_file() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/sendFile"))
            .and(body_partial_json(json!({
                "chatId": "233241234567@c.us",
                "caption": "Invoice attached",
                "file": { "mimetype": "application/pdf", "filename": "INV-001.pdf" }
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": "file-1" })))
            .expect(1)
            .mount(&server)
            .await;

        let (channel, _events) = channel(&server.uri());
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("invoice.pdf"), b"%PDF-1.7").unwrap();
        let storage = LocalStorage::new(dir.path());
        let message = WhatsappFile::create("Invoice attached")
            .document(&storage, "invoice.pdf", Some("INV-001.pdf"))
            .unwrap();

        let result = channel
            .send(&user("0241234567"), &notification(message))
            .await
            .unwrap();
        assert_eq!(result, Some(json!({ "id": "file-1" })));
    }

    #[tokio::test]
    async fn non_json_success_body_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
            .mount(&server)
            .await;

        let (channel, mut events) = channel(&server.uri());
        let err = channel
            .send(&user("0241234567"), &notification("hello"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidResponse { .. }));
        assert!(events.try_recv().is_err());
    }
}
