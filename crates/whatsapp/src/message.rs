use {async_trait::async_trait, serde_json::Value};

use crate::{
    client::WahaClient,
    error::Result,
    payload::Payload,
    sender::{ExceptionHandler, WhatsappSender, shared_builder},
};

/// Text message builder.
#[derive(Clone, Default)]
pub struct WhatsappMessage {
    payload: Payload,
    exception_handler: Option<ExceptionHandler>,
}

shared_builder!(WhatsappMessage);

impl WhatsappMessage {
    pub fn new(content: impl Into<String>) -> Self {
        Self::default().content(content)
    }

    /// Message body.
    #[must_use]
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.payload.text = Some(content.into());
        self
    }
}

#[async_trait]
impl WhatsappSender for WhatsappMessage {
    fn can_send(&self) -> bool {
        self.payload.text.as_deref().is_some_and(|t| !t.is_empty())
    }

    fn payload_value(&self, key: &str) -> Option<Value> {
        self.payload.get(key)
    }

    fn set_recipient(&mut self, chat_id: String) {
        self.payload.chat_id = Some(chat_id);
    }

    fn to_payload(&self) -> Payload {
        Payload {
            file: None,
            caption: None,
            ..self.payload.clone()
        }
    }

    fn exception_handler(&self) -> Option<&ExceptionHandler> {
        self.exception_handler.as_ref()
    }

    async fn send(&self, client: &WahaClient) -> Result<reqwest::Response> {
        client.send_message(self.to_payload()).await
    }
}
