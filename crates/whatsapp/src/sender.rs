//! Behavior shared by every outbound WhatsApp message.

use std::sync::Arc;

use {async_trait::async_trait, serde::Serialize, serde_json::Value};

use crate::{
    client::WahaClient, error::Result, file::WhatsappFile, message::WhatsappMessage,
    payload::Payload,
};

/// Callback invoked with diagnostics when a send fails.
pub type ExceptionHandler = Arc<dyn Fn(&FailureReport) + Send + Sync>;

/// Diagnostics for a failed send.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureReport {
    /// Chat identifier the message was addressed to.
    pub to: Option<String>,
    /// Payload as it was handed to the gateway.
    pub request: Payload,
    /// Error tag, see [`crate::Error::kind`].
    pub kind: &'static str,
    pub error: String,
}

/// A message the channel can address and deliver.
#[async_trait]
pub trait WhatsappSender: Send + Sync {
    /// Whether there is anything to deliver.
    fn can_send(&self) -> bool;

    /// Value stored under the wire key `key`.
    fn payload_value(&self, key: &str) -> Option<Value>;

    /// Address the message to `chat_id`.
    fn set_recipient(&mut self, chat_id: String);

    /// Payload exactly as it will be sent.
    fn to_payload(&self) -> Payload;

    fn exception_handler(&self) -> Option<&ExceptionHandler>;

    /// Deliver through `client`. The builder itself is left untouched.
    async fn send(&self, client: &WahaClient) -> Result<reqwest::Response>;
}

/// Setters and `Debug` shared by the message builders. The builder must have
/// `payload: Payload` and `exception_handler: Option<ExceptionHandler>`
/// fields; any extra fields listed are added to the `Debug` output.
macro_rules! shared_builder {
    ($builder:ident $(, $field:ident)*) => {
        impl ::std::fmt::Debug for $builder {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.debug_struct(stringify!($builder))
                    $(.field(stringify!($field), &self.$field))*
                    .field("payload", &self.payload)
                    .field("exception_handler", &self.exception_handler.is_some())
                    .finish()
            }
        }

        impl $builder {
            /// Recipient chat identifier (`<number>@c.us`) or a raw phone number.
            #[must_use]
            pub fn to(mut self, recipient: impl Into<String>) -> Self {
                self.payload.chat_id = Some(recipient.into());
                self
            }

            /// Gateway session, overriding the configured default.
            #[must_use]
            pub fn session(mut self, session: impl Into<String>) -> Self {
                self.payload.session = Some(session.into());
                self
            }

            /// Additional gateway field. Content keys that belong to the
            /// other message kind are dropped when the payload is built.
            #[must_use]
            pub fn option(
                mut self,
                key: impl Into<String>,
                value: impl Into<::serde_json::Value>,
            ) -> Self {
                self.payload.insert(key, value.into());
                self
            }

            /// Called with diagnostics if the channel fails to deliver this message.
            #[must_use]
            pub fn on_error(
                mut self,
                handler: impl Fn(&$crate::sender::FailureReport) + Send + Sync + 'static,
            ) -> Self {
                self.exception_handler = Some(::std::sync::Arc::new(handler));
                self
            }
        }
    };
}

pub(crate) use shared_builder;

/// What a notification hands to the WhatsApp channel.
#[derive(Debug, Clone)]
pub enum WhatsappOutbound {
    Text(WhatsappMessage),
    File(WhatsappFile),
}

impl WhatsappOutbound {
    fn inner(&self) -> &dyn WhatsappSender {
        match self {
            Self::Text(message) => message,
            Self::File(file) => file,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn WhatsappSender {
        match self {
            Self::Text(message) => message,
            Self::File(file) => file,
        }
    }
}

#[async_trait]
impl WhatsappSender for WhatsappOutbound {
    fn can_send(&self) -> bool {
        self.inner().can_send()
    }

    fn payload_value(&self, key: &str) -> Option<Value> {
        self.inner().payload_value(key)
    }

    fn set_recipient(&mut self, chat_id: String) {
        self.inner_mut().set_recipient(chat_id);
    }

    fn to_payload(&self) -> Payload {
        self.inner().to_payload()
    }

    fn exception_handler(&self) -> Option<&ExceptionHandler> {
        self.inner().exception_handler()
    }

    async fn send(&self, client: &WahaClient) -> Result<reqwest::Response> {
        self.inner().send(client).await
    }
}

impl From<&str> for WhatsappOutbound {
    fn from(text: &str) -> Self {
        Self::Text(WhatsappMessage::new(text))
    }
}

impl From<String> for WhatsappOutbound {
    fn from(text: String) -> Self {
        Self::Text(WhatsappMessage::new(text))
    }
}

impl From<WhatsappMessage> for WhatsappOutbound {
    fn from(message: WhatsappMessage) -> Self {
        Self::Text(message)
    }
}

impl From<WhatsappFile> for WhatsappOutbound {
    fn from(file: WhatsappFile) -> Self {
        Self::File(file)
    }
}
