//! WhatsApp notification channel backed by a WAHA HTTP gateway.
//!
//! Messages are built with [`WhatsappMessage`] (text) or [`WhatsappFile`]
//! (attachments), addressed through [`PhoneFormatter`] and delivered by
//! [`WhatsappChannel`] over a [`WahaClient`].

pub mod channel;
pub mod client;
pub mod error;
pub mod file;
pub mod file_kind;
pub mod message;
pub mod payload;
pub mod phone;
pub mod sender;

pub use {
    channel::{WhatsappChannel, WhatsappNotification},
    client::WahaClient,
    error::{Error, Result},
    file::WhatsappFile,
    file_kind::FileKind,
    message::WhatsappMessage,
    payload::{FilePayload, Payload},
    phone::PhoneFormatter,
    sender::{ExceptionHandler, FailureReport, WhatsappOutbound, WhatsappSender},
};
