//! Media lookup for outbound attachments: storage abstraction and MIME detection.

pub mod mime;
pub mod store;

pub use store::{FileStorage, LocalStorage};
