//! Attachment messages: documents, photos, audio, video and voice notes.

use std::path::Path;

use {
    async_trait::async_trait,
    base64::{Engine, engine::general_purpose::STANDARD},
    serde_json::Value,
    tracing::warn,
    waha_media::FileStorage,
};

use crate::{
    client::WahaClient,
    error::{Error, Result},
    file_kind::FileKind,
    payload::{FilePayload, Payload},
    sender::{ExceptionHandler, WhatsappSender, shared_builder},
};

/// File message builder.
///
/// The caption set through [`WhatsappFile::content`] is kept for every kind
/// but only serialized for kinds that support captions.
#[derive(Clone, Default)]
pub struct WhatsappFile {
    payload: Payload,
    kind: FileKind,
    exception_handler: Option<ExceptionHandler>,
}

shared_builder!(WhatsappFile, kind);

impl WhatsappFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// New file message with a caption.
    pub fn create(caption: impl Into<String>) -> Self {
        Self::new().content(caption)
    }

    pub fn file_kind(&self) -> FileKind {
        self.kind
    }

    /// Caption shown under the attachment.
    #[must_use]
    pub fn content(mut self, caption: impl Into<String>) -> Self {
        self.payload.caption = Some(caption.into());
        self
    }

    /// Change the attachment kind without touching the file itself.
    #[must_use]
    pub fn kind(mut self, kind: FileKind) -> Self {
        self.kind = kind;
        self
    }

    /// Attach `source` read from `storage`.
    ///
    /// Fails with [`Error::FileAccess`] when `source` does not exist. A MIME
    /// type or contents that cannot be resolved only leave the matching
    /// field out of the payload.
    pub fn file(
        mut self,
        storage: &dyn FileStorage,
        source: &str,
        kind: FileKind,
        filename: Option<&str>,
    ) -> Result<Self> {
        if !storage.exists(source) {
            return Err(Error::FileAccess {
                path: source.to_string(),
            });
        }

        let extension = Path::new(filename.unwrap_or(source))
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        if !kind.is_extension_allowed(extension) {
            warn!(
                path = source,
                kind = %kind,
                extension,
                expected_mime = kind.mime_type(),
                "file extension not allowed for kind"
            );
        }

        let file = FilePayload {
            mimetype: storage.mime_type(source),
            data: storage
                .get(source)
                .filter(|bytes| !bytes.is_empty())
                .map(|bytes| STANDARD.encode(bytes)),
            filename: filename.map(str::to_string),
        };

        self.kind = kind;
        self.payload.file = Some(file);
        Ok(self)
    }

    pub fn photo(self, storage: &dyn FileStorage, source: &str) -> Result<Self> {
        self.file(storage, source, FileKind::Photo, None)
    }

    pub fn audio(self, storage: &dyn FileStorage, source: &str) -> Result<Self> {
        self.file(storage, source, FileKind::Audio, None)
    }

    pub fn document(
        self,
        storage: &dyn FileStorage,
        source: &str,
        filename: Option<&str>,
    ) -> Result<Self> {
        self.file(storage, source, FileKind::Document, filename)
    }

    pub fn video(self, storage: &dyn FileStorage, source: &str) -> Result<Self> {
        self.file(storage, source, FileKind::Video, None)
    }

    pub fn voice(self, storage: &dyn FileStorage, source: &str) -> Result<Self> {
        self.file(storage, source, FileKind::Voice, None)
    }
}

#[async_trait]
impl WhatsappSender for WhatsappFile {
    fn can_send(&self) -> bool {
        self.payload.file.is_some()
    }

    fn payload_value(&self, key: &str) -> Option<Value> {
        self.payload.get(key)
    }

    fn set_recipient(&mut self, chat_id: String) {
        self.payload.chat_id = Some(chat_id);
    }

    fn to_payload(&self) -> Payload {
        let mut payload = Payload {
            text: None,
            ..self.payload.clone()
        };
        if !self.kind.supports_caption() {
            payload.caption = None;
        }
        payload
    }

    fn exception_handler(&self) -> Option<&ExceptionHandler> {
        self.exception_handler.as_ref()
    }

    async fn send(&self, client: &WahaClient) -> Result<reqwest::Response> {
        client.send_file(self.to_payload(), self.kind).await
    }
}
