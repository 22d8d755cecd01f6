//! Attachment kinds and their gateway rules.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Kind of file attached to a WhatsApp message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    #[default]
    Document,
    Photo,
    Audio,
    Video,
    Voice,
}

impl FileKind {
    pub const fn all() -> [Self; 5] {
        [
            Self::Document,
            Self::Photo,
            Self::Audio,
            Self::Video,
            Self::Voice,
        ]
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Photo => "photo",
            Self::Audio => "audio",
            Self::Video => "video",
            Self::Voice => "voice",
        }
    }

    /// Canonical MIME type for this kind.
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Document => "application/octet-stream",
            Self::Photo => "image/jpeg",
            Self::Audio => "audio/mp3",
            Self::Video => "video/mp4",
            Self::Voice => "audio/ogg",
        }
    }

    /// Allowed file extensions. Empty means any extension.
    pub const fn allowed_extensions(self) -> &'static [&'static str] {
        match self {
            Self::Document => &[],
            Self::Photo => &["jpg", "jpeg", "png", "webp"],
            Self::Audio => &["mp3", "ogg", "m4a"],
            Self::Video => &["mp4", "avi", "mov", "mkv"],
            Self::Voice => &["ogg", "mp3"],
        }
    }

    /// Case-insensitive extension check; a leading dot is ignored.
    pub fn is_extension_allowed(self, extension: &str) -> bool {
        let allowed = self.allowed_extensions();
        if allowed.is_empty() {
            return true;
        }
        let extension = extension.trim_start_matches('.');
        allowed.iter().any(|a| a.eq_ignore_ascii_case(extension))
    }

    /// Whether the gateway shows a caption for this kind.
    pub const fn supports_caption(self) -> bool {
        matches!(self, Self::Photo | Self::Document)
    }

    /// Gateway endpoint used to send this kind, if the gateway has one.
    pub const fn endpoint(self) -> Option<&'static str> {
        match self {
            Self::Photo => Some("sendImage"),
            Self::Document => Some("sendFile"),
            Self::Audio | Self::Video | Self::Voice => None,
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FileKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown file kind: {s}"))
    }
}
