use crate::file_kind::FileKind;

/// Why a WhatsApp message could not be delivered.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The gateway answered 4xx with a readable error body.
    #[error("WAHA server responded with an error `{status} - {description}`")]
    GatewayRejected { status: u16, description: String },

    /// The gateway answered 4xx without a readable error body.
    #[error("WAHA server responded with an error `{status}` but no response body found")]
    GatewayRejectedOpaque { status: u16 },

    /// Connection, DNS, timeout or server-side failure.
    #[error("the communication with WAHA server failed: {message}")]
    Transport { message: String },

    #[error("failed to open file: {path}")]
    FileAccess { path: String },

    #[error("invalid recipient: {raw}")]
    InvalidRecipient { raw: String },

    /// The gateway has no endpoint for this kind of attachment.
    #[error("no WAHA endpoint for {kind} files")]
    UnsupportedFileKind { kind: FileKind },

    /// A 2xx response whose body is not JSON.
    #[error("invalid WAHA response: {message}")]
    InvalidResponse { message: String },
}

impl Error {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Stable tag for diagnostics and failure events.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::GatewayRejected { .. } => "gateway_rejected",
            Self::GatewayRejectedOpaque { .. } => "gateway_rejected_opaque",
            Self::Transport { .. } => "transport_error",
            Self::FileAccess { .. } => "file_access_error",
            Self::InvalidRecipient { .. } => "invalid_recipient",
            Self::UnsupportedFileKind { .. } => "unsupported_file_kind",
            Self::InvalidResponse { .. } => "invalid_response",
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
