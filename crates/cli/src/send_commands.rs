use std::{path::PathBuf, sync::Arc};

use {
    anyhow::{Context, Result},
    tracing::info,
    waha_channels::{Notifiable, Notification, TracingDispatcher},
    waha_config::WahaConfig,
    waha_media::LocalStorage,
    waha_whatsapp::{
        FileKind, PhoneFormatter, WhatsappChannel, WhatsappFile, WhatsappMessage,
        WhatsappNotification, WhatsappOutbound,
    },
};

/// Attachment options for `send-file`.
pub struct FileArgs {
    pub path: String,
    pub kind: FileKind,
    pub caption: Option<String>,
    pub filename: Option<String>,
    pub root: PathBuf,
}

/// The command-line target, routed on the WhatsApp channel only.
struct Recipient {
    address: String,
}

impl Notifiable for Recipient {
    fn notifiable_id(&self) -> String {
        self.address.clone()
    }

    fn route_notification_for(
        &self,
        channel: &str,
        _notification: &dyn Notification,
    ) -> Option<String> {
        (channel == WhatsappChannel::ID).then(|| self.address.clone())
    }
}

/// A message composed on the command line.
struct CliMessage(WhatsappOutbound);

impl Notification for CliMessage {
    fn notification_type(&self) -> &str {
        "cli_message"
    }
}

impl WhatsappNotification for CliMessage {
    fn to_whatsapp(&self, _notifiable: &dyn Notifiable) -> WhatsappOutbound {
        self.0.clone()
    }
}

pub async fn send_text(
    config: &WahaConfig,
    to: String,
    message: String,
    session: Option<String>,
) -> Result<()> {
    let mut message = WhatsappMessage::new(message);
    if let Some(session) = session {
        message = message.session(session);
    }
    deliver(config, to, message.into()).await
}

pub async fn send_file(
    config: &WahaConfig,
    to: String,
    file: FileArgs,
    session: Option<String>,
) -> Result<()> {
    let storage = LocalStorage::new(&file.root);
    let mut message = WhatsappFile::new()
        .file(&storage, &file.path, file.kind, file.filename.as_deref())
        .with_context(|| format!("cannot attach {}", file.path))?;
    if let Some(caption) = file.caption {
        message = message.content(caption);
    }
    if let Some(session) = session {
        message = message.session(session);
    }
    deliver(config, to, message.into()).await
}

pub fn format_phone(config: &WahaConfig, phone: &str) -> Result<()> {
    let chat_id = PhoneFormatter::new(config.country_code.clone()).format(phone)?;
    println!("{chat_id}");
    Ok(())
}

async fn deliver(config: &WahaConfig, to: String, message: WhatsappOutbound) -> Result<()> {
    let channel = WhatsappChannel::from_config(config, Arc::new(TracingDispatcher));
    let recipient = Recipient { address: to };

    let response = channel
        .send(&recipient, &CliMessage(message))
        .await
        .context("failed to send WhatsApp message")?;

    match response {
        Some(body) => {
            info!(to = %recipient.address, "message sent");
            println!("{}", serde_json::to_string_pretty(&body)?);
            Ok(())
        },
        None => anyhow::bail!("nothing sent: empty message or invalid recipient"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recipient_routes_whatsapp_only() {
        let recipient = Recipient {
            address: "0241234567".into(),
        };
        let note = CliMessage("hi".into());

        assert_eq!(
            recipient.route_notification_for(WhatsappChannel::ID, &note),
            Some("0241234567".into())
        );
        assert_eq!(
            recipient.route_notification_for(WhatsappChannel::FALLBACK_ROUTE, &note),
            None
        );
    }

    #[test]
    fn format_rejects_short_numbers() {
        let config = WahaConfig::default();
        assert!(format_phone(&config, "0241234567").is_ok());
        assert!(format_phone(&config, "123").is_err());
    }

    #[tokio::test]
    async fn missing_attachment_fails_before_sending() {
        let dir = std::env::temp_dir();
        let file = FileArgs {
            path: "definitely-missing-attachment.pdf".into(),
            kind: FileKind::Document,
            caption: None,
            filename: None,
            root: dir,
        };

        let err = send_file(&WahaConfig::default(), "0241234567".into(), file, None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("cannot attach"));
    }
}
