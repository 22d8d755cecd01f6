mod send_commands;

use std::path::PathBuf;

use {
    clap::{Parser, Subcommand},
    tracing::{debug, info},
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
    waha_config::WahaConfig,
    waha_whatsapp::FileKind,
};

#[derive(Parser)]
#[command(name = "waha", about = "Send WhatsApp notifications through a WAHA gateway")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to ./waha.toml or ~/.config/waha/waha.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a text message.
    Send {
        /// Phone number or chat identifier.
        #[arg(long)]
        to: String,
        #[arg(short, long)]
        message: String,
        /// Gateway session (defaults to the configured one).
        #[arg(long)]
        session: Option<String>,
    },
    /// Send a file.
    SendFile {
        #[arg(long)]
        to: String,
        /// Path of the file, relative to --root.
        #[arg(long)]
        path: String,
        /// document, photo, audio, video or voice.
        #[arg(long, default_value = "document")]
        kind: FileKind,
        #[arg(long)]
        caption: Option<String>,
        /// File name shown to the recipient.
        #[arg(long)]
        filename: Option<String>,
        /// Directory files are read from.
        #[arg(long, default_value = ".")]
        root: PathBuf,
        #[arg(long)]
        session: Option<String>,
    },
    /// Print the chat identifier for a phone number.
    Format { phone: String },
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<WahaConfig> {
    let mut config = match &cli.config {
        Some(path) => waha_config::load_config(path)?,
        None => waha_config::discover_and_load(),
    };
    config.apply_env_overrides();
    debug!(url = %config.url, session = %config.session, "config loaded");
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "waha starting");
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Send {
            to,
            message,
            session,
        } => send_commands::send_text(&config, to, message, session).await,
        Commands::SendFile {
            to,
            path,
            kind,
            caption,
            filename,
            root,
            session,
        } => {
            let file = send_commands::FileArgs {
                path,
                kind,
                caption,
                filename,
                root,
            };
            send_commands::send_file(&config, to, file, session).await
        },
        Commands::Format { phone } => send_commands::format_phone(&config, &phone),
    }
}
