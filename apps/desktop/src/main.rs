use std::{io, path::PathBuf, sync::Arc};

use anyhow::Result;
use clap::Parser;
use controller_core::{
    load_settings, settings_store::StoredCredentials, CredentialStore, EventSender,
    HttpBotBackend, JsonFileCredentialStore, SessionEvent, SessionRuntime,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod commands;
mod presenter;

use commands::{help_text, parse_line, Action, ParseContext};
use presenter::{server_lines, SharedView, TerminalPresenter};

#[derive(Parser, Debug)]
#[command(about = "Terminal controller for a Discord bot's REST API")]
struct Args {
    /// Bot server URL; defaults to the saved one.
    #[arg(long)]
    server_url: Option<String>,
    /// API secret sent as `x-api-secret`; defaults to the saved one.
    #[arg(long)]
    api_secret: Option<String>,
    /// TOML configuration file (default: ./controller.toml).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Where the credentials are persisted.
    #[arg(long)]
    settings_path: Option<PathBuf>,
    /// Connect immediately at startup.
    #[arg(long)]
    connect: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings(args.config.as_deref());
    if let Some(path) = args.settings_path {
        settings.settings_path = path;
    }
    info!(settings_path = %settings.settings_path.display(), "starting bot controller");

    let store = Arc::new(JsonFileCredentialStore::new(settings.settings_path.clone()));
    let stored = store.load().unwrap_or_else(|err| {
        warn!("ignoring saved credentials: {err:#}");
        StoredCredentials::default()
    });
    let context = ParseContext {
        server_url: args.server_url.or(stored.server_url).unwrap_or_default(),
        api_secret: args.api_secret.or(stored.api_secret).unwrap_or_default(),
        last_view: None,
    };

    let backend = Arc::new(HttpBotBackend::new(settings.request_timeout)?);
    let presenter = TerminalPresenter::new(io::stdout());
    let last_view = presenter.last_view();
    let (runtime, tx) = SessionRuntime::new(backend, store, &settings, presenter);

    if args.connect {
        let _ = tx.send(SessionEvent::ConnectRequested {
            server_url: context.server_url.clone(),
            api_secret: context.api_secret.clone(),
        });
    }
    println!("Type 'help' for commands.");
    tokio::spawn(read_commands(tx, last_view, context));

    runtime.run().await;
    Ok(())
}

async fn read_commands(tx: EventSender, last_view: SharedView, mut context: ParseContext) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(err) => {
                warn!("failed to read stdin: {err}");
                break;
            }
        };

        context.last_view = last_view.lock().ok().and_then(|view| view.clone());
        match parse_line(&line, &context) {
            Ok(None) => {}
            Ok(Some(Action::Help)) => println!("{}", help_text()),
            Ok(Some(Action::Servers)) => {
                let servers = context
                    .last_view
                    .as_ref()
                    .map(|view| server_lines(&view.servers))
                    .unwrap_or_default();
                for line in servers {
                    println!("{line}");
                }
            }
            Ok(Some(Action::Events(events))) => {
                for event in events {
                    if tx.send(event).is_err() {
                        return;
                    }
                }
            }
            Err(message) => println!("error: {message}"),
        }
    }
    let _ = tx.send(SessionEvent::Quit);
}
