mod commands;
mod output;
mod store;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use authreq_api::{Client, ClientConfig, StoredSession};
use clap::{Parser, Subcommand};

use crate::output::{RecordingNavigator, StderrNotifier};
use crate::store::FileStore;

#[derive(Parser)]
#[command(name = "authreq")]
#[command(about = "Send HTTP requests with a stored bearer token")]
struct Cli {
    /// Base URL for relative request paths (overrides AUTHREQ_BASE_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Session file holding the access token
    #[arg(
        long,
        global = true,
        env = "AUTHREQ_SESSION_FILE",
        default_value = ".authreq/session.json"
    )]
    store: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a request with the stored token attached
    Send(commands::send::SendArgs),
    /// Store an access token
    Login(commands::session::LoginArgs),
    /// Forget the stored token and user info
    Logout,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("authreq=info".parse()?)
                .add_directive("authreq_api=info".parse()?),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let session = Arc::new(StoredSession::new(FileStore::new(&cli.store)));

    match &cli.command {
        Commands::Send(args) => {
            let mut config = ClientConfig::from_env()?;
            if let Some(base_url) = &cli.base_url {
                config = config.with_base_url(base_url)?;
            }
            let navigator = Arc::new(RecordingNavigator::default());
            let client = Client::from_config(config, session)?
                .with_notifier(Arc::new(StderrNotifier))
                .with_navigator(navigator.clone());
            commands::send::run(args, &client, &navigator).await?;
        }
        Commands::Login(args) => commands::session::login(args, &session)?,
        Commands::Logout => commands::session::logout(&session)?,
    }

    Ok(())
}
