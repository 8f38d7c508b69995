use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use huddle::{Config, CredentialStore, ServerState, server};

#[tokio::main]
async fn main() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let config = Config::parse();

    let credentials = CredentialStore::load(&config.users)?;
    if credentials.is_empty() {
        warn!(path = %config.users.display(), "credential file has no accounts");
    }
    info!(accounts = credentials.len(), "credentials loaded");

    let listen = config.listen.clone();
    let state = ServerState::new(config, credentials);

    tokio::select! {
        res = server::run(&listen, state) => res,
        _ = tokio::signal::ctrl_c() => {
            info!("shutting down");
            Ok(())
        }
    }
}
