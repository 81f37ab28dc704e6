use anyhow::{Context, Result};
use authreq_api::session::{ACCESS_TOKEN_KEY, USER_INFO_KEY};
use authreq_api::StoredSession;
use clap::Args;

use crate::store::FileStore;

#[derive(Args)]
pub struct LoginArgs {
    /// Access token to store
    #[arg(long)]
    pub token: String,

    /// Cached user info as a JSON document
    #[arg(long)]
    pub user_info: Option<String>,
}

pub fn login(args: &LoginArgs, session: &StoredSession<FileStore>) -> Result<()> {
    let store = session.store();
    if let Some(user_info) = &args.user_info {
        serde_json::from_str::<serde_json::Value>(user_info)
            .context("--user-info must be valid JSON")?;
        store
            .try_set(USER_INFO_KEY, user_info)
            .with_context(|| format!("failed to write {}", store.path().display()))?;
    }
    store
        .try_set(ACCESS_TOKEN_KEY, &args.token)
        .with_context(|| format!("failed to write {}", store.path().display()))?;
    tracing::info!("Stored session in {}", store.path().display());
    Ok(())
}

pub fn logout(session: &StoredSession<FileStore>) -> Result<()> {
    let store = session.store();
    for key in [ACCESS_TOKEN_KEY, USER_INFO_KEY] {
        store
            .try_remove(key)
            .with_context(|| format!("failed to update {}", store.path().display()))?;
    }
    tracing::info!("Cleared session in {}", store.path().display());
    Ok(())
}
