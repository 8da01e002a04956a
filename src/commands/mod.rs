//! Command implementations

pub mod apply_changes;
pub mod errands;
pub mod manifests;
pub mod reports;
pub mod tiles;
pub mod toggle_errands;

use crate::config::{self, FileConfig};
use crate::{Context, ui};
use anyhow::{Context as _, Result};
use opsman::{Client, SessionManager};

/// Build an authenticated client, logging other sessions out if asked
pub fn connect(ctx: &Context) -> Result<Client> {
    let file = FileConfig::load(ctx.connection.config.as_deref())?;
    let client = Client::new(config::resolve(&ctx.connection, &file)?);
    log::debug!("Target: {}", client.target());

    if ctx.connection.force_logout {
        if !ctx.quiet {
            ui::info("Logging out all active opsman sessions.");
        }
        SessionManager::new(&client)
            .clear_all()
            .context("Failed to clear sessions")?;
    }

    Ok(client)
}
