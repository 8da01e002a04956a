//! Session management.

use crate::client::Api;
use crate::error::Result;
use std::time::Duration;

const SESSIONS_PATH: &str = "/api/v0/sessions";
const CLEAR_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Manages operator sessions on the platform.
pub struct SessionManager<'a, A: Api + ?Sized> {
    api: &'a A,
}

impl<'a, A: Api + ?Sized> SessionManager<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self { api }
    }

    /// Log every other user out.
    pub fn clear_all(&self) -> Result<()> {
        log::info!("Clearing all active sessions");
        self.api.delete(SESSIONS_PATH, CLEAR_TIMEOUT)
    }
}
