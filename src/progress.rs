//! Progress indicators for omen CLI.

use indicatif::{ProgressBar, ProgressStyle};
use reconcile::Transport;
use std::time::Duration;

/// Create a spinner on stderr with a message
pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg} ({elapsed})") {
        pb.set_style(style);
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

/// Transport that shows a spinner while a request is in flight
pub struct SpinningTransport<'a, T: Transport + ?Sized> {
    inner: &'a T,
    message: &'a str,
    enabled: bool,
}

impl<'a, T: Transport + ?Sized> SpinningTransport<'a, T> {
    pub fn new(inner: &'a T, message: &'a str, enabled: bool) -> Self {
        Self {
            inner,
            message,
            enabled,
        }
    }
}

impl<T: Transport + ?Sized> Transport for SpinningTransport<'_, T> {
    fn post(&self, path: &str, body: &str, timeout: Duration) -> anyhow::Result<Vec<u8>> {
        if !self.enabled {
            return self.inner.post(path, body, timeout);
        }

        let pb = spinner(self.message);
        let result = self.inner.post(path, body, timeout);
        pb.finish_and_clear();
        result
    }
}
