//! Keystroke coalescing for the search box.
//!
//! Each input restarts the quiet period; only the last input is released,
//! once the period elapses without further input. `settled` is cancel-safe
//! so it can sit in a `tokio::select!` next to the input source.

use std::time::Duration;

use tokio::time::{sleep_until, Instant};

#[derive(Debug)]
pub struct SearchDebouncer {
    quiet: Duration,
    pending: Option<(String, Instant)>,
}

impl SearchDebouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
        }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    pub fn input(&mut self, text: impl Into<String>) {
        self.pending = Some((text.into(), Instant::now() + self.quiet));
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Resolve with the latest input once the quiet period has passed.
    /// Never resolves while nothing is pending.
    pub async fn settled(&mut self) -> String {
        loop {
            match &self.pending {
                Some((_, deadline)) => sleep_until(*deadline).await,
                None => std::future::pending::<()>().await,
            }
            // Deadline may have moved if input arrived between polls
            if let Some((text, deadline)) = self.pending.take() {
                if Instant::now() >= deadline {
                    return text;
                }
                self.pending = Some((text, deadline));
            }
        }
    }
}
