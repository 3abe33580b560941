//! Scoped ownership of a [`BrowserSession`].
//!
//! [`SessionGuard::close`] is the normal exit. If the guard is dropped
//! instead (an error path that skipped `close`, or the owning future being
//! cancelled), the close is scheduled on [`teardown_tracker`] so the browser
//! is still released. Binaries drain the tracker with [`drain_teardowns`]
//! before exiting.
use super::BrowserSession;
use anyhow::{anyhow, Result};
use std::sync::OnceLock;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio_util::task::TaskTracker;
use tracing::{debug, warn};

static TEARDOWNS: OnceLock<TaskTracker> = OnceLock::new();

/// Process-wide tracker of background session closes.
pub fn teardown_tracker() -> &'static TaskTracker {
    TEARDOWNS.get_or_init(TaskTracker::new)
}

/// Wait up to `timeout` for scheduled closes. Returns `false` on timeout.
pub async fn drain_teardowns(timeout: Duration) -> bool {
    let tracker = teardown_tracker();
    tracker.close();
    let drained = tokio::time::timeout(timeout, tracker.wait()).await.is_ok();
    tracker.reopen();
    drained
}

pub struct SessionGuard {
    session: Option<Box<dyn BrowserSession>>,
}

impl SessionGuard {
    pub fn new(session: Box<dyn BrowserSession>) -> Self {
        Self {
            session: Some(session),
        }
    }

    pub fn session(&mut self) -> Result<&mut (dyn BrowserSession + 'static)> {
        match self.session.as_deref_mut() {
            Some(session) => Ok(session),
            None => Err(anyhow!("browser session already closed")),
        }
    }

    /// Close the session now and report the outcome.
    pub async fn close(mut self) -> Result<()> {
        match self.session.take() {
            Some(session) => session.close().await,
            None => Ok(()),
        }
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        match Handle::try_current() {
            Ok(handle) => {
                debug!(target: "browser.session", "closing abandoned session in background");
                teardown_tracker().spawn_on(
                    async move {
                        if let Err(e) = session.close().await {
                            warn!(target: "browser.session", error = %e, "background close failed");
                        }
                    },
                    &handle,
                );
            }
            Err(_) => {
                warn!(target: "browser.session", "no runtime to close abandoned browser session");
            }
        }
    }
}
