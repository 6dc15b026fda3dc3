//! Session scope
//!
//! Opens every tool session of an investigation or none of them. Sessions
//! are opened in order, each within its own startup timeout, and released
//! in reverse order. A failed acquisition releases whatever was already
//! opened before returning.

use crate::ports::progress::SwarmProgressNotifier;
use sherlock_domain::{SessionError, ToolCatalog, ToolSession};
use std::sync::Arc;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Why a scope could not be acquired
#[derive(Error, Debug)]
pub enum AcquisitionError {
    #[error("Failed to open tool session '{session}': {source}")]
    Open {
        session: String,
        #[source]
        source: SessionError,
    },

    #[error("Investigation deadline reached while opening tool session '{session}'")]
    DeadlineExceeded { session: String },
}

impl AcquisitionError {
    pub fn session(&self) -> &str {
        match self {
            AcquisitionError::Open { session, .. } | AcquisitionError::DeadlineExceeded { session } => {
                session
            }
        }
    }
}

/// An open session and the catalog it advertised
#[derive(Clone)]
pub struct AcquiredSession {
    pub session: Arc<dyn ToolSession>,
    pub catalog: ToolCatalog,
}

/// Every session of one investigation, open
pub struct SessionScope {
    acquired: Vec<AcquiredSession>,
    released: bool,
}

impl SessionScope {
    /// Open `sessions` in order.
    ///
    /// `deadline` caps every individual startup timeout.
    pub async fn acquire(
        sessions: Vec<Arc<dyn ToolSession>>,
        deadline: Option<Instant>,
        progress: &dyn SwarmProgressNotifier,
    ) -> Result<Self, AcquisitionError> {
        let mut scope = SessionScope {
            acquired: Vec::with_capacity(sessions.len()),
            released: false,
        };

        for session in sessions {
            match open_one(session.as_ref(), deadline).await {
                Ok(catalog) => {
                    info!(
                        session = session.id(),
                        "Opened {} ({} operations)",
                        session.display_name(),
                        catalog.len()
                    );
                    progress.on_session_opened(session.id(), catalog.len());
                    scope.acquired.push(AcquiredSession { session, catalog });
                }
                Err(err) => {
                    warn!("{}", err);
                    // May hold a half-started provider after a timeout or an
                    // empty catalog; close is a no-op otherwise.
                    if let Err(e) = session.close().await {
                        debug!(session = session.id(), "Close after failed open: {}", e);
                    }
                    scope.release_all().await;
                    return Err(err);
                }
            }
        }

        Ok(scope)
    }

    pub fn sessions(&self) -> &[AcquiredSession] {
        &self.acquired
    }

    pub fn len(&self) -> usize {
        self.acquired.len()
    }

    pub fn is_empty(&self) -> bool {
        self.acquired.is_empty()
    }

    /// Close every session in reverse acquisition order.
    ///
    /// Close failures are logged and returned; they never stop the remaining
    /// sessions from being closed.
    pub async fn release(mut self) -> Vec<(String, SessionError)> {
        self.release_all().await
    }

    async fn release_all(&mut self) -> Vec<(String, SessionError)> {
        let mut failures = Vec::new();
        for acquired in self.acquired.iter().rev() {
            let session = &acquired.session;
            match session.close().await {
                Ok(()) => debug!(session = session.id(), "Closed"),
                Err(e) => {
                    warn!(session = session.id(), "Failed to close session: {}", e);
                    failures.push((session.id().to_string(), e));
                }
            }
        }
        self.released = true;
        failures
    }
}

impl Drop for SessionScope {
    fn drop(&mut self) {
        if !self.released && !self.acquired.is_empty() {
            warn!(
                "{} tool sessions dropped without release; relying on process cleanup",
                self.acquired.len()
            );
        }
    }
}

async fn open_one(
    session: &dyn ToolSession,
    deadline: Option<Instant>,
) -> Result<ToolCatalog, AcquisitionError> {
    let startup = session.startup_timeout();
    let startup_deadline = Instant::now() + startup;
    let (limit, capped) = match deadline {
        Some(d) if d < startup_deadline => (d, true),
        _ => (startup_deadline, false),
    };

    let open_error = |source| AcquisitionError::Open {
        session: session.id().to_string(),
        source,
    };

    match tokio::time::timeout_at(limit, session.open()).await {
        Ok(Ok(catalog)) if catalog.is_empty() => Err(open_error(SessionError::EmptyCatalog)),
        Ok(Ok(catalog)) => Ok(catalog),
        Ok(Err(e)) => Err(open_error(e)),
        Err(_) if capped => Err(AcquisitionError::DeadlineExceeded {
            session: session.id().to_string(),
        }),
        Err(_) => Err(open_error(SessionError::StartupTimeout(startup))),
    }
}
