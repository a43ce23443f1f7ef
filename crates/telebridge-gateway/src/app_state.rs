//! Shared application state for the telebridge gateway.
//!
//! One telemetry store per process, shared by every telemetry session and
//! every scrape. Reports from concurrent sessions interleave in that store
//! without a session tag.

use std::future::Future;
use std::sync::Arc;

use tokio_util::task::task_tracker::TrackedFuture;
use tokio_util::task::TaskTracker;

use telebridge_core::error::Result;
use telebridge_core::TelemetryStore;

use crate::config::GatewayConfig;
use crate::session::{SessionKind, SessionRegistry};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    store: Arc<TelemetryStore>,
    sessions: Arc<SessionRegistry>,
}

struct AppStateInner {
    cfg: GatewayConfig,
    // upgraded sockets outlive the HTTP connection axum's graceful shutdown waits on
    tasks: TaskTracker,
}

impl AppState {
    /// Build application state from a config that has not been validated yet.
    pub fn new(cfg: GatewayConfig) -> Result<Self> {
        cfg.validate()?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                cfg,
                tasks: TaskTracker::new(),
            }),
            store: Arc::new(TelemetryStore::new()),
            sessions: Arc::new(SessionRegistry::new()),
        })
    }

    pub fn cfg(&self) -> &GatewayConfig {
        &self.inner.cfg
    }

    pub fn store(&self) -> Arc<TelemetryStore> {
        Arc::clone(&self.store)
    }

    pub fn sessions(&self) -> Arc<SessionRegistry> {
        Arc::clone(&self.sessions)
    }

    /// Wrap a session body so [`wait_for_sessions`](Self::wait_for_sessions) waits for it.
    pub fn track<F: Future>(&self, session: F) -> TrackedFuture<F> {
        self.inner.tasks.track_future(session)
    }

    /// Cancel all sessions ahead of server shutdown.
    pub fn begin_shutdown(&self) {
        let telemetry = self.sessions.count(SessionKind::Telemetry);
        let echo = self.sessions.count(SessionKind::Echo);
        let live = self.sessions.cancel_all();
        tracing::info!(
            live_sessions = live,
            telemetry,
            echo,
            "cancelling sessions for shutdown"
        );
    }

    /// Resolve once every tracked session body has finished (and closed its socket).
    pub async fn wait_for_sessions(&self) {
        self.inner.tasks.close();
        self.inner.tasks.wait().await;
    }
}
