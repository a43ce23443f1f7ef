use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use tokio_util::sync::CancellationToken;

/// Which endpoint a session was upgraded on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKind {
    Telemetry,
    Echo,
}

impl SessionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionKind::Telemetry => "telemetry",
            SessionKind::Echo => "echo",
        }
    }
}

/// Session registry:
/// - `session_id -> kind`
/// - every session token is a child of one root token, so shutdown is a single cancel
#[derive(Default)]
pub struct SessionRegistry {
    sessions: DashMap<u64, SessionKind>,
    root: CancellationToken,
    seq: AtomicU64,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
            root: CancellationToken::new(),
            seq: AtomicU64::new(1),
        }
    }

    /// Register a session. It stays registered until the guard is dropped.
    ///
    /// After [`cancel_all`](Self::cancel_all) new sessions start out cancelled.
    pub fn open(self: &Arc<Self>, kind: SessionKind) -> SessionGuard {
        let id = self.seq.fetch_add(1, Ordering::Relaxed);
        let cancel = self.root.child_token();
        self.sessions.insert(id, kind);

        SessionGuard {
            id,
            kind,
            cancel,
            registry: Arc::clone(self),
        }
    }

    /// Cancel every live and future session. Returns how many were live.
    pub fn cancel_all(&self) -> usize {
        self.root.cancel();
        self.sessions.len()
    }

    pub fn count(&self, kind: SessionKind) -> usize {
        self.sessions.iter().filter(|e| *e.value() == kind).count()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn remove(&self, id: u64) {
        self.sessions.remove(&id);
    }
}

/// Registration handle owned by a session task; deregisters on drop.
pub struct SessionGuard {
    id: u64,
    kind: SessionKind,
    cancel: CancellationToken,
    registry: Arc<SessionRegistry>,
}

impl SessionGuard {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn kind(&self) -> SessionKind {
        self.kind
    }

    /// Token the session loop races against.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.registry.remove(self.id);
    }
}
