use std::sync::atomic::{AtomicU64, Ordering};

// -----------------------------------------------------------------------------
// ----- Counter ---------------------------------------------------------------

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

// -----------------------------------------------------------------------------
// ----- ConnectionId ----------------------------------------------------------

/// Identifies one physical client connection for the lifetime of the process.
/// Ids are handed out from a monotonic counter and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn next() -> Self {
        ConnectionId(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn#{}", self.0)
    }
}

// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
