use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LobbyStats {
    pub connections: u64,
    pub rooms_opened: u64,
    pub rooms_closed: u64,
    pub games_started: u64,
    pub games_finished: u64,
    pub rematches: u64,
    pub malformed_payloads: u64,
}

static CONNECTIONS: AtomicU64 = AtomicU64::new(0);
static ROOMS_OPENED: AtomicU64 = AtomicU64::new(0);
static ROOMS_CLOSED: AtomicU64 = AtomicU64::new(0);
static GAMES_STARTED: AtomicU64 = AtomicU64::new(0);
static GAMES_FINISHED: AtomicU64 = AtomicU64::new(0);
static REMATCHES: AtomicU64 = AtomicU64::new(0);
static MALFORMED_PAYLOADS: AtomicU64 = AtomicU64::new(0);

pub fn inc_connections() {
    CONNECTIONS.fetch_add(1, Ordering::Relaxed);
}

pub fn inc_rooms_opened() {
    ROOMS_OPENED.fetch_add(1, Ordering::Relaxed);
}

pub fn inc_rooms_closed() {
    ROOMS_CLOSED.fetch_add(1, Ordering::Relaxed);
}

pub fn inc_games_started() {
    GAMES_STARTED.fetch_add(1, Ordering::Relaxed);
}

pub fn inc_games_finished() {
    GAMES_FINISHED.fetch_add(1, Ordering::Relaxed);
}

pub fn inc_rematches() {
    REMATCHES.fetch_add(1, Ordering::Relaxed);
}

pub fn inc_malformed_payloads() {
    MALFORMED_PAYLOADS.fetch_add(1, Ordering::Relaxed);
}

pub fn snapshot() -> LobbyStats {
    LobbyStats {
        connections: CONNECTIONS.load(Ordering::Relaxed),
        rooms_opened: ROOMS_OPENED.load(Ordering::Relaxed),
        rooms_closed: ROOMS_CLOSED.load(Ordering::Relaxed),
        games_started: GAMES_STARTED.load(Ordering::Relaxed),
        games_finished: GAMES_FINISHED.load(Ordering::Relaxed),
        rematches: REMATCHES.load(Ordering::Relaxed),
        malformed_payloads: MALFORMED_PAYLOADS.load(Ordering::Relaxed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Counters are process-wide and other tests bump them concurrently, so
    // only monotonic growth is asserted.
    #[test]
    fn counters_only_grow() {
        let before = snapshot();
        inc_rooms_opened();
        inc_games_finished();
        inc_malformed_payloads();
        let after = snapshot();

        assert!(after.rooms_opened > before.rooms_opened);
        assert!(after.games_finished > before.games_finished);
        assert!(after.malformed_payloads > before.malformed_payloads);
        assert!(after.rooms_closed >= before.rooms_closed);
    }
}
