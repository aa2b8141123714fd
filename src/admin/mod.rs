use crate::analytics::{self, LobbyStats};

pub fn lobby_stats() -> LobbyStats {
    analytics::snapshot()
}

pub fn format_lobby_stats(stats: LobbyStats) -> String {
    format!(
        "connections={} rooms_opened={} rooms_closed={} games_started={} games_finished={} rematches={} malformed_payloads={}",
        stats.connections,
        stats.rooms_opened,
        stats.rooms_closed,
        stats.games_started,
        stats.games_finished,
        stats.rematches,
        stats.malformed_payloads,
    )
}
