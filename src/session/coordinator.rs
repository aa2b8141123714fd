use tracing::{debug, info, warn};

use crate::analytics;
use crate::errors::SessionError;
use crate::lobby::{Acquired, MatchmakingPool, ROOM_CAPACITY, RoomHandle, RoomRegistry};
use crate::shared_types::{ConnectionId, DEFAULT_ROOM_CODE_LENGTH};
use crate::wire::{ClientMessage, ServerEvent};

use super::broadcast::{Broadcaster, ChannelLayer, Outbox};
use super::session::Session;

// -----------------------------------------------------------------------------
// ----- SessionCoordinator ----------------------------------------------------

/// Turns connection lifecycle events into pool, registry and room
/// transitions, and fans the resulting events out.
///
/// Lock order is room, then pool, then registry, then broadcaster groups.
/// The pool lock is a leaf with respect to rooms: `leave` touches the pool
/// under a room lock, but no pool operation ever waits on a room lock, and
/// the pool lock is released before any room lock is taken. None of the
/// handlers suspend, so a connection task dropped mid-call cannot leave a
/// transition half applied.
#[derive(Debug)]
pub struct SessionCoordinator<B: Broadcaster = ChannelLayer> {
    pool: MatchmakingPool,
    registry: RoomRegistry,
    channels: B,
}

impl<B: Broadcaster> SessionCoordinator<B> {
    pub fn new(channels: B, room_code_length: usize) -> Self {
        Self {
            pool: MatchmakingPool::new(),
            registry: RoomRegistry::new(room_code_length),
            channels,
        }
    }
}

impl Default for SessionCoordinator<ChannelLayer> {
    fn default() -> Self {
        Self::new(ChannelLayer::new(), DEFAULT_ROOM_CODE_LENGTH)
    }
}

// -----------------------------------------------------------------------------
// ----- SessionCoordinator: Accessors -----------------------------------------

impl<B: Broadcaster> SessionCoordinator<B> {
    pub fn pool(&self) -> &MatchmakingPool {
        &self.pool
    }

    pub fn registry(&self) -> &RoomRegistry {
        &self.registry
    }

    pub fn channels(&self) -> &B {
        &self.channels
    }
}

// -----------------------------------------------------------------------------
// ----- SessionCoordinator: Lifecycle -----------------------------------------

impl<B: Broadcaster> SessionCoordinator<B> {
    /// Seat `conn` in the oldest waiting room, or a new one.
    pub fn on_connect(&self, conn: ConnectionId, outbox: Outbox) -> Session {
        analytics::inc_connections();

        loop {
            let acquired = self.pool.acquire_room(&self.registry);
            if matches!(acquired, Acquired::Minted(_)) {
                analytics::inc_rooms_opened();
            }
            let code = acquired.into_code();

            // The last occupant may have left between pop and lock.
            let Some(room) = self.registry.get(&code) else {
                debug!("room {code} closed before {conn} could join; retrying");
                continue;
            };

            let mut state = room.lock();
            let joined = match state.join(conn) {
                Ok(joined) => joined,
                Err(err) => {
                    debug!("{conn} could not join: {err}; retrying");
                    continue;
                }
            };

            self.channels.group_add(&code, conn, outbox.clone());

            let session = Session::new(conn, code.clone(), joined.color, outbox);
            session.send(ServerEvent::SelfColor {
                color: joined.color,
            });

            info!(
                "{conn} joined room {code} as {} ({}/{ROOM_CAPACITY})",
                joined.color, joined.occupants
            );

            if joined.started {
                analytics::inc_games_started();
                self.channels.group_send(&code, &ServerEvent::GameStart);
                info!("room {code} is full; game started");
            }

            return session;
        }
    }

    /// Always runs the full leave transition, whatever state the room is in.
    pub fn on_disconnect(&self, session: Session) {
        self.leave(&session);
    }

    pub(crate) fn leave(&self, session: &Session) {
        let conn = session.conn();
        let code = session.room().clone();

        let Some(room) = self.registry.get(&code) else {
            warn!("{conn} disconnected from unknown room {code}");
            self.channels.group_discard(&code, conn);
            return;
        };

        let mut state = room.lock();
        let left = match state.leave(conn) {
            Ok(left) => left,
            Err(err) => {
                warn!("{conn} disconnect ignored: {err}");
                self.channels.group_discard(&code, conn);
                return;
            }
        };

        self.channels.group_discard(&code, conn);

        if left.remaining == 0 {
            self.pool.remove(&code);
            self.registry.remove(&code, &room);
            analytics::inc_rooms_closed();
            info!("{conn} ({}) left; room {code} closed", left.color);
            return;
        }

        self.pool.release_to_half_open(&code);
        self.channels.group_send(&code, &ServerEvent::room_reopened());
        info!("{conn} ({}) left; room {code} reopened", left.color);
    }

    /// A malformed payload produces exactly one private `error` event and
    /// touches nothing else. A move and a vote in one payload are applied
    /// independently, move first.
    pub fn on_message(&self, session: &Session, payload: &[u8]) {
        let message = match ClientMessage::parse(payload) {
            Ok(message) => message,
            Err(err) => {
                analytics::inc_malformed_payloads();
                self.report(session, &err);
                return;
            }
        };

        if message.is_noop() {
            debug!("{}: empty message ignored", session.conn());
            return;
        }

        if let Some(index) = message.index {
            if let Err(err) = self.play(session, index) {
                self.report(session, &err);
            }
        }

        if message.wants_rematch() {
            if let Err(err) = self.vote_rematch(session) {
                self.report(session, &err);
            }
        }
    }
}

// -----------------------------------------------------------------------------
// ----- SessionCoordinator: Private -------------------------------------------

impl<B: Broadcaster> SessionCoordinator<B> {
    fn room_of(&self, session: &Session) -> Result<RoomHandle, SessionError> {
        self.registry
            .get(session.room())
            .ok_or_else(|| SessionError::UnknownRoom {
                code: session.room().clone(),
            })
    }

    fn play(&self, session: &Session, index: i64) -> Result<(), SessionError> {
        let room = self.room_of(session)?;
        let mut state = room.lock();

        let played = state.play(session.conn(), index)?;

        self.channels.group_send(
            session.room(),
            &ServerEvent::Action {
                index: played.index,
                color: played.color,
            },
        );

        if let Some(result) = played.result {
            analytics::inc_games_finished();
            self.channels
                .group_send(session.room(), &ServerEvent::GameStop { result });
            info!("room {} finished: {result}", session.room());
        }

        Ok(())
    }

    fn vote_rematch(&self, session: &Session) -> Result<(), SessionError> {
        let room = self.room_of(session)?;
        let mut state = room.lock();

        let vote = state.vote_rematch(session.conn())?;

        self.channels.group_send(
            session.room(),
            &ServerEvent::RematchUpdate {
                requester: vote.requester,
                agreed: vote.agreed,
                total: vote.total,
            },
        );

        if vote.restarted {
            analytics::inc_rematches();
            analytics::inc_games_started();
            self.channels
                .group_send(session.room(), &ServerEvent::GameStart);
            info!("room {} agreed to a rematch", session.room());
        }

        Ok(())
    }

    fn report(&self, session: &Session, err: &SessionError) {
        match err.client_message() {
            Some(message) => {
                debug!("{}: {err}", session.conn());
                session.send(ServerEvent::error(message));
            }
            None => debug!("{}: ignored: {err}", session.conn()),
        }
    }
}

// -----------------------------------------------------------------------------
// ----- Tests -----------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::CELL_COUNT;
    use crate::shared_types::{Color, Outcome};
    use std::collections::HashMap;
    use std::sync::Barrier;
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    type Rx = UnboundedReceiver<ServerEvent>;

    fn connect(coordinator: &SessionCoordinator) -> (Session, Rx) {
        let (tx, rx) = mpsc::unbounded_channel();
        let session = coordinator.on_connect(ConnectionId::next(), tx);
        (session, rx)
    }

    fn drain(rx: &mut Rx) -> Vec<ServerEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    fn paired(coordinator: &SessionCoordinator) -> ((Session, Rx), (Session, Rx)) {
        let (a, mut rx_a) = connect(coordinator);
        let (b, mut rx_b) = connect(coordinator);
        drain(&mut rx_a);
        drain(&mut rx_b);
        ((a, rx_a), (b, rx_b))
    }

    #[test]
    fn two_connections_share_a_room_and_start() {
        let coordinator = SessionCoordinator::default();

        let (a, mut rx_a) = connect(&coordinator);
        assert_eq!(
            drain(&mut rx_a),
            vec![ServerEvent::SelfColor { color: Color::Red }]
        );
        assert!(coordinator.pool().contains(a.room()));

        let (b, mut rx_b) = connect(&coordinator);
        assert_eq!(a.room(), b.room());
        assert_eq!(drain(&mut rx_a), vec![ServerEvent::GameStart]);
        assert_eq!(
            drain(&mut rx_b),
            vec![
                ServerEvent::SelfColor { color: Color::Blue },
                ServerEvent::GameStart
            ]
        );
        assert!(coordinator.pool().is_empty());
        assert_eq!(coordinator.registry().len(), 1);
    }

    #[test]
    fn moves_are_broadcast_and_duplicates_dropped() {
        let coordinator = SessionCoordinator::default();
        let ((a, mut rx_a), (b, mut rx_b)) = paired(&coordinator);

        coordinator.on_message(&b, br#"{"index": 6}"#);
        let expected = ServerEvent::Action {
            index: 6,
            color: Color::Blue,
        };
        assert_eq!(drain(&mut rx_a), vec![expected.clone()]);
        assert_eq!(drain(&mut rx_b), vec![expected]);

        coordinator.on_message(&a, br#"{"index": 6}"#);
        assert!(drain(&mut rx_a).is_empty());
        assert!(drain(&mut rx_b).is_empty());

        let board = coordinator.registry().snapshot(a.room()).unwrap();
        assert_eq!(board.board().unwrap().get(6), Some(Color::Blue));
    }

    #[test]
    fn moves_before_pairing_are_ignored() {
        let coordinator = SessionCoordinator::default();
        let (a, mut rx_a) = connect(&coordinator);
        drain(&mut rx_a);

        coordinator.on_message(&a, br#"{"index": 0, "rematch": true}"#);
        assert!(drain(&mut rx_a).is_empty());
        let state = coordinator.registry().snapshot(a.room()).unwrap();
        assert!(state.board().is_none());
        assert_eq!(state.rematch_votes(), 0);
    }

    #[test]
    fn full_board_announces_the_winner() {
        let coordinator = SessionCoordinator::default();
        let ((a, mut rx_a), (b, _rx_b)) = paired(&coordinator);

        for i in 0..CELL_COUNT {
            let who = if i < 9 { &a } else { &b };
            coordinator.on_message(who, format!("{{\"index\": {i}}}").as_bytes());
        }

        let events = drain(&mut rx_a);
        assert_eq!(events.len(), CELL_COUNT + 1);
        assert_eq!(
            events.last(),
            Some(&ServerEvent::GameStop {
                result: Outcome::Red
            })
        );
    }

    #[test]
    fn rematch_restarts_once_both_agree() {
        let coordinator = SessionCoordinator::default();
        let ((a, mut rx_a), (b, mut rx_b)) = paired(&coordinator);
        coordinator.on_message(&a, br#"{"index": 0}"#);
        drain(&mut rx_a);
        drain(&mut rx_b);

        coordinator.on_message(&a, br#"{"rematch": true}"#);
        assert_eq!(
            drain(&mut rx_b),
            vec![ServerEvent::RematchUpdate {
                requester: Color::Red,
                agreed: 1,
                total: 2
            }]
        );
        let state = coordinator.registry().snapshot(a.room()).unwrap();
        assert!(!state.board().unwrap().is_empty());

        coordinator.on_message(&b, br#"{"rematch": true}"#);
        let events = drain(&mut rx_a);
        assert_eq!(
            events,
            vec![
                ServerEvent::RematchUpdate {
                    requester: Color::Red,
                    agreed: 1,
                    total: 2
                },
                ServerEvent::RematchUpdate {
                    requester: Color::Blue,
                    agreed: 2,
                    total: 2
                },
                ServerEvent::GameStart,
            ]
        );

        let state = coordinator.registry().snapshot(a.room()).unwrap();
        assert!(state.board().unwrap().is_empty());
        assert_eq!(state.rematch_votes(), 0);
    }

    #[test]
    fn malformed_payload_gets_one_private_error() {
        let coordinator = SessionCoordinator::default();
        let ((a, mut rx_a), (b, mut rx_b)) = paired(&coordinator);
        coordinator.on_message(&a, br#"{"index": 3}"#);
        drain(&mut rx_a);
        drain(&mut rx_b);

        let before = coordinator.registry().snapshot(a.room()).unwrap();
        coordinator.on_message(&b, b"{index: 4");
        let after = coordinator.registry().snapshot(a.room()).unwrap();

        assert_eq!(before, after);
        assert_eq!(
            drain(&mut rx_b),
            vec![ServerEvent::error("Invalid JSON format")]
        );
        assert!(drain(&mut rx_a).is_empty());
    }

    #[test]
    fn out_of_range_move_is_reported_privately() {
        let coordinator = SessionCoordinator::default();
        let ((a, mut rx_a), (_b, mut rx_b)) = paired(&coordinator);

        coordinator.on_message(&a, br#"{"index": 16}"#);
        assert!(matches!(
            drain(&mut rx_a).as_slice(),
            [ServerEvent::Error { .. }]
        ));
        assert!(drain(&mut rx_b).is_empty());
    }

    #[test]
    fn half_empty_room_is_reused_by_the_next_connection() {
        let coordinator = SessionCoordinator::default();
        let ((a, _rx_a), (b, mut rx_b)) = paired(&coordinator);
        let code = a.room().clone();

        coordinator.on_disconnect(a);
        assert_eq!(drain(&mut rx_b), vec![ServerEvent::room_reopened()]);
        assert!(coordinator.pool().contains(&code));

        let state = coordinator.registry().snapshot(&code).unwrap();
        assert_eq!(state.connection_count(), 1);
        assert!(state.board().is_none());

        let (c, mut rx_c) = connect(&coordinator);
        assert_eq!(c.room(), &code);
        assert_eq!(
            drain(&mut rx_c),
            vec![
                ServerEvent::SelfColor { color: Color::Red },
                ServerEvent::GameStart
            ]
        );
        assert_eq!(drain(&mut rx_b), vec![ServerEvent::GameStart]);
        assert_ne!(b.color(), c.color());
    }

    #[test]
    fn emptied_room_is_never_reused() {
        let coordinator = SessionCoordinator::default();
        let (a, _rx_a) = connect(&coordinator);
        let code = a.room().clone();

        coordinator.on_disconnect(a);
        assert!(coordinator.registry().is_empty());
        assert!(coordinator.pool().is_empty());
        assert_eq!(coordinator.channels().group_count(), 0);

        let (b, _rx_b) = connect(&coordinator);
        assert_ne!(b.room(), &code);
    }

    #[test]
    fn both_players_leaving_tears_the_room_down() {
        let coordinator = SessionCoordinator::default();
        let ((a, _rx_a), (b, _rx_b)) = paired(&coordinator);
        let code = a.room().clone();

        coordinator.on_disconnect(a);
        coordinator.on_disconnect(b);
        assert!(!coordinator.registry().contains(&code));
        assert!(!coordinator.pool().contains(&code));
    }

    #[test]
    fn concurrent_connects_fill_rooms_in_pairs() {
        const N: usize = 101;

        let coordinator = SessionCoordinator::default();
        let barrier = Barrier::new(N);

        let sessions: Vec<(Session, Rx)> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..N)
                .map(|_| {
                    scope.spawn(|| {
                        barrier.wait();
                        connect(&coordinator)
                    })
                })
                .collect();

            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(coordinator.registry().len(), N.div_ceil(2));
        assert_eq!(coordinator.pool().len(), 1);

        let mut by_room: HashMap<_, Vec<Color>> = HashMap::new();
        for (session, _) in &sessions {
            by_room
                .entry(session.room().clone())
                .or_default()
                .push(session.color());
        }

        assert_eq!(by_room.len(), N.div_ceil(2));
        for (code, colors) in &by_room {
            assert!(colors.len() <= ROOM_CAPACITY, "room {code} overfilled");
            if colors.len() == 2 {
                assert_ne!(colors[0], colors[1], "room {code} has duplicate colors");
            }
            let state = coordinator.registry().snapshot(code).unwrap();
            assert_eq!(state.connection_count(), colors.len());
        }
        assert_eq!(by_room.values().filter(|c| c.len() == 1).count(), 1);
    }

    #[test]
    fn empty_message_changes_nothing() {
        let coordinator = SessionCoordinator::default();
        let ((a, mut rx_a), (_b, mut rx_b)) = paired(&coordinator);

        let before = coordinator.registry().snapshot(a.room()).unwrap();
        coordinator.on_message(&a, br#"{"rematch": false}"#);
        coordinator.on_message(&a, b"{}");

        assert_eq!(coordinator.registry().snapshot(a.room()).unwrap(), before);
        assert!(drain(&mut rx_a).is_empty());
        assert!(drain(&mut rx_b).is_empty());
    }

    #[test]
    fn leaves_racing_joins_never_deadlock() {
        const N: usize = 64;

        let coordinator = SessionCoordinator::default();
        let barrier = Barrier::new(N);

        std::thread::scope(|scope| {
            for _ in 0..N {
                let coordinator = &coordinator;
                let barrier = &barrier;
                scope.spawn(move || {
                    barrier.wait();
                    for _ in 0..8 {
                        let (session, _rx) = connect(coordinator);
                        coordinator.on_message(&session, br#"{"index": 0}"#);
                        coordinator.on_disconnect(session);
                    }
                });
            }
        });

        assert!(coordinator.registry().is_empty());
        assert!(coordinator.pool().is_empty());
        assert_eq!(coordinator.channels().group_count(), 0);
    }

    #[test]
    fn concurrent_disconnects_leave_nothing_behind() {
        const PAIRS: usize = 32;

        let coordinator = SessionCoordinator::default();
        let sessions: Vec<Session> = (0..PAIRS * 2)
            .map(|_| connect(&coordinator).0)
            .collect();
        assert_eq!(coordinator.registry().len(), PAIRS);

        let barrier = Barrier::new(sessions.len());
        std::thread::scope(|scope| {
            for session in sessions {
                let coordinator = &coordinator;
                let barrier = &barrier;
                scope.spawn(move || {
                    barrier.wait();
                    coordinator.on_disconnect(session);
                });
            }
        });

        assert!(coordinator.registry().is_empty());
        assert!(coordinator.pool().is_empty());
        assert_eq!(coordinator.channels().group_count(), 0);
    }
}

// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
