use std::net::SocketAddr;
use std::sync::Arc;

use bytes::BytesMut;
use tokio::{
    io::AsyncWriteExt,
    net::TcpStream,
    select,
    sync::mpsc::{self, UnboundedReceiver},
};
use tracing::{info, warn};

use crate::analytics;
use crate::net::{Line, LineBuffer};
use crate::session::{Broadcaster, Session, SessionCoordinator};
use crate::shared_types::ConnectionId;
use crate::wire::ServerEvent;

// -----------------------------------------------------------------------------
// ----- Constants -------------------------------------------------------------

const SCRATCH_CAPACITY_HINT: usize = 4096;

const OVERSIZED_MESSAGE: &str = "Message too large";

// -----------------------------------------------------------------------------
// ----- PlayerConnection ------------------------------------------------------

/// One client socket. Reads newline-delimited JSON, feeds it to the
/// coordinator, and writes whatever the player's outbox receives.
#[derive(Debug)]
pub struct PlayerConnection<B: Broadcaster> {
    id: ConnectionId,
    peer: SocketAddr,
    coordinator: Arc<SessionCoordinator<B>>,

    inbox: LineBuffer,
    outbox: BytesMut,

    reader: tokio::net::tcp::OwnedReadHalf,
    writer: tokio::net::tcp::OwnedWriteHalf,
}

// -----------------------------------------------------------------------------
// ----- PlayerConnection: Static ----------------------------------------------

impl<B: Broadcaster> PlayerConnection<B> {
    pub fn new(
        stream: TcpStream,
        peer: SocketAddr,
        coordinator: Arc<SessionCoordinator<B>>,
        max_line_bytes: usize,
    ) -> Self {
        let (reader, writer) = stream.into_split();

        Self {
            id: ConnectionId::next(),
            peer,
            coordinator,
            inbox: LineBuffer::new(max_line_bytes),
            outbox: BytesMut::with_capacity(SCRATCH_CAPACITY_HINT),
            reader,
            writer,
        }
    }
}

// -----------------------------------------------------------------------------
// ----- PlayerConnection: Public ----------------------------------------------

impl<B: Broadcaster> PlayerConnection<B> {
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Runs until the peer goes away. The seat is released on every exit
    /// path, including I/O errors and task cancellation.
    pub async fn serve(mut self) -> std::io::Result<()> {
        let (tx, mut events) = mpsc::unbounded_channel();

        let session = self.coordinator.on_connect(self.id, tx);
        info!("{} connected from {}", self.id, self.peer);

        let seat = SeatGuard {
            coordinator: self.coordinator.clone(),
            session,
        };

        let result = self.pump(&seat.session, &mut events).await;

        info!("{} disconnected", self.id);
        drop(seat);

        result
    }
}

// -----------------------------------------------------------------------------
// ----- PlayerConnection: Private ---------------------------------------------

impl<B: Broadcaster> PlayerConnection<B> {
    async fn pump(
        &mut self,
        session: &Session,
        events: &mut UnboundedReceiver<ServerEvent>,
    ) -> std::io::Result<()> {
        loop {
            select! {

                // -- Client messages --
                read_res = self.inbox.fill_from(&mut self.reader) => {
                    let n = read_res?;
                    if n == 0 { break; }

                    while let Some(line) = self.inbox.next_line() {
                        self.process_line(session, line);
                    }
                }

                // -- Private and room events --
                Some(event) = events.recv() => {
                    self.queue_event(&event);
                    while let Ok(event) = events.try_recv() {
                        self.queue_event(&event);
                    }

                    self.flush_outbox().await?;
                }
            }
        }

        Ok(())
    }

    fn process_line(&self, session: &Session, line: Line) {
        match line {
            Line::Payload(payload) if payload.trim_ascii().is_empty() => {}
            Line::Payload(payload) => self.coordinator.on_message(session, &payload),
            Line::Oversized => {
                analytics::inc_malformed_payloads();
                session.send(ServerEvent::error(OVERSIZED_MESSAGE));
            }
        }
    }

    fn queue_event(&mut self, event: &ServerEvent) {
        match event.to_line() {
            Ok(line) => self.outbox.extend_from_slice(&line),
            Err(err) => warn!("{}: cannot encode {} event: {err}", self.id, event.kind()),
        }
    }

    async fn flush_outbox(&mut self) -> std::io::Result<()> {
        if !self.outbox.is_empty() {
            self.writer.write_all_buf(&mut self.outbox).await?;
        }

        Ok(())
    }
}

// -----------------------------------------------------------------------------
// ----- SeatGuard -------------------------------------------------------------

/// Releases the player's room seat when dropped.
#[derive(Debug)]
struct SeatGuard<B: Broadcaster> {
    coordinator: Arc<SessionCoordinator<B>>,
    session: Session,
}

impl<B: Broadcaster> Drop for SeatGuard<B> {
    fn drop(&mut self) {
        self.coordinator.leave(&self.session);
    }
}

// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
