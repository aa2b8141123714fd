use serde_json::Value;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines},
    net::{
        TcpListener, TcpStream,
        tcp::{OwnedReadHalf, OwnedWriteHalf},
    },
    sync::oneshot,
    task::JoinHandle,
    time::timeout,
};

use fillmatch::{ChannelLayer, SessionCoordinator, net::DEFAULT_MAX_LINE_BYTES};

const EVENT_TIMEOUT: Duration = Duration::from_secs(2);

#[allow(dead_code)]
pub const QUIET_PERIOD: Duration = Duration::from_millis(150);

// -----------------------------------------------------------------------------
// ----- TestServer ------------------------------------------------------------

/// An in-process server on an ephemeral loopback port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub coordinator: Arc<SessionCoordinator<ChannelLayer>>,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<std::io::Result<()>>>,
}

impl TestServer {
    pub async fn start() -> TestServer {
        Self::start_with_line_limit(DEFAULT_MAX_LINE_BYTES).await
    }

    pub async fn start_with_line_limit(max_line_bytes: usize) -> TestServer {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local addr");

        let coordinator = Arc::new(SessionCoordinator::default());
        let (tx, rx) = oneshot::channel::<()>();

        let task = tokio::spawn(fillmatch::server::serve(
            listener,
            coordinator.clone(),
            max_line_bytes,
            async move {
                let _ = rx.await;
            },
        ));

        TestServer {
            addr,
            coordinator,
            shutdown: Some(tx),
            task: Some(task),
        }
    }

    #[allow(dead_code)]
    pub async fn connect(&self) -> Player {
        Player::connect(self.addr).await
    }

    #[allow(dead_code)]
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            let res = timeout(EVENT_TIMEOUT, task)
                .await
                .expect("accept loop did not stop");
            res.expect("accept loop panicked").expect("accept loop failed");
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

// -----------------------------------------------------------------------------
// ----- Player ----------------------------------------------------------------

/// A line-oriented test client.
pub struct Player {
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
}

#[allow(dead_code)]
impl Player {
    pub async fn connect(addr: SocketAddr) -> Player {
        let stream = TcpStream::connect(addr).await.expect("connect");
        let (reader, writer) = stream.into_split();

        Player {
            lines: BufReader::new(reader).lines(),
            writer,
        }
    }

    /// Connects and consumes the private `self_color` event.
    pub async fn seat(addr: SocketAddr) -> (Player, String) {
        let mut player = Player::connect(addr).await;
        let event = player.expect("self_color").await;
        let color = event["color"].as_str().expect("color").to_string();
        (player, color)
    }

    pub async fn send_raw(&mut self, raw: &str) {
        self.writer.write_all(raw.as_bytes()).await.expect("write");
        self.writer.write_all(b"\n").await.expect("write");
    }

    pub async fn send(&mut self, value: Value) {
        self.send_raw(&value.to_string()).await;
    }

    pub async fn play(&mut self, index: i64) {
        self.send(serde_json::json!({ "index": index })).await;
    }

    pub async fn vote_rematch(&mut self) {
        self.send(serde_json::json!({ "rematch": true })).await;
    }

    pub async fn next_event(&mut self) -> Value {
        let line = timeout(EVENT_TIMEOUT, self.lines.next_line())
            .await
            .expect("timed out waiting for an event")
            .expect("read")
            .expect("server closed the connection");

        serde_json::from_str(&line).expect("event is JSON")
    }

    pub async fn expect(&mut self, kind: &str) -> Value {
        let event = self.next_event().await;
        assert_eq!(event["type"], kind, "unexpected event: {event}");
        event
    }

    /// Asserts nothing arrives for a short while.
    pub async fn expect_silence(&mut self) {
        if let Ok(line) = timeout(QUIET_PERIOD, self.lines.next_line()).await {
            panic!("expected no event, got {line:?}");
        }
    }

    pub async fn close(self) {
        let Player { lines, mut writer } = self;
        let _ = writer.shutdown().await;
        drop(lines);
    }
}
