use std::future::Future;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::frontend::PlayerConnection;
use crate::session::{Broadcaster, SessionCoordinator};

// -----------------------------------------------------------------------------
// ----- Server ----------------------------------------------------------------

/// Accept loop: one task per client until `shutdown` resolves.
pub async fn serve<B, F>(
    listener: TcpListener,
    coordinator: Arc<SessionCoordinator<B>>,
    max_line_bytes: usize,
    shutdown: F,
) -> std::io::Result<()>
where
    B: Broadcaster + 'static,
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("accept loop stopping");
                break;
            }

            accept_res = listener.accept() => {
                let (stream, peer) = match accept_res {
                    Ok(v) => v,
                    Err(e) => { error!("accept error: {e}"); continue; }
                };

                let _ = stream.set_nodelay(true);

                let coordinator = coordinator.clone();
                tokio::spawn(async move {
                    let conn = PlayerConnection::new(stream, peer, coordinator, max_line_bytes);
                    let id = conn.id();

                    if let Err(e) = conn.serve().await {
                        warn!("{id} ({peer}) error: {e}");
                    }
                });
            }
        }
    }

    Ok(())
}

// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
