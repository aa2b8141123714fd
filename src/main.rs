use std::sync::Arc;

use tokio::net::{TcpListener, TcpSocket};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

use fillmatch::{ChannelLayer, Config, SessionCoordinator, admin, server};

// -----------------------------------------------------------------------------
// ----- Constants -------------------------------------------------------------

const APP_NAME: &str = "🟥🟦 fillmatch";

// -----------------------------------------------------------------------------
// ----- Main ------------------------------------------------------------------

#[tokio::main]
async fn main() -> std::io::Result<()> {
    setup().await;
    run_forever().await
}

// -----------------------------------------------------------------------------
// ----- Setup -----------------------------------------------------------------

async fn setup() {
    // This has to be the first thing we do, because it initializes the config
    Config::init().await;

    init_tracing();
}

fn init_tracing() {
    let config = Config::snapshot();
    let filter = EnvFilter::try_new(config.log_level.as_str())
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}

// -----------------------------------------------------------------------------
// ----- Run -------------------------------------------------------------------

async fn run_forever() -> std::io::Result<()> {
    let config = Config::snapshot();
    let settings = &config.settings;

    let socket = if config.listen_addr.is_ipv4() {
        TcpSocket::new_v4()?
    } else {
        TcpSocket::new_v6()?
    };

    socket.set_reuseaddr(true)?;
    socket.bind(config.listen_addr)?;

    let listener: TcpListener = socket.listen(settings.server.listen_backlog)?;

    info!("{} listening on {}", APP_NAME, config.listen_addr);

    let coordinator = Arc::new(SessionCoordinator::new(
        ChannelLayer::new(),
        settings.lobby.room_code_length,
    ));

    let shutdown = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("cannot listen for shutdown signal: {e}");
            std::future::pending::<()>().await;
        }
    };

    server::serve(
        listener,
        coordinator,
        settings.server.max_line_bytes,
        shutdown,
    )
    .await?;

    info!("{} shutting down", APP_NAME);
    info!("{}", admin::format_lobby_stats(admin::lobby_stats()));

    Ok(())
}

// -----------------------------------------------------------------------------
// -----------------------------------------------------------------------------
