//! Tether serve command for running the bridge server
//!
//! The serve command runs the tether server which provides:
//! - SSE push channels, one per session
//! - Call routing by session id
//! - Health endpoint for monitoring

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use tether_core::SessionConfig;
use tether_redis::{RedisConfig, RedisSessionStore};
use tether_server::{AppState, ServerConfig, TetherServer};

use crate::endpoint::EchoEndpoint;

/// Default port for the tether server
pub const DEFAULT_PORT: u16 = 7447;
/// Default host for the tether server
pub const DEFAULT_HOST: &str = "127.0.0.1";
/// Default seconds a session survives in the store without calls
pub const DEFAULT_TTL_SECS: u64 = 3600;

/// Arguments for the serve command
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Host to bind to
    #[arg(long, default_value = DEFAULT_HOST)]
    pub host: String,

    /// Shared session store endpoint, redis:// or rediss:// (required)
    #[arg(long, env = "TETHER_REDIS_URL")]
    pub redis_url: String,

    /// Seconds a session stays in the store without calls
    #[arg(long, env = "TETHER_SESSION_TTL", default_value_t = DEFAULT_TTL_SECS)]
    pub ttl: u64,

    /// Seconds between SSE keep-alive comments
    #[arg(long, default_value_t = 15)]
    pub keep_alive: u64,
}

/// Run the serve command
pub async fn run(args: ServeArgs) -> Result<()> {
    let store = RedisSessionStore::connect(RedisConfig::new(&args.redis_url))
        .await
        .with_context(|| format!("cannot use session store at {}", args.redis_url))?;

    let session_config = SessionConfig::default().with_ttl(Duration::from_secs(args.ttl));
    let state = Arc::new(
        AppState::new(Arc::new(store), Arc::new(EchoEndpoint), session_config)
            .with_sse_keep_alive(Duration::from_secs(args.keep_alive)),
    );

    let config = ServerConfig::new(args.host, args.port);
    info!("Starting tether server on {}", config.addr());

    let server = TetherServer::with_state(config, state);
    server.run().await?;
    Ok(())
}
