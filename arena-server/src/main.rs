use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use arena_server::{AnalysisGateway, ServerConfig, SessionStore, SystemClock};
use protocol::{Listener, TcpListener};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("arena_server=debug".parse()?))
        .init();

    info!("国际象棋对练服务端启动中...");

    let config = ServerConfig::load(std::env::args().nth(1).map(PathBuf::from))?;

    let pool = Arc::new(config.build_pool());
    let gateway = AnalysisGateway::new(pool, config.skills.clone(), config.think_times());
    let store = Arc::new(SessionStore::new(gateway, Arc::new(SystemClock)));

    let listener = TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("无法监听 {}", config.listen_addr))?;

    arena_server::serve(listener, store).await?;
    Ok(())
}
