use std::sync::Arc;

use emergency_video_server::config::{self, AppState, Config};
use emergency_video_server::logger;
use emergency_video_server::server;
use emergency_video_server::storage::VideoStore;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Optional first argument: config file path without extension
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config::DEFAULT_CONFIG_PATH.to_string());
    let cfg = Config::load_from(&config_path)?;
    logger::init(&cfg)?;

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    // The storage directory must exist before the first request is served
    let store = VideoStore::open(&cfg.storage.dir).await?;
    let addr = cfg.socket_addr()?;
    let listener = server::create_listener(addr)?;

    logger::log_server_start(&addr, &cfg, store.root());
    let state = Arc::new(AppState::new(cfg, store));

    server::run(listener, state, server::shutdown_signal()).await;
    Ok(())
}
