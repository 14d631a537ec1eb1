mod cli;

use crate::cli::{StorageBackendArg, CLI};
use anyhow::Context;
use clap::Parser;
use scrip_core::Repository;
use scrip_gateway::app::App;
use scrip_gateway::state::AppState;
use scrip_minter::MinterService;
use scrip_storage::{InMemoryRepository, MySqlRepository};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = CLI::try_parse()?;

    info!(
        listen_addr = %config.listen_addr,
        storage_backend = %config.storage,
        "starting scrip gateway"
    );

    match config.storage {
        StorageBackendArg::InMemory => {
            run_server(config.listen_addr, InMemoryRepository::new()).await
        }
        StorageBackendArg::Mysql => {
            let mysql_dsn = config
                .mysql_dsn
                .context("mysql dsn is required when storage backend is mysql")?;
            let repository = MySqlRepository::connect(&mysql_dsn).await?;
            run_server(config.listen_addr, repository).await
        }
    }
}

async fn run_server<R: Repository>(listen_addr: SocketAddr, repository: R) -> anyhow::Result<()> {
    let minter = Arc::new(MinterService::new(repository));
    let app = App::router(AppState::new(minter));

    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    info!(listen_addr = %listener.local_addr()?, "gateway listening");
    axum::serve(listener, app).await?;

    Ok(())
}
