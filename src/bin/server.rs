/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 25/07/26
******************************************************************************/

//! Dispatcher binary: load configuration, open the group store, optionally
//! auto-connect to the manager backend, serve.

use mt5_bridge::config::Config;
use mt5_bridge::gateway::ManagerHttpGateway;
use mt5_bridge::server;
use mt5_bridge::service::{DirectoryService, ManagerDirectoryService};
use mt5_bridge::storage::GroupStore;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::new();

    let store = Arc::new(GroupStore::new(&config.storage));
    store.load();

    let gateway = Arc::new(ManagerHttpGateway::new());
    let service: Arc<dyn DirectoryService> = Arc::new(ManagerDirectoryService::new(
        gateway,
        config.discovery.clone(),
        store,
    ));

    if let Some(credentials) = &config.credentials {
        match service
            .connect(
                &credentials.server,
                credentials.login,
                &credentials.password,
            )
            .await
        {
            Ok(()) => info!("Auto-connected to {}", credentials.server),
            Err(e) => warn!("Auto-connect failed, waiting for /api/connect: {e}"),
        }
    }

    server::run(&config, service).await
}
