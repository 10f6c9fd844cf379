/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 24/07/26
******************************************************************************/

//! The HTTP dispatcher.
//!
//! One listener accepts connections; each request runs on an independent
//! worker with no ordering guarantee. All state funnels through [`AppState`]:
//! the shared directory service (and, behind it, the single manager session)
//! plus the security settings the auth middleware reads.

pub mod auth;
pub mod routes;

use crate::config::{Config, SecurityConfig};
use crate::service::DirectoryService;
use actix_web::middleware::{DefaultHeaders, from_fn};
use actix_web::{App, HttpServer, web};
use std::sync::Arc;
use tracing::{info, warn};

/// Shared per-process state handed to every worker
pub struct AppState {
    /// The directory facade
    pub service: Arc<dyn DirectoryService>,
    /// Authentication settings
    pub security: SecurityConfig,
}

fn cors_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add(("Access-Control-Allow-Origin", "*"))
        .add(("Access-Control-Allow-Methods", "GET, POST, PUT, DELETE, OPTIONS"))
        .add((
            "Access-Control-Allow-Headers",
            "Content-Type, Authorization, X-API-Key",
        ))
}

/// Runs the dispatcher until shutdown, then tears down the manager session.
///
/// Stopping accepts no new connections but lets in-flight workers finish;
/// the backend session is dropped only after the listener fully stops.
pub async fn run(config: &Config, service: Arc<dyn DirectoryService>) -> std::io::Result<()> {
    let state = web::Data::new(AppState {
        service: service.clone(),
        security: config.security.clone(),
    });
    let host = config.http.host.clone();
    let port = config.http.port;

    info!("Dispatcher listening on http://{host}:{port}");
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(routes::configure)
            .default_service(web::route().to(routes::endpoint_not_found))
            .wrap(from_fn(auth::authenticate))
            .wrap(cors_headers())
    })
    .bind((host.as_str(), port))?
    .run()
    .await?;

    if let Err(e) = service.disconnect().await {
        warn!("Manager session teardown failed: {e}");
    }
    info!("Dispatcher stopped");
    Ok(())
}
