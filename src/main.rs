// Copyright 2025 ojx developers.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::config::CODE_SAVE_DB;
use crate::router::new_router;
use crate::service::{get_autosave_buffer, get_fleet_registry};
use crate::state::get_app_state;
use axum::error_handling::HandleErrorLayer;
use axum::middleware::from_fn_with_state;
use ojx_autosave::ExpiryListener;
use ojx_error::handle_error;
use ojx_middleware::{entry, processing_limit, stats};
use ojx_model::JudgeServerStatus;
use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use tokio::signal;
use tokio::task::JoinHandle;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::compression::predicate::{NotForContentType, Predicate, SizeAbove};
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

mod cache;
mod config;
mod router;
mod service;
mod sql;
mod state;

async fn shutdown_signal(listener_task: JoinHandle<()>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("signal received, starting graceful shutdown");
    get_app_state().stop();
    // a flush in flight is dropped, the next save cycle re-arms it
    listener_task.abort();
}

fn init_logger() {
    let mut level = Level::INFO;
    if let Ok(log_level) = env::var("RUST_LOG") {
        if let Ok(value) = Level::from_str(log_level.as_str()) {
            level = value;
        }
    }

    let timer = tracing_subscriber::fmt::time::OffsetTime::local_rfc_3339().unwrap_or_else(|_| {
        tracing_subscriber::fmt::time::OffsetTime::new(
            time::UtcOffset::from_hms(0, 0, 0).expect("utc offset is valid"),
            time::format_description::well_known::Rfc3339,
        )
    });

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_timer(timer)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    // config is validated in the init functions
    let basic_config = config::must_get_basic_config();

    cache::init_caches().await?;
    sql::init_db_pool().await?;
    service::init_services()?;

    let fleet = get_fleet_registry().snapshot().await?;
    let normal = fleet
        .iter()
        .filter(|server| server.status() == JudgeServerStatus::Normal)
        .count();
    info!(workers = fleet.len(), normal, "judge fleet snapshot");

    // single listener instance per deployment
    let listener_task = tokio::spawn(async {
        let node = match cache::get_code_save_node() {
            Ok(node) => node,
            Err(e) => {
                error!(category = "autosave", error = %e, "listener not started");
                return;
            }
        };
        ExpiryListener::new(&node, CODE_SAVE_DB, get_autosave_buffer())
            .run()
            .await;
    });

    let predicate = SizeAbove::new(1024)
        .and(NotForContentType::GRPC)
        .and(NotForContentType::IMAGES)
        .and(NotForContentType::SSE);
    let state = get_app_state();
    let app = new_router().layer(
        // service build layer execute by add order
        ServiceBuilder::new()
            .layer(HandleErrorLayer::new(handle_error))
            .layer(CompressionLayer::new().compress_when(predicate))
            .timeout(basic_config.timeout)
            .layer(axum::middleware::from_fn(entry))
            .layer(from_fn_with_state(state, stats))
            .layer(from_fn_with_state(state, processing_limit)),
    );
    state.run();

    info!("listening on http://{}/", basic_config.listen);
    let listener = tokio::net::TcpListener::bind(basic_config.listen.clone()).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal(listener_task))
    .await?;
    sql::get_db_pool().close().await;
    Ok(())
}

#[tokio::main]
async fn start() {
    // only use expect in the startup path
    if let Err(e) = run().await {
        error!(category = "launch_app", message = e.to_string(),);
    }
}

fn main() {
    std::panic::set_hook(Box::new(|e| {
        error!(category = "panic", message = e.to_string(),);
        std::process::exit(1);
    }));
    init_logger();
    start();
}
