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

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::routing::get;
use ojx_error::Error;
use ojx_state::AppState;
use ojx_util::{JsonResult, now};
use serde::Serialize;

type Result<T> = std::result::Result<T, Error>;

const ERROR_CATEGORY: &str = "common_router";

/// Ping the server to check if it is running
async fn ping(State(state): State<&'static AppState>) -> Result<&'static str> {
    if !state.is_running() {
        return Err(Error::new("Server is not running")
            .with_category(ERROR_CATEGORY)
            .with_status(503));
    }
    Ok("pong")
}

#[derive(Debug, Clone, Serialize)]
struct RootResp {
    status: &'static str,
    message: &'static str,
}

async fn root() -> Json<RootResp> {
    Json(RootResp {
        status: "ok",
        message: "Service is running",
    })
}

#[derive(Debug, Clone, Serialize)]
struct HealthResp {
    status: &'static str,
    timestamp: String,
}

async fn health_check() -> JsonResult<HealthResp> {
    Ok(Json(HealthResp {
        status: "ok",
        timestamp: now(),
    }))
}

pub struct CommonRouterParams {
    pub state: &'static AppState,
}

pub fn new_common_router(params: CommonRouterParams) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/ping", get(ping).with_state(params.state))
}
