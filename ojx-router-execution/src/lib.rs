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

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use ojx_judge::{ExecutionDispatcher, RunParams};
use ojx_session::Principal;
use ojx_util::{JsonParams, JsonResult};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use validator::Validate;

// request-level defaults of the run endpoint
const MAX_CPU_TIME: i64 = 5000;
const MAX_MEMORY_MB: i64 = 512;

#[derive(Deserialize, Validate, Debug)]
struct RunRequest {
    // language name: Python3, C, C++, JavaScript, Golang
    #[validate(length(min = 1))]
    language: String,
    // source code to execute
    code: String,
    // stdin for the program
    #[serde(default)]
    input: String,
}

async fn run_code(
    State(dispatcher): State<&'static ExecutionDispatcher>,
    principal: Principal,
    JsonParams(params): JsonParams<RunRequest>,
) -> JsonResult<Value> {
    debug!(
        category = "execution",
        user_id = principal.user_id,
        language = params.language,
        "run requested"
    );
    let result = dispatcher
        .run(RunParams {
            language: params.language,
            src: params.code,
            stdin: params.input,
            max_cpu_time: MAX_CPU_TIME,
            max_memory_mb: MAX_MEMORY_MB,
        })
        .await?;
    Ok(Json(result))
}

/// Mounted behind the authenticate layer.
pub fn new_execution_router(dispatcher: &'static ExecutionDispatcher) -> Router {
    Router::new().route("/run", post(run_code).with_state(dispatcher))
}
