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

use axum::extract::{Path, State};
use axum::routing::post;
use axum::{Json, Router};
use ojx_autosave::{AutosaveBuffer, SlotKey};
use ojx_session::RegularUser;
use ojx_util::{JsonParams, JsonResult, QueryParams};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Deserialize, Validate, Debug)]
struct SaveCodeParams {
    #[validate(length(min = 1))]
    language: String,
    code: String,
}

#[derive(Serialize)]
struct SaveCodeResp {
    status: &'static str,
}

#[derive(Deserialize, Validate, Debug)]
struct GetCodeParams {
    #[validate(length(min = 1))]
    language: String,
}

#[derive(Serialize)]
struct CodeResp {
    code: String,
}

async fn save_code(
    State(buffer): State<&'static AutosaveBuffer>,
    Path(problem_id): Path<i32>,
    user: RegularUser,
    JsonParams(params): JsonParams<SaveCodeParams>,
) -> JsonResult<SaveCodeResp> {
    let slot = SlotKey {
        user_id: user.user_id,
        problem_id,
        language: params.language,
    };
    buffer.save(&slot, &params.code).await?;
    Ok(Json(SaveCodeResp { status: "ok" }))
}

async fn get_code(
    State(buffer): State<&'static AutosaveBuffer>,
    Path(problem_id): Path<i32>,
    user: RegularUser,
    QueryParams(params): QueryParams<GetCodeParams>,
) -> JsonResult<CodeResp> {
    let slot = SlotKey {
        user_id: user.user_id,
        problem_id,
        language: params.language,
    };
    let code = buffer.load(&slot).await?;
    Ok(Json(CodeResp { code }))
}

/// Mounted behind the authenticate layer.
pub fn new_code_router(buffer: &'static AutosaveBuffer) -> Router {
    Router::new().route(
        "/{problem_id}",
        post(save_code).get(get_code).with_state(buffer),
    )
}
