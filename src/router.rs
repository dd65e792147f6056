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

use crate::config::get_session_config;
use crate::service::{get_autosave_buffer, get_dispatcher, get_session_store, get_sso_exchanger};
use crate::sql::get_db_pool;
use crate::state::get_app_state;
use axum::Router;
use axum::middleware::from_fn_with_state;
use ojx_middleware::authenticate;
use ojx_router_auth::{AuthRouterParams, new_auth_me_router, new_auth_router};
use ojx_router_code::new_code_router;
use ojx_router_common::{CommonRouterParams, new_common_router};
use ojx_router_execution::new_execution_router;

pub fn new_router() -> Router {
    let store = get_session_store();
    let config = get_session_config();
    let auth_layer = from_fn_with_state((store, get_db_pool(), config), authenticate);

    let auth_router = new_auth_router(AuthRouterParams {
        exchanger: get_sso_exchanger(),
        store,
        config,
    })
    .merge(new_auth_me_router().route_layer(auth_layer.clone()));

    let execution_router =
        new_execution_router(get_dispatcher()).route_layer(auth_layer.clone());
    let code_router = new_code_router(get_autosave_buffer()).route_layer(auth_layer);

    Router::new()
        .merge(new_common_router(CommonRouterParams {
            state: get_app_state(),
        }))
        .nest("/api/auth", auth_router)
        .nest("/api/execution", execution_router)
        .nest("/api/code", code_router)
}
