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
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use ojx_config::SessionConfig;
use ojx_error::Error;
use ojx_session::{Principal, SessionStore};
use ojx_sso::SsoExchanger;
use ojx_util::JsonParams;
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

type Result<T> = std::result::Result<T, Error>;

fn session_cookie(config: &SessionConfig, token: &str, max_age: time::Duration) -> Cookie<'static> {
    Cookie::build((config.cookie_name.clone(), token.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .max_age(max_age)
        .build()
}

#[derive(Deserialize, Validate, Debug)]
struct LoginParams {
    // the upstream sso token
    #[validate(length(min = 1))]
    token: String,
}

#[derive(Serialize)]
struct AuthResp {
    status: &'static str,
}

async fn login(
    State((exchanger, config)): State<(&'static SsoExchanger, &'static SessionConfig)>,
    jar: CookieJar,
    JsonParams(params): JsonParams<LoginParams>,
) -> Result<(CookieJar, Json<AuthResp>)> {
    info!(category = "auth", "login requested");
    let minted = exchanger.exchange(&params.token).await?;
    let max_age = time::Duration::seconds(minted.ttl.as_secs() as i64);
    let jar = jar.add(session_cookie(config, &minted.token, max_age));
    Ok((jar, Json(AuthResp { status: "ok" })))
}

async fn logout(
    State((store, config)): State<(&'static SessionStore, &'static SessionConfig)>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<AuthResp>)> {
    // a missing cookie is not an error on logout
    if let Some(cookie) = jar.get(&config.cookie_name) {
        let token = cookie.value().to_string();
        store.drop(&token).await?;
    }
    // zero max-age clears the cookie on the client
    let jar = jar.add(session_cookie(config, "", time::Duration::ZERO));
    Ok((jar, Json(AuthResp { status: "ok" })))
}

/// The authenticated principal echoed back, mounted behind the
/// authenticate layer.
async fn me(principal: Principal) -> Json<Principal> {
    Json(principal)
}

pub struct AuthRouterParams {
    pub exchanger: &'static SsoExchanger,
    pub store: &'static SessionStore,
    pub config: &'static SessionConfig,
}

/// Public part: token exchange in, token drop out.
pub fn new_auth_router(params: AuthRouterParams) -> Router {
    Router::new()
        .route(
            "/login",
            post(login).with_state((params.exchanger, params.config)),
        )
        .route(
            "/logout",
            post(logout).with_state((params.store, params.config)),
        )
}

/// Session-gated part, the caller mounts it behind the authenticate layer.
pub fn new_auth_me_router() -> Router {
    Router::new().route("/me", get(me))
}
