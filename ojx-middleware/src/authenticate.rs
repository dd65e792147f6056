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

use super::Error;
use axum::extract::Request;
use axum::extract::State;
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::extract::cookie::CookieJar;
use ojx_config::SessionConfig;
use ojx_error::Error as BaseError;
use ojx_model::User;
use ojx_session::SessionStore;
use scopeguard::defer;
use sqlx::PgPool;
use tracing::debug;

type Result<T> = std::result::Result<T, BaseError>;

/// The authorizer. Resolves the opaque token cookie against the session
/// store, re-validates that the principal's user still exists, re-arms the
/// sliding ttl and hands the principal to the handler through request
/// extensions. Privileged routers mount this as a route layer.
pub async fn authenticate(
    State((store, pool, config)): State<(
        &'static SessionStore,
        &'static PgPool,
        &'static SessionConfig,
    )>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response> {
    debug!(category = "middleware", "--> authenticate");
    defer!(debug!(category = "middleware", "<-- authenticate"););

    let Some(cookie) = jar.get(&config.cookie_name) else {
        return Err(Error::NoToken.into());
    };
    let token = cookie.value().to_string();
    let principal = store.get(&token).await?;
    if !User::exists_by_username(pool, &principal.username).await? {
        return Err(Error::UserNotFound.into());
    }
    // sliding session, each authenticated request re-arms the full ttl
    store.touch(&token, store.ttl()).await?;
    debug!(
        category = "session",
        user_id = principal.user_id,
        username = principal.username,
        admin_type = principal.admin_type,
        "auth processed"
    );
    req.extensions_mut().insert(principal);
    Ok(next.run(req).await)
}
