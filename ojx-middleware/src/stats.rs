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

use super::{ClientIp, RequestContext};
use axum::body::Body;
use axum::extract::Request;
use axum::extract::State;
use axum::middleware::Next;
use axum::response::Response;
use ojx_error::Error;
use ojx_state::AppState;
use ojx_util::{get_header_value, json_get, read_http_body};
use scopeguard::defer;
use std::time::Instant;
use tracing::{debug, info};
use urlencoding::decode;

type Result<T> = std::result::Result<T, Error>;

/// Access-log middleware. Emits one structured line per request with trace
/// id, client ip, timing and the error message of 4xx/5xx JSON bodies.
pub async fn stats(
    State(state): State<&'static AppState>,
    ClientIp(ip): ClientIp,
    req: Request,
    next: Next,
) -> Result<Response> {
    debug!(category = "middleware", "--> stats");
    // Ensure exit logging happens even if processing panics
    defer!(debug!(category = "middleware", "<-- stats"););

    // Decode URI for logging (handles URL-encoded characters)
    let mut uri = req.uri().to_string();
    if let Ok(result) = decode(&uri) {
        uri = result.to_string()
    }

    let method = req.method().to_string();
    let x_forwarded_for = get_header_value(req.headers(), "X-Forwarded-For");
    let referrer = get_header_value(req.headers(), "Referer");
    let ctx = req.extensions().get::<RequestContext>().cloned();
    let (trace_id, started_at) = match ctx {
        Some(ctx) => (ctx.trace_id, ctx.started_at),
        None => ("".to_string(), Instant::now()),
    };

    let mut res = next.run(req).await;
    let status = res.status().as_u16();

    // Extract error message for 4xx/5xx responses
    let mut message = None;
    if status >= 400 {
        let (parts, body) = res.into_parts();
        let data = read_http_body(body).await?;
        message = Some(json_get(&data, "message"));
        res = Response::from_parts(parts, Body::from(data));
    }

    info!(
        category = "access",
        trace_id,
        ip = ip.to_string(),
        processing = state.get_processing(),
        x_forwarded_for,
        referrer,
        method,
        uri,
        status,
        elapsed = started_at.elapsed().as_millis() as u64,
        error = message,
    );

    Ok(res)
}
