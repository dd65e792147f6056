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

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use scopeguard::defer;
use std::time::Instant;
use ojx_util::{set_header_if_not_exist, set_no_cache_if_not_exist, uuid};
use tracing::debug;

/// Request-scoped context created by the entry middleware and read by the
/// access-log middleware further in.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub trace_id: String,
    pub started_at: Instant,
}

/// Entry middleware: assigns a trace id, stores the request context and
/// takes care of response header hygiene (no-cache default, trace header).
pub async fn entry(mut req: Request, next: Next) -> Response {
    debug!(category = "middleware", "--> entry");
    // Ensure exit logging happens even if processing panics
    defer!(debug!(category = "middleware", "<-- entry"););

    let trace_id = uuid();
    req.extensions_mut().insert(RequestContext {
        trace_id: trace_id.clone(),
        started_at: Instant::now(),
    });

    let mut res = next.run(req).await;

    let headers = res.headers_mut();
    set_no_cache_if_not_exist(headers);
    let _ = set_header_if_not_exist(headers, "X-Trace-Id", &trace_id);

    res
}
