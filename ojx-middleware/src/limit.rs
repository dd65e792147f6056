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
use ojx_error::Error as BaseError;
use ojx_state::AppState;
use scopeguard::defer;
use tracing::debug;

type Result<T> = std::result::Result<T, BaseError>;

/// Caps the number of concurrently processed requests, zero disables the
/// cap. The counter is also what the access log reports.
pub async fn processing_limit(
    State(state): State<&'static AppState>,
    req: Request,
    next: Next,
) -> Result<Response> {
    debug!(category = "middleware", "--> processing_limit");
    defer!(debug!(category = "middleware", "<-- processing_limit"););

    let current = state.inc_processing() + 1;
    defer! {
        state.dec_processing();
    };
    let limit = state.get_processing_limit();
    if limit > 0 && current > limit {
        return Err(Error::TooManyRequests { limit, current }.into());
    }
    Ok(next.run(req).await)
}
