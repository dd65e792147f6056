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

use axum::BoxError;
use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::http::{Method, Uri};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use tracing::error;

/// Service-wide error value. Every crate maps its own snafu enum into this
/// shape, and the HTTP layer renders it as a JSON body with the carried
/// status code.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Error {
    // error message
    pub message: String,
    // error category, usually the crate that produced it
    pub category: String,
    // error sub category, the operation that failed
    pub sub_category: String,
    // HTTP status code, 0 falls back to 400
    pub status: u16,
    // whether it is an unexpected exception (alerts care about these)
    pub exception: bool,
    // other extra information
    pub extra: Option<Vec<String>>,
}

impl Error {
    pub fn new(message: impl ToString) -> Self {
        Self {
            message: message.to_string(),
            ..Default::default()
        }
    }
    pub fn with_category(mut self, category: &str) -> Self {
        self.category = category.to_string();
        self
    }
    pub fn with_sub_category(mut self, sub_category: &str) -> Self {
        self.sub_category = sub_category.to_string();
        self
    }
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }
    pub fn with_exception(mut self, exception: bool) -> Self {
        self.exception = exception;
        self
    }
    pub fn add_extra(mut self, value: &str) -> Self {
        self.extra.get_or_insert_with(Vec::new).push(value.to_string());
        self
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "category: {}, sub category: {}, {}",
            self.category, self.sub_category, self.message
        )
    }
}

impl std::error::Error for Error {}

// Renders the error as a JSON response, the status code falls back to 400
// when unset or invalid.
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::BAD_REQUEST);
        // for error, set no-cache
        let mut res = Json(self).into_response();
        res.headers_mut()
            .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        (status, res).into_response()
    }
}

pub fn new_error(message: impl ToString) -> Error {
    Error::new(message)
}

// Global error handler for the application, attached via HandleErrorLayer.
// Timeouts surface as 408, everything else becomes a 500 exception.
pub async fn handle_error(
    method: Method, // HTTP method of the request
    uri: Uri,       // URI of the request
    err: BoxError,  // The error that occurred
) -> Error {
    error!("method:{}, uri:{}, error:{}", method, uri, err.to_string());

    if err.is::<tower::timeout::error::Elapsed>() {
        return Error::new("Request took too long")
            .with_category("timeout")
            .with_status(408);
    }
    Error::new(err.to_string())
        .with_category("exception")
        .with_status(500)
        .with_exception(true)
}

#[cfg(test)]
mod tests {
    use super::Error;
    use axum::response::IntoResponse;
    use pretty_assertions::assert_eq;

    #[test]
    fn builder() {
        let err = Error::new("judge server token is not configured")
            .with_category("judge")
            .with_sub_category("token")
            .with_status(500)
            .with_exception(true);
        assert_eq!("judge", err.category);
        assert_eq!("token", err.sub_category);
        assert_eq!(500, err.status);
        assert!(err.exception);
        assert_eq!(
            "category: judge, sub category: token, judge server token is not configured",
            err.to_string()
        );
    }

    #[test]
    fn default_status_renders_bad_request() {
        let res = Error::new("missing token").into_response();
        assert_eq!(400, res.status().as_u16());
        assert_eq!(
            "no-cache",
            res.headers().get("cache-control").unwrap().to_str().unwrap()
        );
    }
}
