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

use super::{AxumSnafu, Error, InvalidHeaderNameSnafu, InvalidHeaderValueSnafu};
use axum::body::{Body, Bytes, to_bytes};
use axum::http::header::{CACHE_CONTROL, HeaderMap, HeaderName, HeaderValue};
use snafu::ResultExt;

// Error bodies are small JSON documents, cap what gets buffered.
const MAX_BODY_SIZE: usize = 1024 * 1024;

/// Returns a header value as a string, empty when absent or not utf-8.
pub fn get_header_value(headers: &HeaderMap, name: &str) -> String {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// Sets a header only when it is not present yet.
/// Returns whether the header was inserted.
pub fn set_header_if_not_exist(
    headers: &mut HeaderMap,
    name: &str,
    value: &str,
) -> Result<bool, Error> {
    let name = name.parse::<HeaderName>().context(InvalidHeaderNameSnafu)?;
    if headers.contains_key(&name) {
        return Ok(false);
    }
    let value = value
        .parse::<HeaderValue>()
        .context(InvalidHeaderValueSnafu)?;
    headers.insert(name, value);
    Ok(true)
}

/// Sets `Cache-Control: no-cache` unless the handler already set one.
pub fn set_no_cache_if_not_exist(headers: &mut HeaderMap) {
    if headers.contains_key(CACHE_CONTROL) {
        return;
    }
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
}

/// Buffers a response body so middleware can inspect it.
pub async fn read_http_body(body: Body) -> Result<Bytes, Error> {
    to_bytes(body, MAX_BODY_SIZE).await.context(AxumSnafu)
}

/// Extracts a string field from a JSON document, empty when the document
/// does not parse or the field is absent.
pub fn json_get(data: &[u8], key: &str) -> String {
    serde_json::from_slice::<serde_json::Value>(data)
        .ok()
        .and_then(|value| value.get(key).cloned())
        .and_then(|value| value.as_str().map(|v| v.to_string()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn json_get_extracts_message() {
        let data = br#"{"message":"No available judge server","status":200}"#;
        assert_eq!("No available judge server", json_get(data, "message"));
        assert_eq!("", json_get(data, "status"));
        assert_eq!("", json_get(b"not json", "message"));
    }

    #[test]
    fn header_helpers() {
        let mut headers = HeaderMap::new();
        assert!(set_header_if_not_exist(&mut headers, "X-Trace-Id", "abc").unwrap());
        assert!(!set_header_if_not_exist(&mut headers, "X-Trace-Id", "def").unwrap());
        assert_eq!("abc", get_header_value(&headers, "X-Trace-Id"));

        set_no_cache_if_not_exist(&mut headers);
        assert_eq!("no-cache", get_header_value(&headers, "cache-control"));
    }
}
