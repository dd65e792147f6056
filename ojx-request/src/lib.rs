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

use ojx_error::Error as BaseError;
use snafu::Snafu;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("service: {service}, {message}"))]
    Common { service: String, message: String },
    #[snafu(display("service: {service}, build error {source}"))]
    Build {
        service: String,
        source: reqwest::Error,
    },
    #[snafu(display("service: {service}, uri error {source}"))]
    Uri {
        service: String,
        source: axum::http::uri::InvalidUri,
    },
    // transport level failure, the request never completed
    #[snafu(display("service: {service}, path: {path}, request error {source}"))]
    Request {
        service: String,
        path: String,
        source: reqwest::Error,
    },
    // the upstream answered with a non-success status
    #[snafu(display("service: {service}, path: {path}, status: {status}, {message}"))]
    Status {
        service: String,
        path: String,
        status: u16,
        message: String,
    },
    #[snafu(display("service: {service}, json error {source}"))]
    Serde {
        service: String,
        source: serde_json::Error,
    },
}

impl From<Error> for BaseError {
    fn from(val: Error) -> Self {
        let err = match &val {
            Error::Common { .. } => BaseError::new(&val).with_sub_category("common"),
            Error::Build { .. } => BaseError::new(&val)
                .with_sub_category("build")
                .with_exception(true),
            Error::Uri { .. } => BaseError::new(&val).with_sub_category("uri"),
            Error::Request { .. } => BaseError::new(&val)
                .with_sub_category("request")
                .with_exception(true),
            Error::Status { .. } => BaseError::new(&val).with_sub_category("status"),
            Error::Serde { .. } => BaseError::new(&val).with_sub_category("serde"),
        };
        err.with_category("request").with_status(500)
    }
}

mod request;

pub use request::*;
