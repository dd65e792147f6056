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
    #[snafu(display("SSO introspect url is not configured"))]
    NotConfigured,
    #[snafu(display("SSO service temporarily unavailable"))]
    Unavailable,
    #[snafu(display("Invalid SSO token"))]
    Unauthorized,
}

impl From<Error> for BaseError {
    fn from(val: Error) -> Self {
        let err = match &val {
            Error::NotConfigured => BaseError::new(&val)
                .with_sub_category("not_configured")
                .with_status(500)
                .with_exception(true),
            Error::Unavailable => BaseError::new(&val)
                .with_sub_category("unavailable")
                .with_status(503),
            Error::Unauthorized => BaseError::new(&val)
                .with_sub_category("unauthorized")
                .with_status(401),
        };
        err.with_category("sso")
    }
}

mod exchanger;

pub use exchanger::*;
