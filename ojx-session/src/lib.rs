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
    #[snafu(display("Not authenticated"))]
    NotAuthenticated,
    #[snafu(display("Invalid or expired token"))]
    SessionMissing,
    #[snafu(display("Corrupted session data"))]
    Corrupted { source: serde_json::Error },
    #[snafu(display("Permission Error"))]
    Forbidden,
}

impl From<Error> for BaseError {
    fn from(val: Error) -> Self {
        let err = match &val {
            Error::NotAuthenticated => BaseError::new(&val)
                .with_sub_category("not_authenticated")
                .with_status(401),
            Error::SessionMissing => BaseError::new(&val)
                .with_sub_category("session_missing")
                .with_status(401),
            Error::Corrupted { .. } => BaseError::new(&val)
                .with_sub_category("corrupted")
                .with_status(500)
                .with_exception(true),
            Error::Forbidden => BaseError::new(&val)
                .with_sub_category("forbidden")
                .with_status(403),
        };
        err.with_category("session")
    }
}

mod principal;
mod store;

pub use principal::*;
pub use store::*;
