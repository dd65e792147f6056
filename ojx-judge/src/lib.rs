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
    #[snafu(display("Wrong Language option"))]
    BadLanguage,
    #[snafu(display("judge server token is not configured"))]
    MissingToken,
    #[snafu(display("test case data path is not configured"))]
    MissingTestCasePath,
    #[snafu(display("{source}"))]
    Sqlx { source: sqlx::Error },
    #[snafu(display("{source}"))]
    Io { source: std::io::Error },
    #[snafu(display("dispatch task failed: {message}"))]
    Task { message: String },
}

impl From<Error> for BaseError {
    fn from(val: Error) -> Self {
        let err = match &val {
            Error::BadLanguage => BaseError::new(&val)
                .with_sub_category("language")
                .with_status(400),
            Error::MissingToken => BaseError::new(&val)
                .with_sub_category("token")
                .with_status(500)
                .with_exception(true),
            Error::MissingTestCasePath => BaseError::new(&val)
                .with_sub_category("test_case_path")
                .with_status(500)
                .with_exception(true),
            Error::Sqlx { .. } => BaseError::new(&val)
                .with_sub_category("sqlx")
                .with_status(500)
                .with_exception(true),
            Error::Io { .. } => BaseError::new(&val)
                .with_sub_category("io")
                .with_status(500)
                .with_exception(true),
            Error::Task { .. } => BaseError::new(&val)
                .with_sub_category("task")
                .with_status(500)
                .with_exception(true),
        };
        err.with_category("judge")
    }
}

mod dispatcher;
mod registry;
mod scheduler;

pub use dispatcher::*;
pub use registry::*;
pub use scheduler::*;
