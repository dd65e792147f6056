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
    #[snafu(display("{source}"))]
    Sqlx { source: sqlx::Error },
    #[snafu(display("{source}"))]
    Json { source: serde_json::Error },
}

impl From<Error> for BaseError {
    fn from(source: Error) -> Self {
        let error_category = "model";
        match source {
            Error::Sqlx { source } => BaseError::new(source)
                .with_category(error_category)
                .with_sub_category("sqlx")
                .with_status(500)
                .with_exception(true),
            Error::Json { source } => BaseError::new(source)
                .with_category(error_category)
                .with_sub_category("json")
                .with_status(500)
                .with_exception(true),
        }
    }
}

type Result<T> = std::result::Result<T, Error>;

mod judge_server;
mod problem_code;
mod sys_option;
mod user;

pub use judge_server::*;
pub use problem_code::*;
pub use sys_option::*;
pub use user::*;
