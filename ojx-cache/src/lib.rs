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
    #[snafu(display("category: {category}, {message}"))]
    Common { category: String, message: String },
    #[snafu(display("{source}"))]
    Build { source: deadpool_redis::BuildError },
    #[snafu(display("category: {category}, {source}"))]
    Redis {
        category: String,
        source: deadpool_redis::redis::RedisError,
    },
}

impl From<Error> for BaseError {
    fn from(val: Error) -> Self {
        let err = match val {
            Error::Common { category, message } => {
                BaseError::new(message).with_sub_category(&category)
            }
            Error::Build { source } => BaseError::new(source)
                .with_sub_category("build")
                .with_status(500)
                .with_exception(true),
            Error::Redis { category, source } => BaseError::new(source)
                .with_sub_category(&category)
                .with_status(500)
                .with_exception(true),
        };
        err.with_category("cache")
    }
}

mod cache;
mod pool;

pub use cache::*;
pub use pool::*;
