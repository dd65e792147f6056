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

use crate::config::get_app_config;
use ojx_error::Error;
use once_cell::sync::OnceCell;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

type Result<T> = std::result::Result<T, Error>;

static DB_POOL: OnceCell<PgPool> = OnceCell::new();

/// Connects the postgres pool, called once at startup before any route is
/// served.
pub async fn init_db_pool() -> Result<&'static PgPool> {
    let config = get_app_config()
        .new_database_config()
        .map_err(|e| Error::new(e).with_category("config").with_status(500))?;
    let category = "sqlx";
    info!(category, "connect to database");

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.connect_timeout)
        .idle_timeout(config.idle_timeout)
        .max_lifetime(config.max_lifetime)
        .connect(config.url.as_str())
        .await
        .map_err(|e| {
            Error::new(e)
                .with_category("sql")
                .with_status(500)
                .with_exception(true)
        })?;
    DB_POOL
        .set(pool)
        .map_err(|_| Error::new("set db pool fail").with_status(500))?;
    Ok(get_db_pool())
}

pub fn get_db_pool() -> &'static PgPool {
    // init_db_pool runs before the server starts accepting requests
    DB_POOL
        .get()
        .unwrap_or_else(|| panic!("db pool not initialized"))
}
