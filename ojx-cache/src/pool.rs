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
use ojx_config::RedisConfig;

type Result<T> = std::result::Result<T, Error>;

pub type RedisConn = deadpool_redis::Connection;

/// Connection pool over the single redis node of one logical database.
/// The service holds two of these, one for sessions (db 1) and one for
/// code autosave (db 10), both derived from the same `REDIS_URL`.
pub struct RedisPool {
    pool: deadpool_redis::Pool,
}

impl RedisPool {
    pub async fn get(&self) -> Result<RedisConn> {
        self.pool.get().await.map_err(|e| Error::Common {
            category: "connection".to_string(),
            message: e.to_string(),
        })
    }
}

/// Creates the pool for one database index, sized and timed out per the
/// redis config.
pub fn new_redis_pool(config: &RedisConfig) -> Result<RedisPool> {
    let manager =
        deadpool_redis::Manager::new(config.url.as_str()).map_err(|e| Error::Redis {
            category: "new_pool".to_string(),
            source: e,
        })?;
    let pool = deadpool_redis::Pool::builder(manager)
        .config(deadpool_redis::PoolConfig {
            max_size: config.pool_size as usize,
            timeouts: deadpool_redis::Timeouts {
                wait: Some(config.wait_timeout),
                create: Some(config.connection_timeout),
                recycle: Some(config.recycle_timeout),
            },
            ..Default::default()
        })
        .runtime(deadpool_redis::Runtime::Tokio1)
        .build()
        .map_err(|e| Error::Build { source: e })?;
    Ok(RedisPool { pool })
}
