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

use crate::config::{
    CODE_SAVE_DB, SESSION_DB, get_app_config, get_autosave_config, get_session_config,
};
use ojx_cache::{RedisCache, RedisPool, new_redis_pool};
use ojx_error::Error;
use once_cell::sync::OnceCell;

type Result<T> = std::result::Result<T, Error>;

static SESSION_POOL: OnceCell<RedisPool> = OnceCell::new();
static CODE_SAVE_POOL: OnceCell<RedisPool> = OnceCell::new();
static SESSION_CACHE: OnceCell<RedisCache> = OnceCell::new();
static CODE_SAVE_CACHE: OnceCell<RedisCache> = OnceCell::new();

fn config_error(err: ojx_config::Error) -> Error {
    Error::new(err).with_category("config").with_status(500)
}

fn get_session_pool() -> Result<&'static RedisPool> {
    SESSION_POOL.get_or_try_init(|| {
        let config = get_app_config()
            .new_redis_config(SESSION_DB)
            .map_err(config_error)?;
        let pool = new_redis_pool(&config)?;
        Ok(pool)
    })
}

fn get_code_save_pool() -> Result<&'static RedisPool> {
    CODE_SAVE_POOL.get_or_try_init(|| {
        let config = get_app_config()
            .new_redis_config(CODE_SAVE_DB)
            .map_err(config_error)?;
        let pool = new_redis_pool(&config)?;
        Ok(pool)
    })
}

/// The node url the expiry listener opens its dedicated pub/sub
/// connection against.
pub fn get_code_save_node() -> Result<String> {
    let config = get_app_config()
        .new_redis_config(CODE_SAVE_DB)
        .map_err(config_error)?;
    Ok(config.url)
}

/// Builds both caches and verifies connectivity, called once at startup.
pub async fn init_caches() -> Result<()> {
    get_session_cache().ping().await?;
    get_code_save_cache().ping().await?;
    Ok(())
}

/// Session cache: key prefix `{session_prefix}`, entry ttl
/// `LOCAL_TOKEN_TTL_SECONDS`.
pub fn get_session_cache() -> &'static RedisCache {
    SESSION_CACHE.get_or_init(|| {
        // pool creation is validated in init_caches
        let pool = get_session_pool().expect("session redis pool is invalid");
        let config = get_session_config();
        RedisCache::new(pool)
            .with_prefix(config.prefix.clone())
            .with_ttl(config.ttl)
    })
}

/// Code-save cache: un-prefixed, the autosave buffer formats its own keys.
pub fn get_code_save_cache() -> &'static RedisCache {
    CODE_SAVE_CACHE.get_or_init(|| {
        // pool creation is validated in init_caches
        let pool = get_code_save_pool().expect("code save redis pool is invalid");
        RedisCache::new(pool).with_ttl(get_autosave_config().ttl)
    })
}
