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

use super::{Error, RedisConn, RedisPool};
use redis::AsyncCommands;
use serde::{Serialize, de::DeserializeOwned};
use std::time::Duration;

type Result<T> = std::result::Result<T, Error>;

/// Redis cache with a key prefix and a default ttl.
pub struct RedisCache {
    /// Default time-to-live for entries written without an explicit ttl
    ttl: Duration,
    /// Prefix added to all cache keys
    prefix: String,
    /// Redis connection pool
    pool: &'static RedisPool,
}

impl RedisCache {
    #[inline]
    pub async fn conn(&self) -> Result<RedisConn> {
        self.pool.get().await
    }
    pub fn new(pool: &'static RedisPool) -> Self {
        Self {
            ttl: Duration::from_secs(10 * 60),
            prefix: "".to_string(),
            pool,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_prefix(mut self, prefix: String) -> Self {
        self.prefix = prefix;
        self
    }

    fn get_key(&self, key: &str) -> String {
        if self.prefix.is_empty() {
            return key.to_string();
        }
        self.prefix.to_string() + key
    }
    /// Pings the Redis server to check connection
    pub async fn ping(&self) -> Result<()> {
        let () = self.conn().await?.ping().await.map_err(|e| Error::Redis {
            category: "ping".to_string(),
            source: e,
        })?;
        Ok(())
    }
    async fn get_value<T: redis::FromRedisValue>(&self, key: &str) -> Result<T> {
        let result = self
            .conn()
            .await?
            .get(key)
            .await
            .map_err(|e| Error::Redis {
                category: "get".to_string(),
                source: e,
            })?;

        Ok(result)
    }
    async fn set_value<T: redis::ToRedisArgs + Send + Sync + redis::ToSingleRedisArg>(
        &self,
        key: &str,
        value: T,
        ttl: Option<Duration>,
    ) -> Result<()> {
        let seconds = ttl.unwrap_or(self.ttl).as_secs();
        let () = self
            .conn()
            .await?
            .set_ex(key, value, seconds)
            .await
            .map_err(|e| Error::Redis {
                category: "set".to_string(),
                source: e,
            })?;
        Ok(())
    }
    /// Sets a value with an expiry, the instance default ttl applies when
    /// none is given.
    pub async fn set<T: redis::ToRedisArgs + Send + Sync + redis::ToSingleRedisArg>(
        &self,
        key: &str,
        value: T,
        ttl: Option<Duration>,
    ) -> Result<()> {
        self.set_value(&self.get_key(key), value, ttl).await
    }
    /// Sets a value without any expiry. Autosave data keys must outlive
    /// their debounce keys, so they are written this way.
    pub async fn set_persist<T: redis::ToRedisArgs + Send + Sync + redis::ToSingleRedisArg>(
        &self,
        key: &str,
        value: T,
    ) -> Result<()> {
        let () = self
            .conn()
            .await?
            .set(self.get_key(key), value)
            .await
            .map_err(|e| Error::Redis {
                category: "set_persist".to_string(),
                source: e,
            })?;
        Ok(())
    }
    /// Retrieves a value, `Option` targets make a missing key observable
    /// instead of an error.
    pub async fn get<T: redis::FromRedisValue>(&self, key: &str) -> Result<T> {
        self.get_value::<T>(&self.get_key(key)).await
    }
    /// Removes a key and its value
    pub async fn del(&self, key: &str) -> Result<()> {
        let () = self
            .conn()
            .await?
            .del(self.get_key(key))
            .await
            .map_err(|e| Error::Redis {
                category: "del".to_string(),
                source: e,
            })?;

        Ok(())
    }
    /// Re-arms the ttl of an existing key without touching its value.
    /// A missing key is a no-op, which is what sliding sessions need.
    pub async fn expire(&self, key: &str, ttl: Duration) -> Result<bool> {
        let result = self
            .conn()
            .await?
            .expire(self.get_key(key), ttl.as_secs() as i64)
            .await
            .map_err(|e| Error::Redis {
                category: "expire".to_string(),
                source: e,
            })?;
        Ok(result)
    }
    /// Serializes and stores a struct as JSON
    pub async fn set_struct<T>(&self, key: &str, value: &T, ttl: Option<Duration>) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let value = serde_json::to_vec(&value).map_err(|e| Error::Common {
            category: "set_struct".to_string(),
            message: e.to_string(),
        })?;
        self.set_value(&self.get_key(key), &value, ttl).await?;
        Ok(())
    }
    /// Retrieves and deserializes a struct, `None` when the key is absent
    pub async fn get_struct<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let buf: Vec<u8> = self.get_value(&self.get_key(key)).await?;

        if buf.is_empty() {
            return Ok(None);
        }

        let deserializer = &mut serde_json::Deserializer::from_slice(&buf);
        let result = T::deserialize(deserializer).map_err(|e| Error::Common {
            category: "get_struct".to_string(),
            message: e.to_string(),
        })?;

        Ok(Some(result))
    }
}
