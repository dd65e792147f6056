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

use super::{Error, Principal};
use ojx_cache::RedisCache;
use snafu::ResultExt;
use std::time::Duration;
use tracing::error;

type Result<T, E = ojx_error::Error> = std::result::Result<T, E>;

/// Opaque-token to principal cache. The backing cache carries the
/// `{session_prefix}` key prefix, so this type only deals in tokens.
/// A session exists iff a live principal is reachable by its token.
pub struct SessionStore {
    cache: &'static RedisCache,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(cache: &'static RedisCache, ttl: Duration) -> Self {
        Self { cache, ttl }
    }
    /// The ttl minted sessions get by default.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }
    /// Idempotent upsert with an absolute ttl, last writer wins.
    pub async fn put(&self, token: &str, principal: &Principal, ttl: Duration) -> Result<()> {
        let buf = serde_json::to_vec(principal).context(super::CorruptedSnafu)?;
        self.cache.set(token, &buf, Some(ttl)).await?;
        Ok(())
    }
    /// Resolves a token, absent or expired tokens fail with a 401, an
    /// unparseable record is fatal and logged.
    pub async fn get(&self, token: &str) -> Result<Principal> {
        let buf: Option<Vec<u8>> = self.cache.get(token).await?;
        let Some(buf) = buf else {
            return Err(Error::SessionMissing.into());
        };
        if buf.is_empty() {
            return Err(Error::SessionMissing.into());
        }
        let principal = serde_json::from_slice::<Principal>(&buf)
            .context(super::CorruptedSnafu)
            .inspect_err(|e| {
                error!(category = "session", error = %e, "corrupted session record");
            })?;
        Ok(principal)
    }
    /// Extends a record's ttl without reading the value, a vanished key is
    /// a no-op. Used for sliding sessions.
    pub async fn touch(&self, token: &str, ttl: Duration) -> Result<()> {
        let _ = self.cache.expire(token, ttl).await?;
        Ok(())
    }
    /// Removes the record unconditionally.
    pub async fn drop(&self, token: &str) -> Result<()> {
        self.cache.del(token).await?;
        Ok(())
    }
}
