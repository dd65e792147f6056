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

use super::PatternSnafu;
use ojx_cache::RedisCache;
use ojx_config::AutosaveConfig;
use ojx_model::ProblemCode;
use regex::Regex;
use snafu::ResultExt;
use sqlx::PgPool;
use std::time::Duration;
use tracing::info;

type Result<T, E = ojx_error::Error> = std::result::Result<T, E>;

/// One autosave slot: the latest code of one user for one problem in one
/// language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotKey {
    pub user_id: i32,
    pub problem_id: i32,
    pub language: String,
}

/// Buffers code edits in redis and arms a per-slot debounce key. The data
/// key holds the latest code without a ttl, the debounce key is a sentinel
/// whose expiry triggers the durable flush. Writing the debounce key last
/// guarantees a crash in between leaves no pending flush.
pub struct AutosaveBuffer {
    cache: &'static RedisCache,
    pool: &'static PgPool,
    prefix: String,
    ttl: Duration,
    debounce_pattern: Regex,
}

impl AutosaveBuffer {
    pub fn new(
        cache: &'static RedisCache,
        pool: &'static PgPool,
        config: &AutosaveConfig,
    ) -> Result<Self> {
        let debounce_pattern = Regex::new(&format!(
            r"^{}:debounce:user:(?P<uid>\d+):problem:(?P<pid>\d+):lang:(?P<lang>[A-Za-z0-9_+#]+)$",
            regex::escape(&config.prefix)
        ))
        .context(PatternSnafu)?;
        Ok(Self {
            cache,
            pool,
            prefix: config.prefix.clone(),
            ttl: config.ttl,
            debounce_pattern,
        })
    }

    pub fn data_key(&self, slot: &SlotKey) -> String {
        format!(
            "{}:data:user:{}:problem:{}:lang:{}",
            self.prefix, slot.user_id, slot.problem_id, slot.language
        )
    }
    pub fn debounce_key(&self, slot: &SlotKey) -> String {
        format!(
            "{}:debounce:user:{}:problem:{}:lang:{}",
            self.prefix, slot.user_id, slot.problem_id, slot.language
        )
    }
    /// Recognizes debounce keys of this deployment, anything else in the
    /// expiry channel is skipped.
    pub fn parse_debounce_key(&self, key: &str) -> Option<SlotKey> {
        let captures = self.debounce_pattern.captures(key)?;
        Some(SlotKey {
            user_id: captures["uid"].parse().ok()?,
            problem_id: captures["pid"].parse().ok()?,
            language: captures["lang"].to_string(),
        })
    }

    /// Stores the latest code and re-arms the debounce window. Repeated
    /// saves within the window coalesce into a single flush.
    pub async fn save(&self, slot: &SlotKey, code: &str) -> Result<()> {
        self.cache.set_persist(&self.data_key(slot), code).await?;
        self.cache
            .set(&self.debounce_key(slot), "1", Some(self.ttl))
            .await?;
        Ok(())
    }

    /// Latest buffered code, falling back to the durable store, then the
    /// empty string.
    pub async fn load(&self, slot: &SlotKey) -> Result<String> {
        let buffered: Option<String> = self.cache.get(&self.data_key(slot)).await?;
        if let Some(code) = buffered {
            return Ok(code);
        }
        let record =
            ProblemCode::get_by_triple(self.pool, slot.problem_id, slot.user_id, &slot.language)
                .await?;
        Ok(record.map(|record| record.code).unwrap_or_default())
    }

    /// Durable flush driven by a debounce-key expiry: read the freshest
    /// committed code, upsert it, then drop the data key. A missing data
    /// key means another node already flushed, which is a no-op.
    pub async fn flush(&self, slot: &SlotKey) -> Result<bool> {
        let data_key = self.data_key(slot);
        let code: Option<String> = self.cache.get(&data_key).await?;
        let Some(code) = code else {
            return Ok(false);
        };
        ProblemCode::upsert(
            self.pool,
            slot.problem_id,
            slot.user_id,
            &slot.language,
            &code,
        )
        .await?;
        // only after the upsert committed, so a failed flush retries on
        // the next save cycle
        self.cache.del(&data_key).await?;
        info!(
            category = "autosave",
            user_id = slot.user_id,
            problem_id = slot.problem_id,
            language = slot.language,
            "code flushed"
        );
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn buffer_parts() -> (Regex, String) {
        let prefix = "code_save".to_string();
        let pattern = Regex::new(&format!(
            r"^{}:debounce:user:(?P<uid>\d+):problem:(?P<pid>\d+):lang:(?P<lang>[A-Za-z0-9_+#]+)$",
            regex::escape(&prefix)
        ))
        .unwrap();
        (pattern, prefix)
    }

    fn parse(pattern: &Regex, key: &str) -> Option<SlotKey> {
        let captures = pattern.captures(key)?;
        Some(SlotKey {
            user_id: captures["uid"].parse().ok()?,
            problem_id: captures["pid"].parse().ok()?,
            language: captures["lang"].to_string(),
        })
    }

    #[test]
    fn debounce_key_round_trips() {
        let (pattern, _) = buffer_parts();
        let slot = parse(&pattern, "code_save:debounce:user:7:problem:42:lang:Python3").unwrap();
        assert_eq!(
            SlotKey {
                user_id: 7,
                problem_id: 42,
                language: "Python3".to_string(),
            },
            slot
        );

        let slot = parse(&pattern, "code_save:debounce:user:1:problem:2:lang:C++").unwrap();
        assert_eq!("C++", slot.language);
    }

    #[test]
    fn foreign_keys_are_rejected() {
        let (pattern, _) = buffer_parts();
        // data keys never trigger a flush
        assert!(parse(&pattern, "code_save:data:user:7:problem:42:lang:Python3").is_none());
        // other prefixes belong to other deployments
        assert!(parse(&pattern, "other:debounce:user:7:problem:42:lang:Python3").is_none());
        // session keys share the server
        assert!(parse(&pattern, "session:1f9a").is_none());
        assert!(parse(&pattern, "code_save:debounce:user:x:problem:42:lang:C").is_none());
    }
}
