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

use super::{Error, Result};
use serde::Deserialize;
use sqlx::PgPool;
use sqlx::types::Json;

pub static OPTION_LANGUAGES: &str = "languages";
pub static OPTION_JUDGE_SERVER_TOKEN: &str = "judge_server_token";

/// One entry of the `languages` system option. The config document is kept
/// opaque, the dispatcher reshapes it just before forwarding.
#[derive(Debug, Clone, Deserialize)]
pub struct LanguageOption {
    pub name: String,
    #[serde(default)]
    pub config: serde_json::Value,
}

/// Key/value system options maintained by the main judge application.
pub struct SysOption;

impl SysOption {
    pub async fn get_value(pool: &PgPool, key: &str) -> Result<Option<serde_json::Value>> {
        let result = sqlx::query_scalar::<_, Json<serde_json::Value>>(
            "SELECT value FROM options_sysoptions WHERE key = $1",
        )
        .bind(key)
        .fetch_optional(pool)
        .await
        .map_err(|e| Error::Sqlx { source: e })?;

        Ok(result.map(|value| value.0))
    }
    /// String-typed option, `None` when absent or not a string.
    pub async fn get_string(pool: &PgPool, key: &str) -> Result<Option<String>> {
        let value = Self::get_value(pool, key).await?;
        Ok(value.and_then(|v| v.as_str().map(|s| s.to_string())))
    }
    pub async fn get_languages(pool: &PgPool) -> Result<Vec<LanguageOption>> {
        let Some(value) = Self::get_value(pool, OPTION_LANGUAGES).await? else {
            return Ok(vec![]);
        };
        let languages: Vec<LanguageOption> =
            serde_json::from_value(value).map_err(|e| Error::Json { source: e })?;
        Ok(languages)
    }
}
