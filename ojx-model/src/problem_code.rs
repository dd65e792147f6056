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
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

// Durable autosaved code, unique on (problem_id, user_id, language).
// Rows are created or replaced by the expiry listener and never deleted
// by this service.
#[derive(FromRow)]
struct ProblemCodeSchema {
    id: i32,
    problem_id: i32,
    user_id: i32,
    language: String,
    code: Option<String>,
    created_time: OffsetDateTime,
    updated_time: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct ProblemCode {
    pub id: i32,
    pub problem_id: i32,
    pub user_id: i32,
    pub language: String,
    pub code: String,
    pub created_time: OffsetDateTime,
    pub updated_time: OffsetDateTime,
}

impl From<ProblemCodeSchema> for ProblemCode {
    fn from(record: ProblemCodeSchema) -> Self {
        ProblemCode {
            id: record.id,
            problem_id: record.problem_id,
            user_id: record.user_id,
            language: record.language,
            code: record.code.unwrap_or_default(),
            created_time: record.created_time,
            updated_time: record.updated_time,
        }
    }
}

static SELECT_COLUMNS: &str =
    "id, problem_id, user_id, language, code, created_time, updated_time";

impl ProblemCode {
    pub async fn get_by_triple(
        pool: &PgPool,
        problem_id: i32,
        user_id: i32,
        language: &str,
    ) -> Result<Option<Self>> {
        let result = sqlx::query_as::<_, ProblemCodeSchema>(&format!(
            "SELECT {SELECT_COLUMNS} FROM micro_problem_code \
             WHERE problem_id = $1 AND user_id = $2 AND language = $3"
        ))
        .bind(problem_id)
        .bind(user_id)
        .bind(language)
        .fetch_optional(pool)
        .await
        .map_err(|e| Error::Sqlx { source: e })?;

        Ok(result.map(|record| record.into()))
    }
    /// Insert-or-replace on the unique triple, the only mutation this
    /// service performs on the table.
    pub async fn upsert(
        pool: &PgPool,
        problem_id: i32,
        user_id: i32,
        language: &str,
        code: &str,
    ) -> Result<Self> {
        let result = sqlx::query_as::<_, ProblemCodeSchema>(&format!(
            "INSERT INTO micro_problem_code (problem_id, user_id, language, code) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (problem_id, user_id, language) \
             DO UPDATE SET code = EXCLUDED.code, updated_time = now() \
             RETURNING {SELECT_COLUMNS}"
        ))
        .bind(problem_id)
        .bind(user_id)
        .bind(language)
        .bind(code)
        .fetch_one(pool)
        .await
        .map_err(|e| Error::Sqlx { source: e })?;

        Ok(result.into())
    }
}
