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

// The user table is owned by the main judge application, this service only
// reads the columns it needs to resolve principals.
#[derive(FromRow)]
struct UserSchema {
    id: i32,
    username: String,
    admin_type: String,
    is_disabled: bool,
}

#[derive(Debug, Clone)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub admin_type: String,
    pub is_disabled: bool,
}

impl From<UserSchema> for User {
    fn from(user: UserSchema) -> Self {
        User {
            id: user.id,
            username: user.username,
            admin_type: user.admin_type,
            is_disabled: user.is_disabled,
        }
    }
}

impl User {
    pub async fn exists_by_username(pool: &PgPool, username: &str) -> Result<bool> {
        let result = sqlx::query_scalar::<_, bool>(
            r#"SELECT EXISTS(SELECT 1 FROM "user" WHERE username = $1)"#,
        )
        .bind(username)
        .fetch_one(pool)
        .await
        .map_err(|e| Error::Sqlx { source: e })?;

        Ok(result)
    }
    pub async fn get_by_username(pool: &PgPool, username: &str) -> Result<Option<Self>> {
        let result = sqlx::query_as::<_, UserSchema>(
            r#"SELECT id, username, admin_type, is_disabled FROM "user" WHERE username = $1"#,
        )
        .bind(username)
        .fetch_optional(pool)
        .await
        .map_err(|e| Error::Sqlx { source: e })?;

        Ok(result.map(|user| user.into()))
    }
}
