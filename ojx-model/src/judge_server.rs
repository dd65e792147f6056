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
use sqlx::{FromRow, PgConnection, PgPool};
use std::time::Duration;
use time::{OffsetDateTime, PrimitiveDateTime};

// a worker missing heartbeats for longer than this is not schedulable
pub static HEARTBEAT_TIMEOUT: Duration = Duration::from_secs(6);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JudgeServerStatus {
    Normal,
    Abnormal,
}

impl std::fmt::Display for JudgeServerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JudgeServerStatus::Normal => write!(f, "normal"),
            JudgeServerStatus::Abnormal => write!(f, "abnormal"),
        }
    }
}

// judge_server rows are registered and heartbeated by the workers
// themselves, this service reads them and owns only task_number.
#[derive(FromRow)]
struct JudgeServerSchema {
    id: i32,
    hostname: String,
    cpu_core: i32,
    task_number: i32,
    service_url: Option<String>,
    // stored without timezone, the writers use utc
    last_heartbeat: PrimitiveDateTime,
    is_disabled: bool,
}

#[derive(Debug, Clone)]
pub struct JudgeServer {
    pub id: i32,
    pub hostname: String,
    pub cpu_core: i32,
    pub task_number: i32,
    pub service_url: String,
    pub last_heartbeat: OffsetDateTime,
    pub is_disabled: bool,
}

impl From<JudgeServerSchema> for JudgeServer {
    fn from(server: JudgeServerSchema) -> Self {
        JudgeServer {
            id: server.id,
            hostname: server.hostname,
            cpu_core: server.cpu_core,
            task_number: server.task_number,
            service_url: server.service_url.unwrap_or_default(),
            last_heartbeat: server.last_heartbeat.assume_utc(),
            is_disabled: server.is_disabled,
        }
    }
}

static SELECT_COLUMNS: &str =
    "id, hostname, cpu_core, task_number, service_url, last_heartbeat, is_disabled";

impl JudgeServer {
    /// Derived liveness at a given instant, split out from `status` so the
    /// selection logic stays testable without a clock.
    pub fn status_at(&self, now: OffsetDateTime) -> JudgeServerStatus {
        if self.is_disabled {
            return JudgeServerStatus::Abnormal;
        }
        if now - self.last_heartbeat > HEARTBEAT_TIMEOUT {
            return JudgeServerStatus::Abnormal;
        }
        JudgeServerStatus::Normal
    }
    pub fn status(&self) -> JudgeServerStatus {
        self.status_at(OffsetDateTime::now_utc())
    }
    /// Read-only fleet snapshot ordered by load, least loaded first.
    pub async fn list_by_task_number(pool: &PgPool) -> Result<Vec<Self>> {
        let result = sqlx::query_as::<_, JudgeServerSchema>(&format!(
            "SELECT {SELECT_COLUMNS} FROM judge_server ORDER BY task_number, id"
        ))
        .fetch_all(pool)
        .await
        .map_err(|e| Error::Sqlx { source: e })?;

        Ok(result.into_iter().map(|server| server.into()).collect())
    }
    /// Locks every enabled row for the scope of the caller's transaction,
    /// ordered by load. Only the scheduler may call this.
    pub async fn lock_candidates(conn: &mut PgConnection) -> Result<Vec<Self>> {
        let result = sqlx::query_as::<_, JudgeServerSchema>(&format!(
            "SELECT {SELECT_COLUMNS} FROM judge_server \
             WHERE is_disabled = false ORDER BY task_number, id FOR UPDATE"
        ))
        .fetch_all(conn)
        .await
        .map_err(|e| Error::Sqlx { source: e })?;

        Ok(result.into_iter().map(|server| server.into()).collect())
    }
    /// Relative counter update, the database serializes these across
    /// service replicas.
    pub async fn adjust_task_number(
        conn: &mut PgConnection,
        id: i32,
        delta: i32,
    ) -> Result<()> {
        let _ = sqlx::query("UPDATE judge_server SET task_number = task_number + $1 WHERE id = $2")
            .bind(delta)
            .bind(id)
            .execute(conn)
            .await
            .map_err(|e| Error::Sqlx { source: e })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use time::macros::datetime;

    fn server(last_heartbeat: OffsetDateTime, is_disabled: bool) -> JudgeServer {
        JudgeServer {
            id: 1,
            hostname: "judge-1".to_string(),
            cpu_core: 2,
            task_number: 0,
            service_url: "http://judge-1:8080".to_string(),
            last_heartbeat,
            is_disabled,
        }
    }

    #[test]
    fn status_follows_heartbeat_age() {
        let now = datetime!(2025-06-01 12:00:00 UTC);
        let fresh = server(now - Duration::from_secs(3), false);
        assert_eq!(JudgeServerStatus::Normal, fresh.status_at(now));

        let boundary = server(now - Duration::from_secs(6), false);
        assert_eq!(JudgeServerStatus::Normal, boundary.status_at(now));

        let stale = server(now - Duration::from_secs(7), false);
        assert_eq!(JudgeServerStatus::Abnormal, stale.status_at(now));
    }

    #[test]
    fn disabled_server_is_abnormal_even_with_fresh_heartbeat() {
        let now = datetime!(2025-06-01 12:00:00 UTC);
        let disabled = server(now, true);
        assert_eq!(JudgeServerStatus::Abnormal, disabled.status_at(now));
    }
}
