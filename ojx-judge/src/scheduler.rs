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

use super::{Error, SqlxSnafu, pick_worker};
use ojx_model::JudgeServer;
use snafu::ResultExt;
use sqlx::PgPool;
use time::OffsetDateTime;
use tracing::{debug, error};

type Result<T, E = ojx_error::Error> = std::result::Result<T, E>;

/// A transient reservation on one judge worker. The worker's persisted
/// task_number was incremented when the lease was issued and must come back
/// down exactly once, on every exit path. `release` is the explicit path,
/// the Drop guard covers panics and forgotten leases by spawning the
/// decrement. A crash of the whole process still leaks at most one count,
/// operators heal that with an administrative reset.
pub struct JudgeLease {
    pub id: i32,
    pub service_url: String,
    pub cpu_core: i32,
    /// counter value right after the increment
    pub task_number: i32,
    pool: &'static PgPool,
    released: bool,
}

impl JudgeLease {
    async fn decrement(pool: &PgPool, id: i32) -> Result<(), Error> {
        let mut conn = pool.acquire().await.context(SqlxSnafu)?;
        JudgeServer::adjust_task_number(&mut conn, id, -1)
            .await
            .map_err(|e| match e {
                ojx_model::Error::Sqlx { source } => Error::Sqlx { source },
                e => Error::Task {
                    message: e.to_string(),
                },
            })?;
        Ok(())
    }
    /// Gives the worker slot back in a fresh short transaction.
    pub async fn release(mut self) -> Result<()> {
        self.released = true;
        Self::decrement(self.pool, self.id).await?;
        debug!(category = "judge", id = self.id, "lease released");
        Ok(())
    }
}

impl Drop for JudgeLease {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        let pool = self.pool;
        let id = self.id;
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                if let Err(e) = JudgeLease::decrement(pool, id).await {
                    error!(category = "judge", id, error = %e, "lease release failed in drop");
                }
            });
        } else {
            error!(category = "judge", id, "lease dropped outside runtime, task count leaked");
        }
    }
}

/// Load-aware worker selection. `acquire` runs one short transaction that
/// locks the candidate rows, picks the least-loaded live worker under its
/// capacity and increments its task counter before committing. The
/// database-side row lock is what serializes concurrent acquirers, also
/// across service replicas.
pub struct JudgeScheduler {
    pool: &'static PgPool,
}

impl JudgeScheduler {
    pub fn new(pool: &'static PgPool) -> Self {
        Self { pool }
    }
    /// Returns a lease on the chosen worker, or `None` when every live
    /// worker is at capacity. Refusal is surfaced to the caller, there is
    /// no queue here.
    pub async fn acquire(&self) -> Result<Option<JudgeLease>> {
        let mut tx = self.pool.begin().await.context(SqlxSnafu)?;
        let servers = JudgeServer::lock_candidates(&mut tx).await?;
        let now = OffsetDateTime::now_utc();
        let Some(server) = pick_worker(&servers, now) else {
            // dropping the transaction rolls the row locks back
            debug!(category = "judge", "no available judge server");
            return Ok(None);
        };
        let (id, service_url, cpu_core, task_number) = (
            server.id,
            server.service_url.clone(),
            server.cpu_core,
            server.task_number + 1,
        );
        JudgeServer::adjust_task_number(&mut tx, id, 1).await?;
        // the lease only exists once the increment committed, otherwise the
        // drop guard would pay back a count that was never taken
        tx.commit().await.context(SqlxSnafu)?;
        let lease = JudgeLease {
            id,
            service_url,
            cpu_core,
            task_number,
            pool: self.pool,
            released: false,
        };
        debug!(
            category = "judge",
            id = lease.id,
            task_number = lease.task_number,
            "lease acquired"
        );
        Ok(Some(lease))
    }
}
