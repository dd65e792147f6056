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

use ojx_model::{JudgeServer, JudgeServerStatus};
use sqlx::PgPool;
use time::OffsetDateTime;

type Result<T, E = ojx_error::Error> = std::result::Result<T, E>;

/// A worker may hold up to `cpu_core * 2` concurrent tasks before it is
/// considered overloaded.
pub fn capacity(server: &JudgeServer) -> i32 {
    server.cpu_core * 2
}

/// Picks the worker the scheduler will lease: rows arrive ordered by load,
/// the first live one under its capacity wins. No randomization, so the
/// choice is reproducible.
pub fn pick_worker<'a>(servers: &'a [JudgeServer], now: OffsetDateTime) -> Option<&'a JudgeServer> {
    servers
        .iter()
        .filter(|server| server.status_at(now) == JudgeServerStatus::Normal)
        .find(|server| server.task_number <= capacity(server))
}

/// Read-mostly projection of the judge worker fleet. All counter mutations
/// go through the scheduler, the registry only observes.
pub struct JudgeFleetRegistry {
    pool: &'static PgPool,
}

impl JudgeFleetRegistry {
    pub fn new(pool: &'static PgPool) -> Self {
        Self { pool }
    }
    /// Committed snapshot ordered by task_number ascending.
    pub async fn snapshot(&self) -> Result<Vec<JudgeServer>> {
        let servers = JudgeServer::list_by_task_number(self.pool).await?;
        Ok(servers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::time::Duration;
    use time::macros::datetime;

    fn server(id: i32, cpu_core: i32, task_number: i32, heartbeat_age: u64) -> JudgeServer {
        let now = datetime!(2025-06-01 12:00:00 UTC);
        JudgeServer {
            id,
            hostname: format!("judge-{id}"),
            cpu_core,
            task_number,
            service_url: format!("http://judge-{id}:8080"),
            last_heartbeat: now - Duration::from_secs(heartbeat_age),
            is_disabled: false,
        }
    }

    #[test]
    fn least_loaded_live_worker_wins() {
        let now = datetime!(2025-06-01 12:00:00 UTC);
        // ordered by task_number the way the select returns them,
        // the third worker stopped heartbeating
        let servers = vec![
            server(2, 2, 0, 1),
            server(1, 2, 1, 1),
            server(3, 1, 3, 60),
        ];
        let picked = pick_worker(&servers, now).unwrap();
        assert_eq!(2, picked.id);
    }

    #[test]
    fn overloaded_workers_are_skipped() {
        let now = datetime!(2025-06-01 12:00:00 UTC);
        // capacity is cpu_core * 2, a worker at 5 of 4 is skipped
        let servers = vec![server(1, 2, 5, 1), server(2, 1, 2, 1)];
        let picked = pick_worker(&servers, now).unwrap();
        assert_eq!(2, picked.id);

        // at the boundary the worker is still eligible
        let servers = vec![server(1, 2, 4, 1)];
        assert_eq!(1, pick_worker(&servers, now).unwrap().id);
    }

    #[test]
    fn saturated_fleet_yields_nothing() {
        let now = datetime!(2025-06-01 12:00:00 UTC);
        let servers = vec![server(1, 1, 3, 1), server(2, 1, 4, 1)];
        assert!(pick_worker(&servers, now).is_none());
        assert!(pick_worker(&[], now).is_none());
    }
}
