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

use std::time::Instant;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Current unix timestamp in seconds.
pub fn timestamp() -> i64 {
    OffsetDateTime::now_utc().unix_timestamp()
}

/// Current time as an RFC3339 string.
pub fn now() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default()
}

/// Small elapsed-time helper for request statistics.
pub struct Stopwatch {
    started_at: Instant,
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}

impl Stopwatch {
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
        }
    }
    pub fn elapsed_ms(&self) -> u32 {
        self.started_at.elapsed().as_millis() as u32
    }
}
