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

use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::time::SystemTime;

/// Thread-safe application state: running flag, concurrent request count
/// and start time. The ping handler reports 503 until `run()` is called.
pub struct AppState {
    // Maximum number of concurrent requests allowed
    processing_limit: i32,
    // Current application status (running/stopped)
    running: AtomicBool,
    // Current number of requests being processed
    processing: AtomicI32,
    // Application start timestamp
    started_at: SystemTime,
}

impl AppState {
    pub fn new(processing_limit: i32) -> Self {
        Self {
            processing_limit,
            running: AtomicBool::new(false),
            processing: AtomicI32::new(0),
            started_at: SystemTime::now(),
        }
    }

    pub fn get_processing_limit(&self) -> i32 {
        self.processing_limit
    }

    /// Atomically increments the processing counter, returns the previous
    /// value
    pub fn inc_processing(&self) -> i32 {
        self.processing.fetch_add(1, Ordering::Relaxed)
    }

    pub fn dec_processing(&self) -> i32 {
        self.processing.fetch_sub(1, Ordering::Relaxed)
    }

    pub fn get_processing(&self) -> i32 {
        self.processing.load(Ordering::Relaxed)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    pub fn run(&self) {
        self.running.store(true, Ordering::Relaxed)
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::Relaxed)
    }

    pub fn get_started_at(&self) -> SystemTime {
        self.started_at
    }
}
