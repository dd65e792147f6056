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

use crate::config::must_get_basic_config;
use ojx_state::AppState;
use once_cell::sync::Lazy;

static APP_STATE: Lazy<AppState> =
    Lazy::new(|| AppState::new(must_get_basic_config().processing_limit));

pub fn get_app_state() -> &'static AppState {
    &APP_STATE
}
