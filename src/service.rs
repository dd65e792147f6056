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

use crate::cache::{get_code_save_cache, get_session_cache};
use crate::config::{
    get_autosave_config, get_session_config, must_get_judge_config, must_get_sso_config,
};
use crate::sql::get_db_pool;
use ojx_autosave::AutosaveBuffer;
use ojx_error::Error;
use ojx_judge::{ExecutionDispatcher, JudgeFleetRegistry};
use ojx_session::SessionStore;
use ojx_sso::SsoExchanger;
use once_cell::sync::OnceCell;

type Result<T> = std::result::Result<T, Error>;

static SESSION_STORE: OnceCell<SessionStore> = OnceCell::new();
static SSO_EXCHANGER: OnceCell<SsoExchanger> = OnceCell::new();
static DISPATCHER: OnceCell<ExecutionDispatcher> = OnceCell::new();
static AUTOSAVE_BUFFER: OnceCell<AutosaveBuffer> = OnceCell::new();
static FLEET_REGISTRY: OnceCell<JudgeFleetRegistry> = OnceCell::new();

/// Wires the long-lived components once the pools exist, called at
/// startup after `init_caches` and `init_db_pool`.
pub fn init_services() -> Result<()> {
    let pool = get_db_pool();

    let store = SESSION_STORE
        .get_or_init(|| SessionStore::new(get_session_cache(), get_session_config().ttl));

    SSO_EXCHANGER.get_or_try_init(|| {
        let sso_config = must_get_sso_config();
        SsoExchanger::new(&sso_config.introspect_url, store, pool)
    })?;
    DISPATCHER.get_or_try_init(|| ExecutionDispatcher::new(pool, must_get_judge_config()))?;
    AUTOSAVE_BUFFER
        .get_or_try_init(|| AutosaveBuffer::new(get_code_save_cache(), pool, get_autosave_config()))?;
    FLEET_REGISTRY.get_or_init(|| JudgeFleetRegistry::new(pool));
    Ok(())
}

pub fn get_session_store() -> &'static SessionStore {
    SESSION_STORE.get().expect("session store not initialized")
}

pub fn get_sso_exchanger() -> &'static SsoExchanger {
    SSO_EXCHANGER.get().expect("sso exchanger not initialized")
}

pub fn get_dispatcher() -> &'static ExecutionDispatcher {
    DISPATCHER.get().expect("dispatcher not initialized")
}

pub fn get_autosave_buffer() -> &'static AutosaveBuffer {
    AUTOSAVE_BUFFER
        .get()
        .expect("autosave buffer not initialized")
}

pub fn get_fleet_registry() -> &'static JudgeFleetRegistry {
    FLEET_REGISTRY
        .get()
        .expect("fleet registry not initialized")
}
