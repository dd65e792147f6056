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

use ojx_config::{
    AppConfig, AutosaveConfig, BasicConfig, JudgeConfig, SessionConfig, SsoConfig, new_app_config,
};
use once_cell::sync::Lazy;

// redis database indexes, the expiry listener subscribes to the code-save
// one and must match the keyspace-notification channel
pub static SESSION_DB: u32 = 1;
pub static CODE_SAVE_DB: u32 = 10;

static DEFAULT_CONFIG: &str = include_str!("../configs/default.toml");

// config is loaded once, an invalid file is a startup failure
static APP_CONFIG: Lazy<AppConfig> =
    Lazy::new(|| new_app_config(vec![DEFAULT_CONFIG]).expect("parse config fail"));

pub fn get_app_config() -> &'static AppConfig {
    &APP_CONFIG
}

pub fn must_get_basic_config() -> BasicConfig {
    get_app_config()
        .new_basic_config()
        .expect("basic config is invalid")
}

static SESSION_CONFIG: Lazy<SessionConfig> = Lazy::new(|| {
    get_app_config()
        .new_session_config()
        .expect("session config is invalid")
});

pub fn get_session_config() -> &'static SessionConfig {
    &SESSION_CONFIG
}

static AUTOSAVE_CONFIG: Lazy<AutosaveConfig> = Lazy::new(|| {
    get_app_config()
        .new_autosave_config()
        .expect("autosave config is invalid")
});

pub fn get_autosave_config() -> &'static AutosaveConfig {
    &AUTOSAVE_CONFIG
}

pub fn must_get_sso_config() -> SsoConfig {
    get_app_config().new_sso_config()
}

pub fn must_get_judge_config() -> JudgeConfig {
    get_app_config().new_judge_config()
}
