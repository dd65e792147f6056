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

use super::{Error, IoSnafu, JudgeLease, JudgeScheduler};
use axum::http::header::{HeaderMap, HeaderValue};
use ojx_config::JudgeConfig;
use ojx_model::{OPTION_JUDGE_SERVER_TOKEN, SysOption};
use ojx_request::{Client, ClientBuilder};
use ojx_util::{md5_hex, random_token, sha256_hex};
use serde_json::{Value, json};
use snafu::ResultExt;
use sqlx::PgPool;
use std::path::Path;
use std::time::Duration;
use tracing::{error, info};

type Result<T, E = ojx_error::Error> = std::result::Result<T, E>;

static JUDGE_TOKEN_HEADER: &str = "X-Judge-Server-Token";
// the worker owns its internal retries, one call per endpoint is enough
const WORKER_TIMEOUT: Duration = Duration::from_secs(30);

/// One run request as the dispatcher sees it, limits already resolved.
#[derive(Debug, Clone)]
pub struct RunParams {
    pub language: String,
    pub src: String,
    pub stdin: String,
    pub max_cpu_time: i64,
    pub max_memory_mb: i64,
}

impl RunParams {
    fn max_real_time(&self) -> i64 {
        (self.max_cpu_time * 3).max(1)
    }
    fn max_memory_bytes(&self) -> i64 {
        self.max_memory_mb.max(1) * 1024 * 1024
    }
}

/// Workers only understand string seccomp rules, some language configs
/// carry a structured object there. Substitute the canonical rule.
fn normalize_language_config(mut config: Value) -> Value {
    if let Some(rule) = config.pointer_mut("/run/seccomp_rule")
        && rule.is_object()
    {
        *rule = Value::String("c_cpp".to_string());
    }
    config
}

fn build_run_payload(language_config: &Value, params: &RunParams, with_input: bool) -> Value {
    let mut payload = json!({
        "language_config": language_config,
        "src": params.src,
        "max_cpu_time": params.max_cpu_time,
        "max_real_time": params.max_real_time(),
        "max_memory": params.max_memory_bytes(),
        "stdin": params.stdin,
        "output": true,
    });
    if with_input {
        payload["input"] = Value::String(params.stdin.clone());
    }
    payload
}

fn is_invalid_request(result: &Value) -> bool {
    result
        .get("err")
        .and_then(|err| err.as_str())
        .map(|err| err == "InvalidRequest")
        .unwrap_or(false)
}

/// Trailing whitespace stripped per line, the digest the worker compares
/// lenient outputs against.
fn strip_output_lines(data: &[u8]) -> Vec<u8> {
    let lines: Vec<&[u8]> = data
        .split(|b| *b == b'\n')
        .map(|line| {
            let mut end = line.len();
            while end > 0 && (line[end - 1] as char).is_ascii_whitespace() {
                end -= 1;
            }
            &line[..end]
        })
        .collect();
    lines.join(&b'\n')
}

fn unavailable_envelope() -> Value {
    json!({"err": true, "data": "No available judge server"})
}

fn worker_error_envelope(message: &str) -> Value {
    json!({"err": true, "data": format!("Judge server error: {message}")})
}

/// Resolves language config and judge token, leases a worker and forwards
/// the execution payload. Worker-side failures come back as 200 error
/// envelopes, matching the wire contract of the surrounding system.
pub struct ExecutionDispatcher {
    pool: &'static PgPool,
    scheduler: JudgeScheduler,
    client: Client,
    config: JudgeConfig,
}

impl ExecutionDispatcher {
    pub fn new(pool: &'static PgPool, config: JudgeConfig) -> Result<Self> {
        let client = ClientBuilder::new("judge")
            .with_timeout(WORKER_TIMEOUT)
            .with_common_interceptor()
            .build()?;
        Ok(Self {
            pool,
            scheduler: JudgeScheduler::new(pool),
            client,
            config,
        })
    }

    /// Env wins over the options table, the empty string counts as unset.
    async fn judge_server_token(&self) -> Result<String> {
        if !self.config.token.is_empty() {
            return Ok(self.config.token.clone());
        }
        let token = SysOption::get_string(self.pool, OPTION_JUDGE_SERVER_TOKEN).await?;
        match token {
            Some(token) if !token.is_empty() => Ok(token),
            _ => Err(Error::MissingToken.into()),
        }
    }

    async fn find_language_config(&self, language: &str) -> Result<Value> {
        let languages = SysOption::get_languages(self.pool).await?;
        let config = languages
            .into_iter()
            .find(|item| item.name == language)
            .map(|item| item.config);
        match config {
            Some(config) if !config.is_null() => Ok(config),
            _ => Err(Error::BadLanguage.into()),
        }
    }

    fn judge_headers(hashed_token: &str) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        let value = hashed_token
            .parse::<HeaderValue>()
            .map_err(|e| ojx_error::Error::new(e).with_category("judge").with_status(500))?;
        headers.insert(JUDGE_TOKEN_HEADER, value);
        Ok(headers)
    }

    /// Runs one submission. The worker call happens inside a spawned task,
    /// so a cancelled HTTP request cannot abandon the lease mid-flight, the
    /// task always awaits the worker response or its timeout and releases.
    pub async fn run(&'static self, params: RunParams) -> Result<Value> {
        let handle = tokio::spawn(async move { self.dispatch(params).await });
        match handle.await {
            Ok(result) => result,
            Err(e) => Err(Error::Task {
                message: e.to_string(),
            }
            .into()),
        }
    }

    async fn dispatch(&self, params: RunParams) -> Result<Value> {
        let language_config = self.find_language_config(&params.language).await?;
        let language_config = normalize_language_config(language_config);
        let token = self.judge_server_token().await?;
        let hashed_token = sha256_hex(token.as_bytes());

        let Some(lease) = self.scheduler.acquire().await? else {
            return Ok(unavailable_envelope());
        };
        let worker_id = lease.id;
        let result = self
            .call_worker(&lease, &hashed_token, &language_config, &params)
            .await;
        if let Err(e) = lease.release().await {
            // the run result is still worth returning, the leak is logged
            error!(category = "judge", id = worker_id, error = %e, "lease release failed");
        }
        match result {
            Ok(value) => Ok(value),
            // a broken deployment (no shared volume) must fail loudly
            Err(e) if e.category == "judge" => Err(e),
            Err(e) => {
                info!(category = "judge", id = worker_id, error = %e, "worker call failed");
                Ok(worker_error_envelope(&e.message))
            }
        }
    }

    async fn call_worker(
        &self,
        lease: &JudgeLease,
        hashed_token: &str,
        language_config: &Value,
        params: &RunParams,
    ) -> Result<Value> {
        let base = lease.service_url.trim_end_matches('/');
        let url = format!("{base}/run");
        let headers = Self::judge_headers(hashed_token)?;

        let payload = build_run_payload(language_config, params, true);
        let result: Value = self
            .client
            .post_with_headers(&url, &payload, headers.clone(), None)
            .await?;
        if !is_invalid_request(&result) {
            return Ok(result);
        }

        // some worker builds reject the extended payload, retry without it
        let minimal = build_run_payload(language_config, params, false);
        let result: Value = self
            .client
            .post_with_headers(&url, &minimal, headers.clone(), None)
            .await?;
        if !is_invalid_request(&result) {
            return Ok(result);
        }

        // last resort: emulate a one-case judge run
        self.run_via_judge(base, headers, language_config, params)
            .await
    }

    /// Synthesizes a single-input test bundle on the shared volume and
    /// calls the worker's batch endpoint. The bundle directories are left
    /// behind on purpose, cleanup belongs to an external sweeper.
    async fn run_via_judge(
        &self,
        base_url: &str,
        headers: HeaderMap,
        language_config: &Value,
        params: &RunParams,
    ) -> Result<Value> {
        if self.config.test_case_data_path.is_empty() {
            return Err(Error::MissingTestCasePath.into());
        }
        let case_id = random_token();
        let case_dir = Path::new(&self.config.test_case_data_path).join(&case_id);
        tokio::fs::create_dir_all(&case_dir).await.context(IoSnafu)?;

        let input_name = "1.in";
        let output_name = "1.out";
        tokio::fs::write(case_dir.join(input_name), params.stdin.as_bytes())
            .await
            .context(IoSnafu)?;
        // the expected output stays empty, output=true makes the worker
        // return the real one
        let out_bytes: &[u8] = b"";
        tokio::fs::write(case_dir.join(output_name), out_bytes)
            .await
            .context(IoSnafu)?;

        let info = json!({
            "spj": false,
            "test_cases": {
                "1": {
                    "input_name": input_name,
                    "output_name": output_name,
                    "output_md5": md5_hex(out_bytes),
                    "stripped_output_md5": md5_hex(&strip_output_lines(out_bytes)),
                }
            },
        });
        tokio::fs::write(case_dir.join("info"), info.to_string().as_bytes())
            .await
            .context(IoSnafu)?;

        let payload = json!({
            "language_config": language_config,
            "src": params.src,
            "max_cpu_time": params.max_cpu_time,
            "max_memory": params.max_memory_bytes(),
            "test_case_id": case_id,
            "output": true,
        });
        let url = format!("{base_url}/judge");
        let result = self
            .client
            .post_with_headers(&url, &payload, headers, None)
            .await?;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn params() -> RunParams {
        RunParams {
            language: "Python3".to_string(),
            src: "print(input())".to_string(),
            stdin: "42\n".to_string(),
            max_cpu_time: 5000,
            max_memory_mb: 512,
        }
    }

    #[test]
    fn run_payload_shape() {
        let config = json!({"run": {"command": "python3"}});
        let payload = build_run_payload(&config, &params(), true);
        assert_eq!(5000, payload["max_cpu_time"]);
        assert_eq!(15000, payload["max_real_time"]);
        assert_eq!(512 * 1024 * 1024, payload["max_memory"]);
        assert_eq!("42\n", payload["stdin"]);
        assert_eq!("42\n", payload["input"]);
        assert_eq!(true, payload["output"]);

        let minimal = build_run_payload(&config, &params(), false);
        assert!(minimal.get("input").is_none());
        assert_eq!("42\n", minimal["stdin"]);
    }

    #[test]
    fn real_time_has_a_floor() {
        let mut p = params();
        p.max_cpu_time = 0;
        assert_eq!(1, p.max_real_time());
        p.max_memory_mb = 0;
        assert_eq!(1024 * 1024, p.max_memory_bytes());
    }

    #[test]
    fn seccomp_object_is_replaced_by_canonical_rule() {
        let config = json!({"run": {"seccomp_rule": {"mode": "strict"}}});
        let normalized = normalize_language_config(config);
        assert_eq!("c_cpp", normalized["run"]["seccomp_rule"]);
    }

    #[test]
    fn seccomp_string_and_absent_rules_are_untouched() {
        let config = json!({"run": {"seccomp_rule": "general"}});
        let normalized = normalize_language_config(config);
        assert_eq!("general", normalized["run"]["seccomp_rule"]);

        let config = json!({"compile": {"command": "gcc"}});
        let normalized = normalize_language_config(config.clone());
        assert_eq!(config, normalized);
    }

    #[test]
    fn invalid_request_detection() {
        assert!(is_invalid_request(&json!({"err": "InvalidRequest"})));
        assert!(!is_invalid_request(&json!({"err": null, "data": {}})));
        assert!(!is_invalid_request(&json!({"err": true, "data": "boom"})));
    }

    #[test]
    fn strip_output_removes_trailing_whitespace_per_line() {
        assert_eq!(b"".to_vec(), strip_output_lines(b""));
        assert_eq!(b"a\nb".to_vec(), strip_output_lines(b"a \nb\t"));
        assert_eq!(b"a\nb".to_vec(), strip_output_lines(b"a\r\nb\r"));
    }

    #[test]
    fn envelopes_match_the_wire_contract() {
        assert_eq!(
            json!({"err": true, "data": "No available judge server"}),
            unavailable_envelope()
        );
        assert_eq!(
            json!({"err": true, "data": "Judge server error: connect timeout"}),
            worker_error_envelope("connect timeout")
        );
    }

    #[test]
    fn hashed_token_is_sha256_hex_of_raw() {
        assert_eq!(
            "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08",
            sha256_hex("test".as_bytes())
        );
    }
}
