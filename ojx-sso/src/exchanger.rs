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

use super::Error;
use ojx_model::User;
use ojx_request::{Client, ClientBuilder, Error as RequestError};
use ojx_session::{Principal, SessionStore};
use ojx_util::random_token;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::time::Duration;
use tracing::{info, warn};

type Result<T, E = ojx_error::Error> = std::result::Result<T, E>;

// the identity provider can be slow right after a cold start, so transport
// failures are retried with a growing pause before giving up
const RETRY_ATTEMPTS: usize = 3;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(8);
const TOTAL_TIMEOUT: Duration = Duration::from_secs(15);

/// Pause before re-attempting introspection: 1.5s after the first failure,
/// 3s after the second.
fn retry_delay(attempt: usize) -> Duration {
    Duration::from_millis(1500 * (attempt as u64 + 1))
}

#[derive(Debug, Clone, Serialize)]
struct IntrospectParams<'a> {
    token: &'a str,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct SsoUserData {
    #[serde(default)]
    username: String,
    #[serde(default)]
    avatar: String,
    #[serde(default)]
    admin_type: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct IntrospectResp {
    data: Option<SsoUserData>,
}

/// A freshly minted local token and its ttl, the ingress layer turns it
/// into a cookie.
#[derive(Debug, Clone)]
pub struct MintedToken {
    pub token: String,
    pub ttl: Duration,
}

/// Exchanges an upstream sso token for a service-local opaque token.
/// One outbound call with retries, then a principal is resolved against
/// the durable user store and cached in the session store.
pub struct SsoExchanger {
    client: Client,
    introspect_url: String,
    store: &'static SessionStore,
    pool: &'static PgPool,
}

impl SsoExchanger {
    pub fn new(
        introspect_url: &str,
        store: &'static SessionStore,
        pool: &'static PgPool,
    ) -> Result<Self> {
        let client = ClientBuilder::new("sso")
            .with_connect_timeout(CONNECT_TIMEOUT)
            .with_timeout(TOTAL_TIMEOUT)
            .with_common_interceptor()
            .build()?;
        Ok(Self {
            client,
            introspect_url: introspect_url.to_string(),
            store,
            pool,
        })
    }

    async fn introspect(&self, sso_token: &str) -> Result<IntrospectResp> {
        let params = IntrospectParams { token: sso_token };
        for attempt in 0..RETRY_ATTEMPTS {
            match self
                .client
                .post::<_, IntrospectResp>(&self.introspect_url, &params)
                .await
            {
                Ok(resp) => return Ok(resp),
                // the upstream answered, authentication failed for good
                Err(RequestError::Status { status, .. }) => {
                    info!(category = "sso", status, "introspection rejected");
                    return Err(Error::Unauthorized.into());
                }
                // transport failure, worth retrying
                Err(RequestError::Request { .. }) if attempt + 1 < RETRY_ATTEMPTS => {
                    warn!(category = "sso", attempt, "introspection transport error");
                    tokio::time::sleep(retry_delay(attempt)).await;
                }
                Err(RequestError::Request { .. }) => {
                    return Err(Error::Unavailable.into());
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(Error::Unavailable.into())
    }

    /// Validates the upstream token and mints a local one. The principal is
    /// cached under the new token with the store's ttl.
    pub async fn exchange(&self, sso_token: &str) -> Result<MintedToken> {
        if self.introspect_url.is_empty() {
            return Err(Error::NotConfigured.into());
        }
        let resp = self.introspect(sso_token).await?;
        let Some(data) = resp.data else {
            return Err(Error::Unauthorized.into());
        };
        if data.username.is_empty() {
            return Err(Error::Unauthorized.into());
        }
        // the upstream identity must resolve to a known local user
        let Some(user) = User::get_by_username(self.pool, &data.username).await? else {
            return Err(Error::Unauthorized.into());
        };

        let principal = Principal {
            user_id: user.id,
            username: data.username,
            avatar: data.avatar,
            admin_type: data.admin_type,
        };
        let token = random_token();
        let ttl = self.store.ttl();
        self.store.put(&token, &principal, ttl).await?;
        info!(
            category = "sso",
            user_id = principal.user_id,
            username = principal.username,
            "local token minted"
        );
        Ok(MintedToken { token, ttl })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn retry_delay_grows_linearly() {
        assert_eq!(Duration::from_millis(1500), retry_delay(0));
        assert_eq!(Duration::from_millis(3000), retry_delay(1));
        assert_eq!(Duration::from_millis(4500), retry_delay(2));
    }

    #[test]
    fn introspect_resp_tolerates_partial_payloads() {
        let resp: IntrospectResp = serde_json::from_str(r#"{"data":null}"#).unwrap();
        assert!(resp.data.is_none());

        let resp: IntrospectResp =
            serde_json::from_str(r#"{"data":{"username":"alice","admin_type":"Regular User"}}"#)
                .unwrap();
        let data = resp.data.unwrap();
        assert_eq!("alice", data.username);
        assert_eq!("", data.avatar);
        assert_eq!("Regular User", data.admin_type);

        let resp: IntrospectResp = serde_json::from_str(r#"{"data":{}}"#).unwrap();
        assert_eq!("", resp.data.unwrap().username);
    }
}
