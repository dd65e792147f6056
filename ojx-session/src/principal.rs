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
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use serde::{Deserialize, Serialize};

static ADMIN_TYPE_REGULAR_USER: &str = "Regular User";
static ADMIN_TYPE_SUPER_ADMIN: &str = "Super Admin";

/// The authenticated user identity carried with every privileged request.
/// Minted by the sso exchange, cached in the session store, never mutated
/// in place.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Principal {
    pub user_id: i32,
    pub username: String,
    #[serde(default)]
    pub avatar: String,
    pub admin_type: String,
}

impl Principal {
    /// Role gate: Super Admin bypasses every gate, everyone else must be
    /// on the allow-list.
    pub fn authorize(&self, allowed: &[&str]) -> Result<(), Error> {
        if self.admin_type == ADMIN_TYPE_SUPER_ADMIN {
            return Ok(());
        }
        if allowed.iter().any(|role| *role == self.admin_type) {
            return Ok(());
        }
        Err(Error::Forbidden)
    }
}

// The authenticate middleware resolves the session and stores the principal
// in request extensions, the extractor only hands it out.
impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = ojx_error::Error;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let principal = parts
            .extensions
            .get::<Principal>()
            .ok_or(Error::NotAuthenticated)?;
        Ok(principal.clone())
    }
}

/// Extractor wrapper gating handlers to regular users (and, implicitly,
/// Super Admin).
pub struct RegularUser(pub Principal);

impl<S> FromRequestParts<S> for RegularUser
where
    S: Send + Sync,
{
    type Rejection = ojx_error::Error;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let principal = Principal::from_request_parts(parts, state).await?;
        principal.authorize(&[ADMIN_TYPE_REGULAR_USER])?;
        Ok(RegularUser(principal))
    }
}

impl std::ops::Deref for RegularUser {
    type Target = Principal;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn principal(admin_type: &str) -> Principal {
        Principal {
            user_id: 7,
            username: "alice".to_string(),
            avatar: "/img/avatar.png".to_string(),
            admin_type: admin_type.to_string(),
        }
    }

    #[test]
    fn super_admin_passes_every_gate() {
        let p = principal("Super Admin");
        assert!(p.authorize(&["Regular User"]).is_ok());
        assert!(p.authorize(&["Admin"]).is_ok());
        assert!(p.authorize(&[]).is_ok());
    }

    #[test]
    fn allow_list_is_enforced_for_others() {
        let p = principal("Regular User");
        assert!(p.authorize(&["Regular User"]).is_ok());
        assert!(matches!(p.authorize(&["Admin"]), Err(Error::Forbidden)));

        let p = principal("Admin");
        assert!(p.authorize(&["Admin", "Regular User"]).is_ok());
        assert!(matches!(p.authorize(&["Regular User"]), Err(Error::Forbidden)));
    }

    #[test]
    fn principal_round_trips_through_json() {
        let p = principal("Regular User");
        let buf = serde_json::to_vec(&p).unwrap();
        let parsed: Principal = serde_json::from_slice(&buf).unwrap();
        assert_eq!(p.user_id, parsed.user_id);
        assert_eq!(p.username, parsed.username);
        assert_eq!(p.admin_type, parsed.admin_type);
    }
}
