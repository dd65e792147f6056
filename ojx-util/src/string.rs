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

use md5::Md5;
use sha2::{Digest, Sha256};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::{NoContext, Timestamp, Uuid};

/// Time-ordered uuid, used for trace ids.
pub fn uuid() -> String {
    let d = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    let ts = Timestamp::from_unix(NoContext, d.as_secs(), d.subsec_nanos());
    Uuid::new_v7(ts).to_string()
}

/// Random 128-bit token rendered as 32 hex chars, used for opaque
/// session tokens and test-case bundle ids. Not time-ordered on purpose.
pub fn random_token() -> String {
    Uuid::new_v4().simple().to_string()
}

pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

pub fn md5_hex(data: &[u8]) -> String {
    let mut hasher = Md5::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn sha256_hex_matches_known_vector() {
        assert_eq!(
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824",
            sha256_hex(b"hello")
        );
    }

    #[test]
    fn md5_hex_matches_known_vector() {
        // md5 of the empty string, the emulated test-case bundle relies on it
        assert_eq!("d41d8cd98f00b204e9800998ecf8427e", md5_hex(b""));
        assert_eq!("5d41402abc4b2a76b9719d911017c592", md5_hex(b"hello"));
    }

    #[test]
    fn random_token_is_simple_hex() {
        let token = random_token();
        assert_eq!(32, token.len());
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
