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

use super::{AutosaveBuffer, Error, RedisSnafu};
use futures::StreamExt;
use snafu::ResultExt;
use std::time::Duration;
use tracing::{debug, error, info, warn};

type Result<T, E = ojx_error::Error> = std::result::Result<T, E>;

// pause before re-subscribing after the pub/sub connection drops
const RESUBSCRIBE_DELAY: Duration = Duration::from_secs(1);

/// Returns the keyspace-notification channel of one redis database index.
/// The deployment must have expired-key events enabled (`notify-keyspace-events Ex`).
pub fn expired_channel(database: u32) -> String {
    format!("__keyevent@{database}__:expired")
}

/// Long-running subscriber that turns debounce-key expiries into durable
/// flushes. Single instance per deployment: a second instance would only
/// cause harmless double upserts plus an extra delete.
pub struct ExpiryListener {
    // pub/sub needs its own dedicated connection, the shared pool cannot
    // hand one out
    node: String,
    channel: String,
    buffer: &'static AutosaveBuffer,
}

impl ExpiryListener {
    pub fn new(node: &str, database: u32, buffer: &'static AutosaveBuffer) -> Self {
        Self {
            node: node.to_string(),
            channel: expired_channel(database),
            buffer,
        }
    }

    async fn handle_event(&self, key: &str) -> Result<()> {
        let Some(slot) = self.buffer.parse_debounce_key(key) else {
            debug!(category = "autosave", key, "skip: not a debounce key");
            return Ok(());
        };
        self.buffer.flush(&slot).await?;
        Ok(())
    }

    async fn listen(&self) -> Result<(), Error> {
        let client = redis::Client::open(self.node.as_str()).context(RedisSnafu)?;
        let mut pubsub = client.get_async_pubsub().await.context(RedisSnafu)?;
        pubsub.subscribe(&self.channel).await.context(RedisSnafu)?;
        info!(category = "autosave", channel = self.channel, "listener subscribed");

        let mut stream = pubsub.on_message();
        while let Some(msg) = stream.next().await {
            let key: String = match msg.get_payload() {
                Ok(key) => key,
                Err(e) => {
                    warn!(category = "autosave", error = %e, "unreadable expiry event");
                    continue;
                }
            };
            // flush failures are logged and swallowed, the data key is
            // still there and the next save cycle re-arms the debounce
            if let Err(e) = self.handle_event(&key).await {
                error!(category = "autosave", key, error = %e, "flush failed");
            }
        }
        Ok(())
    }

    /// Runs until the owning task is cancelled, re-subscribing whenever
    /// the connection drops.
    pub async fn run(&self) {
        loop {
            if let Err(e) = self.listen().await {
                error!(category = "autosave", error = %e, "listener stopped");
            } else {
                warn!(category = "autosave", "expiry stream ended, re-subscribing");
            }
            tokio::time::sleep(RESUBSCRIBE_DELAY).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::expired_channel;
    use pretty_assertions::assert_eq;

    #[test]
    fn channel_name_tracks_database_index() {
        assert_eq!("__keyevent@10__:expired", expired_channel(10));
        assert_eq!("__keyevent@1__:expired", expired_channel(1));
    }
}
