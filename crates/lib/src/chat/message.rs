//! Chat message records and identifier generation.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    clock::Clock,
    constants::{WELCOME_MESSAGE, WELCOME_MESSAGE_ID},
};

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Length of the random suffix on generated ids.
const ID_SUFFIX_LEN: usize = 9;

/// Who wrote a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// One entry in the conversation.
///
/// Serializes to the storage format: camelCase keys, ISO-8601 timestamp with
/// millisecond precision, and `isLoading` omitted unless set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub text: String,
    pub sender: Sender,
    #[serde(with = "iso8601")]
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_loading: bool,
}

impl ChatMessage {
    /// A message from the user.
    pub fn user(text: impl Into<String>, clock: &dyn Clock) -> Self {
        Self::generated("user", text, Sender::User, clock)
    }

    /// A message from the bot.
    pub fn bot(text: impl Into<String>, clock: &dyn Clock) -> Self {
        Self::generated("bot", text, Sender::Bot, clock)
    }

    /// The bot message shown when a send fails.
    pub fn error(text: impl Into<String>, clock: &dyn Clock) -> Self {
        Self::generated("error", text, Sender::Bot, clock)
    }

    /// The "bot is responding" placeholder.
    pub fn loading(clock: &dyn Clock) -> Self {
        Self {
            is_loading: true,
            ..Self::generated("loading", "", Sender::Bot, clock)
        }
    }

    /// The fixed welcome message injected when the chat opens on an empty history.
    pub fn welcome(clock: &dyn Clock) -> Self {
        Self::new(WELCOME_MESSAGE_ID, WELCOME_MESSAGE, Sender::Bot, clock.now())
    }

    /// A message whose id embeds its own timestamp.
    fn generated(prefix: &str, text: impl Into<String>, sender: Sender, clock: &dyn Clock) -> Self {
        let timestamp = clock.now();
        let id = id_at(prefix, timestamp.timestamp_millis());
        Self::new(id, text, sender, timestamp)
    }

    fn new(
        id: impl Into<String>,
        text: impl Into<String>,
        sender: Sender,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            sender,
            timestamp,
            is_loading: false,
        }
    }
}

/// Random lowercase base-36 string of `len` characters.
pub fn random_suffix(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect()
}

/// `<prefix>_<epoch millis>_<random suffix>`.
pub fn generate_id(prefix: &str, clock: &dyn Clock) -> String {
    id_at(prefix, clock.now_millis())
}

fn id_at(prefix: &str, millis: impl std::fmt::Display) -> String {
    format!("{prefix}_{millis}_{}", random_suffix(ID_SUFFIX_LEN))
}

/// A fresh chat session id.
pub fn generate_session_id(clock: &dyn Clock) -> String {
    generate_id("session", clock)
}

/// ISO-8601 timestamps with millisecond precision and a `Z` suffix.
mod iso8601 {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
