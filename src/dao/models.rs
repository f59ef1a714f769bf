//! Entities persisted by the session stores.

use std::{fmt, str::FromStr};

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lowest code handed out to a session.
pub const SESSION_ID_MIN: u16 = 1000;
/// Highest code handed out to a session.
pub const SESSION_ID_MAX: u16 = 9999;

/// Four digit code identifying a session, e.g. `"4821"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionId(String);

/// Raised when a string is not exactly four ASCII digits.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid session ID format. Must be 4 digits")]
pub struct InvalidSessionId;

impl SessionId {
    /// Draw a code uniformly from `1000..=9999`.
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self(rng.random_range(SESSION_ID_MIN..=SESSION_ID_MAX).to_string())
    }

    /// The four digits as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for SessionId {
    type Err = InvalidSessionId;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.len() == 4 && value.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(value.to_owned()))
        } else {
            Err(InvalidSessionId)
        }
    }
}

impl TryFrom<String> for SessionId {
    type Error = InvalidSessionId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SessionId> for String {
    fn from(value: SessionId) -> Self {
        value.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Persisted trivia round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEntity {
    /// Primary key.
    pub id: SessionId,
    /// Display name of the host.
    pub host_name: String,
    /// Display name of the round.
    pub session_name: String,
    /// Answers are only accepted while this is set.
    pub live: bool,
    /// Linked Google Slides presentation, if any.
    pub presentation_id: Option<String>,
    /// Index into `slide_ids` of the slide currently shown.
    pub slide_index: usize,
    /// Ordered slide object IDs, empty until first resolved.
    pub slide_ids: Vec<String>,
}

/// Fields supplied when a host opens a session.
#[derive(Debug, Clone)]
pub struct NewSessionEntity {
    /// Freshly allocated code.
    pub id: SessionId,
    /// Display name of the host.
    pub host_name: String,
    /// Display name of the round.
    pub session_name: String,
    /// Presentation to link from the start.
    pub presentation_id: Option<String>,
}

/// Partial update applied to a session row.
///
/// `presentation_id: Some(_)` replaces the link (possibly with `None`) and
/// drops the cached slide IDs along with the current index.
#[derive(Debug, Clone, Default)]
pub struct SessionChanges {
    /// New value of the live flag.
    pub live: Option<bool>,
    /// New presentation link; `Some(None)` unlinks.
    pub presentation_id: Option<Option<String>>,
}

impl SessionChanges {
    /// Whether the update would touch nothing.
    pub fn is_empty(&self) -> bool {
        self.live.is_none() && self.presentation_id.is_none()
    }
}

/// Participant of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerEntity {
    /// Surrogate key assigned by the database.
    pub id: i64,
    /// Session the player joined.
    pub session_id: SessionId,
    /// Unique within the session.
    pub name: String,
    /// Current answer, `None` until submitted or after a clear.
    pub answer: Option<String>,
}

/// Fields supplied when a player joins.
#[derive(Debug, Clone)]
pub struct NewPlayerEntity {
    /// Session to join.
    pub session_id: SessionId,
    /// Display name, unique within the session.
    pub name: String,
    /// Answer given while joining.
    pub answer: Option<String>,
}
