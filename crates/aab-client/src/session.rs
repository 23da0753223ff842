// ABOUTME: Session registry client: lists existing sessions and mints unique ids.
// ABOUTME: Ids are random 8-digit decimal strings compared by their integer value.

use std::collections::HashSet;
use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::backend::Middleware;
use crate::error::ClientError;

/// Number of decimal digits drawn for a new session id.
pub const SESSION_ID_DIGITS: usize = 8;

/// Server-side conversation context identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(u32);

impl SessionId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// Parse a decimal digit string. `"00000001"` and `"1"` are the same id.
    pub fn from_digits(digits: &str) -> Option<Self> {
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok().map(Self)
    }

    /// Value carried in the `int32` wire field.
    pub fn to_wire(self) -> Result<i32, ClientError> {
        i32::try_from(self.0)
            .map_err(|_| ClientError::Validation(format!("session id {} out of range", self.0)))
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Deserialize)]
struct HistoryEntry {
    sid: i64,
}

/// Decode a GetChatHistory payload into the set of known session ids.
///
/// Entries whose `sid` does not fit the id space are ignored: they can never
/// collide with a minted id.
pub fn parse_history(data: &str) -> Result<HashSet<SessionId>, ClientError> {
    let entries: Vec<HistoryEntry> = serde_json::from_str(data)
        .map_err(|e| ClientError::Protocol(format!("chat history: {e}")))?;
    Ok(entries
        .into_iter()
        .filter_map(|entry| u32::try_from(entry.sid).ok().map(SessionId))
        .collect())
}

/// Fetch the ids of every session the backend currently reports.
pub async fn list_sessions<M>(backend: &M) -> Result<HashSet<SessionId>, ClientError>
where
    M: Middleware + ?Sized,
{
    let response = backend
        .get_chat_history()
        .await
        .map_err(ClientError::rpc("GetChatHistory"))?;
    parse_history(&response.data)
}

/// Draw [`SESSION_ID_DIGITS`] random decimal digits.
pub fn draw_digits<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..SESSION_ID_DIGITS)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

/// Rejection-sample an id absent from `existing`.
///
/// Unbounded, but the 10^8 id space makes more than one draw unlikely for any
/// realistic history size.
pub fn mint_session_id_with<R: Rng + ?Sized>(
    existing: &HashSet<SessionId>,
    rng: &mut R,
) -> SessionId {
    loop {
        let digits = draw_digits(rng);
        if let Some(id) = SessionId::from_digits(&digits) {
            if !existing.contains(&id) {
                return id;
            }
            tracing::debug!(%id, "session id collision, redrawing");
        }
    }
}

/// Mint a new id using the thread-local RNG.
pub fn new_session_id(existing: &HashSet<SessionId>) -> SessionId {
    mint_session_id_with(existing, &mut rand::thread_rng())
}

/// List existing sessions, then mint an id absent from them.
///
/// Nothing is reserved server-side: another client could mint the same id
/// between the listing and its first chat call.
pub async fn init_session<M>(backend: &M) -> Result<SessionId, ClientError>
where
    M: Middleware + ?Sized,
{
    let existing = list_sessions(backend).await?;
    let id = new_session_id(&existing);
    tracing::debug!(%id, known = existing.len(), "minted session id");
    Ok(id)
}
