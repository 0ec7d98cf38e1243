//! Session state: the connection phase plus the few pieces of mutable
//! state the handshake and the dispatcher share.

use crate::binary::node::Node;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    Disconnected,
    Connected,
    LoggedIn,
    Unauthorized,
}

/// Account metadata from a successful login, replaced wholesale on each
/// subsequent login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountInfo {
    pub status: String,
    pub kind: String,
    pub creation: String,
    pub expiration: String,
}

#[derive(Debug, Default)]
pub struct SessionState {
    pub phase: SessionPhase,
    /// Server-issued nonce awaiting consumption by the handshake.
    pub pending_challenge: Option<Vec<u8>>,
    pub account_info: Option<AccountInfo>,
    /// Reason tag of the last login failure, for the handshake's error path.
    pub(crate) last_failure: Option<String>,
    /// Completed media-registration responses, keyed by request id. The
    /// dispatcher fills this; the upload orchestrator drains it.
    pub(crate) upload_responses: HashMap<String, Node>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connected or logged in; sends and polls are no-ops otherwise.
    pub fn is_online(&self) -> bool {
        matches!(
            self.phase,
            SessionPhase::Connected | SessionPhase::LoggedIn
        )
    }

    /// One-way teardown on transport fault or explicit close.
    pub(crate) fn teardown(&mut self) {
        self.phase = SessionPhase::Disconnected;
        self.pending_challenge = None;
        self.upload_responses.clear();
    }
}
