//! Inbound results as one tagged event type, fanned out to registered
//! handlers in dispatch order.

use crate::groups::GroupInfo;
use crate::message::MediaKind;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Target-side receipt variants carried on a `receipt` stanza.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiptKind {
    Delivered,
    Read,
    Played,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    LoginSuccess {
        phone_number: String,
        payload: Option<Vec<u8>>,
    },
    LoginFailure {
        reason: String,
    },

    Receipt {
        from: String,
        id: String,
        kind: ReceiptKind,
    },
    /// Server-side ack for an outgoing message.
    ServerAck {
        from: String,
        id: String,
    },

    TextMessage {
        from: String,
        id: String,
        notify: String,
        body: String,
    },
    /// Image, audio or video message; the three share one shape.
    FileMessage {
        kind: MediaKind,
        from: String,
        id: String,
        file: String,
        size: u64,
        url: String,
        preview: Option<Vec<u8>>,
    },
    LocationMessage {
        from: String,
        id: String,
        latitude: f64,
        longitude: f64,
        name: String,
        url: String,
        preview: Option<Vec<u8>>,
    },
    ContactMessage {
        from: String,
        id: String,
        name: String,
        vcard: Vec<u8>,
    },
    /// Display name advertised by a contact alongside a message or
    /// notification.
    ContactName {
        from: String,
        name: String,
    },

    Typing {
        from: String,
    },
    TypingPaused {
        from: String,
    },
    Presence {
        from: String,
        kind: Option<String>,
    },
    LastSeen {
        from: String,
        at: DateTime<Utc>,
    },
    StatusUpdate {
        from: String,
        status: String,
    },

    IqError {
        id: String,
        from: String,
        code: u16,
        text: String,
    },
    SyncResult {
        index: i32,
        sid: String,
        /// Decoded number text to matched JID.
        existing: HashMap<String, String>,
        /// Numbers without an account.
        missing: Vec<String>,
    },

    Photo {
        from: String,
        id: String,
        bytes: Vec<u8>,
    },
    PhotoPreview {
        from: String,
        id: String,
        bytes: Vec<u8>,
    },
    /// A contact changed (or removed) their profile picture.
    PictureNotification {
        kind: String,
        jid: String,
        id: String,
    },

    Groups(Vec<GroupInfo>),
    Participants {
        group: String,
        jids: Vec<String>,
    },
}

/// Registered event consumer. Handlers run synchronously, in registration
/// order, on the thread driving the poll loop.
pub type EventHandler = Box<dyn FnMut(&Event)>;
