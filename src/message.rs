//! Outbound message intent: the typed descriptor the send layer turns into
//! a wire stanza. Created transiently per send, immutable once submitted.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MediaKind {
    #[default]
    Undefined,
    Image,
    Video,
    Audio,
    Location,
    Contact,
    System,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Undefined => "undefined",
            MediaKind::Image => "image",
            MediaKind::Video => "video",
            MediaKind::Audio => "audio",
            MediaKind::Location => "location",
            MediaKind::Contact => "vcard",
            MediaKind::System => "system",
        }
    }
}

/// Identity of one message: remote party, direction, id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageKey {
    pub remote_jid: String,
    pub from_me: bool,
    pub id: String,
}

impl MessageKey {
    pub fn new(remote_jid: impl Into<String>, from_me: bool, id: impl Into<String>) -> Self {
        Self {
            remote_jid: remote_jid.into(),
            from_me,
            id: id.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MessageDescriptor {
    pub key: MessageKey,
    /// Text body, or the vcard payload for contact messages.
    pub body: String,
    pub media_kind: MediaKind,
    pub mime_type: String,
    pub file_name: String,
    pub size: u64,
    pub url: String,
    pub seconds: u32,
    /// Thumbnail or inline payload bytes.
    pub raw_bytes: Option<Vec<u8>>,
    pub latitude: f64,
    pub longitude: f64,
    pub location_name: String,
    pub location_url: String,
}

impl MessageDescriptor {
    fn base(key: MessageKey) -> Self {
        Self {
            key,
            body: String::new(),
            media_kind: MediaKind::Undefined,
            mime_type: String::new(),
            file_name: String::new(),
            size: 0,
            url: String::new(),
            seconds: 0,
            raw_bytes: None,
            latitude: 0.0,
            longitude: 0.0,
            location_name: String::new(),
            location_url: String::new(),
        }
    }

    pub fn text(to: impl Into<String>, id: impl Into<String>, body: impl Into<String>) -> Self {
        let mut msg = Self::base(MessageKey::new(to, true, id));
        msg.body = body.into();
        msg
    }

    pub fn media(to: impl Into<String>, id: impl Into<String>, kind: MediaKind) -> Self {
        let mut msg = Self::base(MessageKey::new(to, true, id));
        msg.media_kind = kind;
        msg
    }
}
