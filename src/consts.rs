//! Protocol constants: server endpoints, client identity, and the stanza
//! namespaces used by the outbound builders.

pub const SERVER_DOMAIN: &str = "s.whatsapp.net";
pub const GROUP_DOMAIN: &str = "g.us";
pub const SERVER_PORT: u16 = 443;

pub const DEVICE: &str = "S40";
pub const CLIENT_VERSION: &str = "2.12.81";
pub const USER_AGENT: &str = "WhatsApp/2.12.81 S40Version/14.26 Device/Nokia302";

pub const AUTH_MECHANISM: &str = "WAUTH-2";

pub const SASL_NAMESPACE: &str = "urn:ietf:params:xml:ns:xmpp-sasl";
pub const EVENT_NAMESPACE: &str = "jabber:x:event";
pub const LAST_NAMESPACE: &str = "jabber:iq:last";
pub const PRIVACY_NAMESPACE: &str = "jabber:iq:privacy";
pub const ROSTER_NAMESPACE: &str = "jabber:iq:roster";
pub const RECEIPTS_NAMESPACE: &str = "urn:xmpp:receipts";
pub const MMS_NAMESPACE: &str = "urn:xmpp:whatsapp:mms";
pub const SYNC_NAMESPACE: &str = "urn:xmpp:whatsapp:sync";
pub const DIRTY_NAMESPACE: &str = "urn:xmpp:whatsapp:dirty";
pub const PUSH_NAMESPACE: &str = "urn:xmpp:whatsapp:push";
pub const ACCOUNT_NAMESPACE: &str = "urn:xmpp:whatsapp:account";
pub const MEDIA_NAMESPACE: &str = "w:m";
pub const GROUP_NAMESPACE: &str = "w:g";
pub const PING_NAMESPACE: &str = "w:p";
pub const PROFILE_PICTURE_NAMESPACE: &str = "w:profile:picture";
pub const PROPS_NAMESPACE: &str = "w";
pub const STATUS_NAMESPACE: &str = "status";
