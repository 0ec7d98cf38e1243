//! Inbound stanza routing: classify each decoded unit once, then route
//! through a single exhaustive match to event emission and auto-replies.
//! Dispatch order equals arrival order and never overlaps itself.

use crate::binary::builder::NodeBuilder;
use crate::binary::node::Node;
use crate::client::Client;
use crate::codec::Codec;
use crate::error::ClientError;
use crate::events::{Event, ReceiptKind};
use crate::groups::GroupInfo;
use crate::message::MediaKind;
use crate::session::{AccountInfo, SessionPhase};
use crate::transport::Transport;
use chrono::{Duration, Utc};
use log::{error, warn};
use std::collections::HashMap;

/// Top-level routing key. Tags are matched case-insensitively; ambiguous
/// tags are resolved further down by child tag or `type` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StanzaKind {
    Challenge,
    Success,
    Failure,
    Receipt,
    Message,
    Iq,
    StreamError,
    Presence,
    Ib,
    ChatState,
    Ack,
    Notification,
}

pub(crate) fn classify(node: &Node) -> Option<StanzaKind> {
    const TABLE: &[(&str, StanzaKind)] = &[
        ("challenge", StanzaKind::Challenge),
        ("success", StanzaKind::Success),
        ("failure", StanzaKind::Failure),
        ("receipt", StanzaKind::Receipt),
        ("message", StanzaKind::Message),
        ("iq", StanzaKind::Iq),
        ("stream:error", StanzaKind::StreamError),
        ("presence", StanzaKind::Presence),
        ("ib", StanzaKind::Ib),
        ("chatstate", StanzaKind::ChatState),
        ("ack", StanzaKind::Ack),
        ("notification", StanzaKind::Notification),
    ];
    TABLE
        .iter()
        .find(|(tag, _)| node.tag_equals(tag))
        .map(|(_, kind)| *kind)
}

impl<T: Transport, C: Codec> Client<T, C> {
    /// Route one decoded inbound unit. Invoked once per unit, in strict
    /// arrival order.
    pub(crate) fn dispatch(&mut self, node: Node, auto_receipt: bool) -> Result<(), ClientError> {
        let Some(kind) = classify(&node) else {
            warn!(target: "Client/Recv", "Unknown top-level stanza: {node}");
            return Ok(());
        };

        match kind {
            StanzaKind::Challenge => {
                self.state.pending_challenge = node.payload().map(|p| p.to_vec());
                Ok(())
            }
            StanzaKind::Success => self.handle_auth_success(&node),
            StanzaKind::Failure => self.handle_auth_failure(&node),
            StanzaKind::Receipt => self.handle_receipt(&node),
            StanzaKind::Message => self.handle_message(&node, auto_receipt),
            StanzaKind::Iq => self.handle_iq(&node),
            StanzaKind::StreamError => {
                if let Some(text) = node.get_optional_child("text") {
                    error!(target: "Client/Recv", "Stream error: {}", text.payload_string());
                } else {
                    error!(target: "Client/Recv", "Stream error: {node}");
                }
                self.disconnect();
                Ok(())
            }
            StanzaKind::Presence => {
                self.emit(Event::Presence {
                    from: node.attr_or_empty("from").to_string(),
                    kind: node.attr("type").map(str::to_string),
                });
                Ok(())
            }
            StanzaKind::Ib => self.handle_ib(&node),
            StanzaKind::ChatState => self.handle_chatstate(&node),
            StanzaKind::Ack => {
                if node.attr("class") == Some("message") {
                    self.emit(Event::ServerAck {
                        from: node.attr_or_empty("from").to_string(),
                        id: node.attr_or_empty("id").to_string(),
                    });
                }
                Ok(())
            }
            StanzaKind::Notification => self.handle_notification(&node),
        }
    }

    fn handle_auth_success(&mut self, node: &Node) -> Result<(), ClientError> {
        self.state.phase = SessionPhase::LoggedIn;
        self.state.account_info = Some(AccountInfo {
            status: node.attr_or_empty("status").to_string(),
            kind: node.attr_or_empty("kind").to_string(),
            creation: node.attr_or_empty("creation").to_string(),
            expiration: node.attr_or_empty("expiration").to_string(),
        });
        let phone_number = self.config.phone_number.clone();
        self.emit(Event::LoginSuccess {
            phone_number,
            payload: node.payload().map(|p| p.to_vec()),
        });
        Ok(())
    }

    fn handle_auth_failure(&mut self, node: &Node) -> Result<(), ClientError> {
        self.state.phase = SessionPhase::Unauthorized;
        let reason = node
            .first_child()
            .map(|c| c.tag.clone())
            .unwrap_or_else(|| "unknown".to_string());
        self.state.last_failure = Some(reason.clone());
        self.emit(Event::LoginFailure { reason });
        Ok(())
    }

    fn handle_receipt(&mut self, node: &Node) -> Result<(), ClientError> {
        let from = node.attr_or_empty("from").to_string();
        let id = node.attr_or_empty("id").to_string();
        let receipt_type = node.attr("type").unwrap_or("delivery").to_string();
        let kind = match receipt_type.as_str() {
            "delivery" => Some(ReceiptKind::Delivered),
            "read" => Some(ReceiptKind::Read),
            "played" => Some(ReceiptKind::Played),
            _ => None,
        };
        if let Some(kind) = kind {
            self.emit(Event::Receipt { from, id, kind });
        }
        self.send_stanza_ack(node, Some(&receipt_type))
    }

    fn handle_message(&mut self, node: &Node, auto_receipt: bool) -> Result<(), ClientError> {
        let from = node.attr_or_empty("from").to_string();
        let id = node.attr_or_empty("id").to_string();

        let notify = node.attr_or_empty("notify").to_string();
        if !notify.is_empty() {
            self.emit(Event::ContactName {
                from: from.clone(),
                name: notify.clone(),
            });
        }

        if node.attr("type") == Some("error") {
            return Err(ClientError::UnsupportedStanza(node.to_string()));
        }

        if let Some(body) = node.get_optional_child("body") {
            self.emit(Event::TextMessage {
                from: from.clone(),
                id: id.clone(),
                notify,
                body: body.payload_string(),
            });
            if auto_receipt {
                self.send_receipt(&from, &id)?;
            }
        }

        if let Some(media) = node.get_optional_child("media") {
            self.handle_media(&from, &id, media)?;
            // Media messages are always receipted, independent of the
            // auto-receipt setting.
            self.send_receipt(&from, &id)?;
        }

        Ok(())
    }

    fn handle_media(&mut self, from: &str, id: &str, media: &Node) -> Result<(), ClientError> {
        let preview = media.payload().map(|p| p.to_vec());
        match media.attr_or_empty("type") {
            kind @ ("image" | "audio" | "video") => {
                let kind = match kind {
                    "image" => MediaKind::Image,
                    "audio" => MediaKind::Audio,
                    _ => MediaKind::Video,
                };
                self.emit(Event::FileMessage {
                    kind,
                    from: from.to_string(),
                    id: id.to_string(),
                    file: media.attr_or_empty("file").to_string(),
                    size: media.attr_u64("size").unwrap_or(0),
                    url: media.attr_or_empty("url").to_string(),
                    preview,
                });
            }
            "location" => {
                self.emit(Event::LocationMessage {
                    from: from.to_string(),
                    id: id.to_string(),
                    latitude: media.attr_f64("latitude").unwrap_or(0.0),
                    longitude: media.attr_f64("longitude").unwrap_or(0.0),
                    name: media.attr_or_empty("name").to_string(),
                    url: media.attr_or_empty("url").to_string(),
                    preview,
                });
            }
            "vcard" => {
                if let Some(vcard) = media.get_optional_child("vcard") {
                    self.emit(Event::ContactMessage {
                        from: from.to_string(),
                        id: id.to_string(),
                        name: vcard.attr_or_empty("name").to_string(),
                        vcard: vcard.payload().map(|p| p.to_vec()).unwrap_or_default(),
                    });
                }
            }
            other => {
                warn!(target: "Client/Recv", "Unhandled media type '{other}' from {from}");
            }
        }
        Ok(())
    }

    /// The iq checks are sequential and independent; later checks assume
    /// earlier ones already ran.
    fn handle_iq(&mut self, node: &Node) -> Result<(), ClientError> {
        let iq_type = node.attr_or_empty("type");
        let from = node.attr_or_empty("from").to_string();
        let first_child = node.first_child();

        if iq_type == "error"
            && let Some(err) = node.get_optional_child("error")
        {
            self.emit(Event::IqError {
                id: node.attr_or_empty("id").to_string(),
                from: from.clone(),
                code: err.attr_u64("code").unwrap_or(0) as u16,
                text: err.attr_or_empty("text").to_string(),
            });
        }

        if let Some(sync) = node.get_optional_child("sync") {
            self.handle_sync_result(sync);
        }

        if iq_type.eq_ignore_ascii_case("result")
            && let Some(query) = first_child.filter(|c| c.tag == "query")
            && query.attr("xmlns") == Some(crate::consts::LAST_NAMESPACE)
        {
            let seconds = query.attr_i64("seconds").unwrap_or(0);
            self.emit(Event::LastSeen {
                from: from.clone(),
                at: Utc::now() - Duration::seconds(seconds),
            });
        }

        if iq_type.eq_ignore_ascii_case("result")
            && first_child.is_some_and(|c| c.tag_equals("media") || c.tag_equals("duplicate"))
        {
            // Registration result for a pending upload; the orchestrator
            // picks it up by request id.
            let id = node.attr_or_empty("id").to_string();
            self.state.upload_responses.insert(id, node.clone());
        }

        if iq_type.eq_ignore_ascii_case("result")
            && let Some(picture) = first_child.filter(|c| c.tag_equals("picture"))
        {
            let id = picture.attr_or_empty("id").to_string();
            let bytes = picture.payload().map(|p| p.to_vec()).unwrap_or_default();
            if picture.attr("type") == Some("preview") {
                self.emit(Event::PhotoPreview {
                    from: from.clone(),
                    id,
                    bytes,
                });
            } else {
                self.emit(Event::Photo {
                    from: from.clone(),
                    id,
                    bytes,
                });
            }
        }

        if iq_type.eq_ignore_ascii_case("get")
            && first_child.is_some_and(|c| c.tag_equals("ping"))
        {
            self.send_pong(node.attr_or_empty("id"))?;
        }

        if iq_type.eq_ignore_ascii_case("result")
            && first_child.is_some_and(|c| c.tag_equals("group"))
        {
            let groups: Vec<GroupInfo> = node
                .get_children_by_tag("group")
                .map(GroupInfo::from_node)
                .collect();
            self.emit(Event::Groups(groups));
        }

        if iq_type.eq_ignore_ascii_case("result")
            && first_child.is_some_and(|c| c.tag_equals("participant"))
        {
            let jids: Vec<String> = node
                .get_children_by_tag("participant")
                .filter_map(|p| p.attr("jid"))
                .filter(|jid| !jid.is_empty())
                .map(str::to_string)
                .collect();
            self.emit(Event::Participants { group: from, jids });
        }

        Ok(())
    }

    fn handle_sync_result(&mut self, sync: &Node) {
        let mut existing = HashMap::new();
        if let Some(matched) = sync.get_optional_child("in") {
            for user in matched.children().unwrap_or_default() {
                existing.insert(
                    user.payload_string(),
                    user.attr_or_empty("jid").to_string(),
                );
            }
        }
        let mut missing = Vec::new();
        if let Some(unmatched) = sync.get_optional_child("out") {
            for user in unmatched.children().unwrap_or_default() {
                missing.push(user.payload_string());
            }
        }
        self.emit(Event::SyncResult {
            index: sync.attr_i64("index").unwrap_or(0) as i32,
            sid: sync.attr_or_empty("sid").to_string(),
            existing,
            missing,
        });
    }

    fn handle_ib(&mut self, node: &Node) -> Result<(), ClientError> {
        for child in node.children().unwrap_or_default() {
            match child.tag.as_str() {
                "dirty" => {
                    let category = child.attr_or_empty("type").to_string();
                    self.send_clear_dirty(&[&category])?;
                }
                "offline" => {}
                _ => return Err(ClientError::UnsupportedStanza(node.to_string())),
            }
        }
        Ok(())
    }

    fn handle_chatstate(&mut self, node: &Node) -> Result<(), ClientError> {
        let from = node.attr_or_empty("from").to_string();
        match node.first_child().map(|c| c.tag.as_str()) {
            Some("composing") => {
                self.emit(Event::Typing { from });
                Ok(())
            }
            Some("paused") => {
                self.emit(Event::TypingPaused { from });
                Ok(())
            }
            _ => Err(ClientError::UnsupportedStanza(node.to_string())),
        }
    }

    fn handle_notification(&mut self, node: &Node) -> Result<(), ClientError> {
        let from = node.attr_or_empty("from").to_string();
        let notify = node.attr_or_empty("notify");
        if !notify.is_empty() {
            self.emit(Event::ContactName {
                from: from.clone(),
                name: notify.to_string(),
            });
        }
        match node.attr_or_empty("type") {
            "picture" => {
                if let Some(child) = node.first_child() {
                    self.emit(Event::PictureNotification {
                        kind: child.tag.clone(),
                        jid: child.attr_or_empty("jid").to_string(),
                        id: child.attr_or_empty("id").to_string(),
                    });
                }
            }
            "status" => {
                if let Some(child) = node.first_child() {
                    self.emit(Event::StatusUpdate {
                        from: from.clone(),
                        status: child.payload_string(),
                    });
                }
            }
            _ => return Err(ClientError::UnsupportedStanza(node.to_string())),
        }
        self.send_stanza_ack(node, None)
    }

    /// Ack mirroring the inbound stanza: `from`→`to`, optional
    /// `participant`, `class` = the stanza's tag, same id and type.
    fn send_stanza_ack(&mut self, node: &Node, type_override: Option<&str>) -> Result<(), ClientError> {
        let ack_type = match type_override {
            Some(t) => t.to_string(),
            None => node.attr_or_empty("type").to_string(),
        };
        let mut builder = NodeBuilder::new("ack");
        if let Some(to) = node.attr("to").filter(|to| !to.is_empty()) {
            builder = builder.attr("from", to);
        }
        if let Some(participant) = node.attr("participant").filter(|p| !p.is_empty()) {
            builder = builder.attr("participant", participant);
        }
        let ack = builder
            .attr("to", node.attr_or_empty("from"))
            .attr("class", node.tag.clone())
            .attr("id", node.attr_or_empty("id"))
            .attr("type", ack_type)
            .build();
        self.send_node(&ack)
    }
}
