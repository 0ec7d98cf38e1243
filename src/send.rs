//! Outbound message construction: the message envelope composite, the text
//! and media payload shaping, receipts, and status updates.
//!
//! Every outgoing chat or media message rides the same envelope:
//! ```text
//! <message to=.. type="text"|"media" id="..">
//!   <x xmlns="jabber:x:event"><server/></x>
//!   <body>..</body> | <media ..>..</media>
//!   <offline/>
//! </message>
//! ```

use crate::binary::builder::NodeBuilder;
use crate::binary::node::Node;
use crate::client::Client;
use crate::codec::Codec;
use crate::consts::{EVENT_NAMESPACE, RECEIPTS_NAMESPACE};
use crate::error::ClientError;
use crate::message::{MediaKind, MessageDescriptor};
use crate::phone::to_jid;
use crate::transport::Transport;

/// Event-request child attached to every outgoing message.
fn event_request_node() -> Node {
    NodeBuilder::new("x")
        .attr("xmlns", EVENT_NAMESPACE)
        .children([NodeBuilder::new("server").build()])
        .build()
}

/// Envelope shared by text and media messages: event request, payload,
/// offline-delivery marker, in that order.
pub(crate) fn message_node(msg: &MessageDescriptor, payload: Node) -> Node {
    let message_type = if msg.media_kind == MediaKind::Undefined {
        "text"
    } else {
        "media"
    };
    NodeBuilder::new("message")
        .attr("to", msg.key.remote_jid.clone())
        .attr("type", message_type)
        .attr("id", msg.key.id.clone())
        .children([
            event_request_node(),
            payload,
            NodeBuilder::new("offline").build(),
        ])
        .build()
}

/// Shape the `media` payload node from the descriptor fields.
pub(crate) fn media_node(msg: &MessageDescriptor) -> Result<Node, ClientError> {
    if msg.media_kind == MediaKind::System {
        return Err(ClientError::InvalidMessage(
            "system messages cannot go over the network".to_string(),
        ));
    }

    let mut builder = NodeBuilder::new("media")
        .attr("xmlns", crate::consts::MMS_NAMESPACE)
        .attr("type", msg.media_kind.as_str());

    if msg.media_kind == MediaKind::Location {
        builder = builder
            .attr("latitude", msg.latitude.to_string())
            .attr("longitude", msg.longitude.to_string());
        if !msg.location_name.is_empty() {
            builder = builder.attr("name", msg.location_name.clone());
        }
        if !msg.location_url.is_empty() {
            builder = builder.attr("url", msg.location_url.clone());
        }
    } else if msg.media_kind != MediaKind::Contact
        && !msg.file_name.is_empty()
        && !msg.url.is_empty()
        && msg.size > 0
    {
        builder = builder
            .attr("file", msg.file_name.clone())
            .attr("size", msg.size.to_string())
            .attr("url", msg.url.clone());
        if msg.seconds > 0 {
            builder = builder.attr("seconds", msg.seconds.to_string());
        }
    }

    if msg.media_kind == MediaKind::Contact && !msg.file_name.is_empty() {
        let vcard = NodeBuilder::new("vcard")
            .attr("name", msg.file_name.clone())
            .bytes(msg.body.clone().into_bytes())
            .build();
        return Ok(builder.children([vcard]).build());
    }

    if let Some(data) = &msg.raw_bytes {
        builder = builder.attr("encoding", "raw").bytes(data.clone());
    }
    Ok(builder.build())
}

impl<T: Transport, C: Codec> Client<T, C> {
    /// Send a plain text message; returns the allocated message id.
    pub fn send_text(&mut self, to: &str, text: &str) -> Result<String, ClientError> {
        let msg = MessageDescriptor::text(to_jid(to), self.ids.message_id(), text);
        self.send_message(&msg)?;
        Ok(msg.key.id)
    }

    pub fn send_message(&mut self, msg: &MessageDescriptor) -> Result<(), ClientError> {
        let payload = if msg.media_kind == MediaKind::Undefined {
            NodeBuilder::new("body")
                .bytes(msg.body.clone().into_bytes())
                .build()
        } else {
            media_node(msg)?
        };
        let node = message_node(msg, payload);
        self.send_node(&node)
    }

    /// Text broadcast to several recipients through one envelope.
    pub fn send_broadcast(&mut self, to: &[&str], text: &str) -> Result<String, ClientError> {
        if to.is_empty() || text.is_empty() {
            return Err(ClientError::InvalidMessage(
                "broadcast needs recipients and a body".to_string(),
            ));
        }
        let id = self.ids.message_id();
        let targets = to
            .iter()
            .map(|jid| NodeBuilder::new("to").attr("jid", to_jid(jid)).build());
        let node = NodeBuilder::new("message")
            .attr("to", "broadcast")
            .attr("type", "chat")
            .attr("id", id.clone())
            .children([
                NodeBuilder::new("broadcast").children(targets).build(),
                event_request_node(),
                NodeBuilder::new("body")
                    .bytes(text.as_bytes().to_vec())
                    .build(),
            ])
            .build();
        self.send_node(&node)?;
        Ok(id)
    }

    /// Tell the sender we received their message.
    pub fn send_receipt(&mut self, to: &str, id: &str) -> Result<(), ClientError> {
        let node = NodeBuilder::new("receipt")
            .attr("to", to)
            .attr("id", id)
            .build();
        self.send_node(&node)
    }

    pub fn send_delivered_receipt_ack(&mut self, to: &str, id: &str) -> Result<(), ClientError> {
        self.send_receipt_ack(to, id, "delivered")
    }

    pub fn send_visible_receipt_ack(&mut self, to: &str, id: &str) -> Result<(), ClientError> {
        self.send_receipt_ack(to, id, "visible")
    }

    fn send_receipt_ack(&mut self, to: &str, id: &str, receipt_type: &str) -> Result<(), ClientError> {
        let ack = NodeBuilder::new("ack")
            .attr("xmlns", RECEIPTS_NAMESPACE)
            .attr("type", receipt_type)
            .build();
        let node = NodeBuilder::new("message")
            .attr("to", to)
            .attr("type", "chat")
            .attr("id", id)
            .children([ack])
            .build();
        self.send_node(&node)
    }

    pub fn send_notification_received(&mut self, jid: &str, id: &str) -> Result<(), ClientError> {
        let received = NodeBuilder::new("received")
            .attr("xmlns", RECEIPTS_NAMESPACE)
            .build();
        let node = NodeBuilder::new("message")
            .attr("to", jid)
            .attr("type", "notification")
            .attr("id", id)
            .children([received])
            .build();
        self.send_node(&node)
    }

    pub fn send_subject_received(&mut self, to: &str, id: &str) -> Result<(), ClientError> {
        let received = NodeBuilder::new("received")
            .attr("xmlns", RECEIPTS_NAMESPACE)
            .build();
        let node = NodeBuilder::new("message")
            .attr("to", to)
            .attr("type", "subject")
            .attr("id", id)
            .children([received])
            .build();
        self.send_node(&node)
    }

    /// Publish a new profile status line.
    pub fn send_status_update(&mut self, status: &str) -> Result<(), ClientError> {
        let msg = MessageDescriptor::text("s.us", self.ids.message_id(), status);
        self.send_message(&msg)
    }
}
