//! Presence broadcasts and subscription management.

use crate::binary::builder::NodeBuilder;
use crate::client::Client;
use crate::codec::Codec;
use crate::error::ClientError;
use crate::phone::to_jid;
use crate::transport::Transport;
use log::debug;

impl<T: Transport, C: Codec> Client<T, C> {
    /// Announce availability under the configured nickname. A hidden
    /// session announces itself passively.
    pub fn send_available(&mut self) -> Result<(), ClientError> {
        let mut builder = NodeBuilder::new("presence").attr("name", self.config.nickname.clone());
        if self.config.hidden {
            builder = builder.attr("type", "passive");
        }
        let node = builder.build();
        debug!(target: "Client/Send", "Announcing presence as '{}'", self.config.nickname);
        self.send_node(&node)
    }

    pub fn send_unavailable(&mut self) -> Result<(), ClientError> {
        let node = NodeBuilder::new("presence")
            .attr("type", "unavailable")
            .build();
        self.send_node(&node)
    }

    pub fn send_active(&mut self) -> Result<(), ClientError> {
        let node = NodeBuilder::new("presence").attr("type", "active").build();
        self.send_node(&node)
    }

    pub fn send_inactive(&mut self) -> Result<(), ClientError> {
        let node = NodeBuilder::new("presence")
            .attr("type", "inactive")
            .build();
        self.send_node(&node)
    }

    /// Ask to see a contact's presence updates.
    pub fn send_presence_subscription(&mut self, to: &str) -> Result<(), ClientError> {
        let node = NodeBuilder::new("presence")
            .attr("type", "subscribe")
            .attr("to", to_jid(to))
            .build();
        self.send_node(&node)
    }

    pub fn send_unsubscribe_me(&mut self, jid: &str) -> Result<(), ClientError> {
        let node = NodeBuilder::new("presence")
            .attr("type", "unsubscribe")
            .attr("to", jid)
            .build();
        self.send_node(&node)
    }

    pub fn send_unsubscribe_him(&mut self, jid: &str) -> Result<(), ClientError> {
        let node = NodeBuilder::new("presence")
            .attr("type", "unsubscribed")
            .attr("to", jid)
            .build();
        self.send_node(&node)
    }
}
