//! Ping/pong and dirty-state housekeeping.

use crate::binary::builder::NodeBuilder;
use crate::client::Client;
use crate::codec::Codec;
use crate::consts::{DIRTY_NAMESPACE, PING_NAMESPACE, SERVER_DOMAIN};
use crate::error::ClientError;
use crate::transport::Transport;

impl<T: Transport, C: Codec> Client<T, C> {
    pub fn send_ping(&mut self) -> Result<(), ClientError> {
        let id = self.ids.next("ping_");
        let ping = NodeBuilder::new("ping").attr("xmlns", PING_NAMESPACE).build();
        let node = NodeBuilder::new("iq")
            .attr("id", id)
            .attr("type", "get")
            .children([ping])
            .build();
        self.send_node(&node)
    }

    /// Answer a server ping, echoing its request id.
    pub fn send_pong(&mut self, id: &str) -> Result<(), ClientError> {
        let node = NodeBuilder::new("iq")
            .attr("type", "result")
            .attr("to", SERVER_DOMAIN)
            .attr("id", id)
            .build();
        self.send_node(&node)
    }

    /// Acknowledge dirty categories announced by the server.
    pub fn send_clear_dirty(&mut self, categories: &[&str]) -> Result<(), ClientError> {
        let id = self.ids.next("clean_dirty_");
        let children = categories
            .iter()
            .map(|category| NodeBuilder::new("clean").attr("type", *category).build());
        let node = NodeBuilder::new("iq")
            .attr("id", id)
            .attr("type", "set")
            .attr("to", SERVER_DOMAIN)
            .attr("xmlns", DIRTY_NAMESPACE)
            .children(children)
            .build();
        self.send_node(&node)
    }

    pub fn send_get_dirty(&mut self) -> Result<(), ClientError> {
        let id = self.ids.next("get_dirty_");
        let status = NodeBuilder::new("status")
            .attr("xmlns", DIRTY_NAMESPACE)
            .build();
        let node = NodeBuilder::new("iq")
            .attr("id", id)
            .attr("type", "get")
            .attr("to", SERVER_DOMAIN)
            .children([status])
            .build();
        self.send_node(&node)
    }
}
