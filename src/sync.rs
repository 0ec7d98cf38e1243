//! Contact sync and last-seen queries.

use crate::binary::builder::NodeBuilder;
use crate::client::Client;
use crate::codec::Codec;
use crate::consts::{LAST_NAMESPACE, SYNC_NAMESPACE};
use crate::error::ClientError;
use crate::phone::to_jid;
use crate::transport::Transport;
use chrono::Utc;

/// Parameters for a contact sync round. Defaults match a full first
/// registration pass.
#[derive(Debug, Clone)]
pub struct SyncQuery<'a> {
    pub numbers: &'a [&'a str],
    pub mode: &'a str,
    pub context: &'a str,
    pub index: u32,
    pub last: bool,
}

impl<'a> SyncQuery<'a> {
    pub fn full(numbers: &'a [&'a str]) -> Self {
        Self {
            numbers,
            mode: "full",
            context: "registration",
            index: 0,
            last: true,
        }
    }
}

impl<T: Transport, C: Codec> Client<T, C> {
    /// Ask the server which of the given numbers have an account. The
    /// result arrives as a sync iq and is surfaced as a sync-result event.
    pub fn send_sync(&mut self, query: &SyncQuery<'_>) -> Result<(), ClientError> {
        let id = self.ids.next("sendsync_");
        let users = query
            .numbers
            .iter()
            .map(|number| NodeBuilder::new("user").bytes(number.as_bytes().to_vec()).build());
        let sync = NodeBuilder::new("sync")
            .attr("mode", query.mode)
            .attr("context", query.context)
            .attr("sid", Utc::now().timestamp_millis().to_string())
            .attr("index", query.index.to_string())
            .attr("last", query.last.to_string())
            .children(users)
            .build();
        let node = NodeBuilder::new("iq")
            .attr("to", to_jid(&self.config.phone_number))
            .attr("type", "get")
            .attr("id", id)
            .attr("xmlns", SYNC_NAMESPACE)
            .children([sync])
            .build();
        self.send_node(&node)
    }

    /// Ask when a contact was last online; answered by a `jabber:iq:last`
    /// result and surfaced as a last-seen event.
    pub fn send_query_last_online(&mut self, jid: &str) -> Result<(), ClientError> {
        let id = self.ids.next("last_");
        let node = NodeBuilder::new("iq")
            .attr("id", id)
            .attr("type", "get")
            .attr("to", jid)
            .attr("xmlns", LAST_NAMESPACE)
            .children([NodeBuilder::new("query").build()])
            .build();
        self.send_node(&node)
    }
}
