//! Group management: lifecycle, subject, participant verbs, and the group
//! descriptors reported back by the server.

use crate::binary::builder::NodeBuilder;
use crate::binary::node::Node;
use crate::client::Client;
use crate::codec::Codec;
use crate::consts::{GROUP_DOMAIN, GROUP_NAMESPACE};
use crate::error::ClientError;
use crate::transport::Transport;

/// One group as described in a list/info result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupInfo {
    pub id: String,
    pub owner: String,
    pub creation: i64,
    pub subject: String,
    pub subject_time: i64,
    pub subject_owner: String,
}

impl GroupInfo {
    pub(crate) fn from_node(node: &Node) -> Self {
        Self {
            id: node.attr_or_empty("id").to_string(),
            owner: node.attr_or_empty("owner").to_string(),
            creation: node.attr_i64("creation").unwrap_or(0),
            subject: node.attr_or_empty("subject").to_string(),
            subject_time: node.attr_i64("s_t").unwrap_or(0),
            subject_owner: node.attr_or_empty("s_o").to_string(),
        }
    }
}

impl<T: Transport, C: Codec> Client<T, C> {
    pub fn send_create_group(&mut self, subject: &str) -> Result<(), ClientError> {
        let id = self.ids.next("create_group_");
        let group = NodeBuilder::new("group")
            .attr("action", "create")
            .attr("subject", subject)
            .build();
        let node = NodeBuilder::new("iq")
            .attr("id", id)
            .attr("type", "set")
            .attr("xmlns", GROUP_NAMESPACE)
            .attr("to", GROUP_DOMAIN)
            .children([group])
            .build();
        self.send_node(&node)
    }

    pub fn send_end_group(&mut self, group_jid: &str) -> Result<(), ClientError> {
        let id = self.ids.next("remove_group_");
        let group = NodeBuilder::new("group").attr("action", "delete").build();
        let node = NodeBuilder::new("iq")
            .attr("id", id)
            .attr("type", "set")
            .attr("xmlns", GROUP_NAMESPACE)
            .attr("to", group_jid)
            .children([group])
            .build();
        self.send_node(&node)
    }

    pub fn send_leave_group(&mut self, group_jid: &str) -> Result<(), ClientError> {
        self.send_leave_groups(&[group_jid])
    }

    pub fn send_leave_groups(&mut self, group_jids: &[&str]) -> Result<(), ClientError> {
        let id = self.ids.next("leave_group_");
        let groups = group_jids
            .iter()
            .map(|jid| NodeBuilder::new("group").attr("id", *jid).build());
        let leave = NodeBuilder::new("leave").children(groups).build();
        let node = NodeBuilder::new("iq")
            .attr("id", id)
            .attr("type", "set")
            .attr("xmlns", GROUP_NAMESPACE)
            .attr("to", GROUP_DOMAIN)
            .children([leave])
            .build();
        self.send_node(&node)
    }

    pub fn send_set_group_subject(&mut self, group_jid: &str, subject: &str) -> Result<(), ClientError> {
        let id = self.ids.next("set_group_subject_");
        let child = NodeBuilder::new("subject").attr("value", subject).build();
        let node = NodeBuilder::new("iq")
            .attr("id", id)
            .attr("type", "set")
            .attr("xmlns", GROUP_NAMESPACE)
            .attr("to", group_jid)
            .children([child])
            .build();
        self.send_node(&node)
    }

    pub fn send_add_participants(
        &mut self,
        group_jid: &str,
        participants: &[&str],
    ) -> Result<(), ClientError> {
        let id = self.ids.next("add_group_participants_");
        self.send_verb_participants(group_jid, participants, &id, "add")
    }

    pub fn send_remove_participants(
        &mut self,
        group_jid: &str,
        participants: &[&str],
    ) -> Result<(), ClientError> {
        let id = self.ids.next("remove_group_participants_");
        self.send_verb_participants(group_jid, participants, &id, "remove")
    }

    /// Shared shape for the participant verbs; the verb is the inner tag.
    fn send_verb_participants(
        &mut self,
        group_jid: &str,
        participants: &[&str],
        id: &str,
        inner_tag: &str,
    ) -> Result<(), ClientError> {
        let members = participants
            .iter()
            .map(|jid| NodeBuilder::new("participant").attr("jid", *jid).build());
        let verb = NodeBuilder::new(inner_tag).children(members).build();
        let node = NodeBuilder::new("iq")
            .attr("id", id)
            .attr("type", "set")
            .attr("xmlns", GROUP_NAMESPACE)
            .attr("to", group_jid)
            .children([verb])
            .build();
        self.send_node(&node)
    }

    /// List the groups this account participates in.
    pub fn send_get_groups(&mut self) -> Result<(), ClientError> {
        let id = self.ids.next("get_groups_");
        self.send_group_list(&id, "participating")
    }

    /// List the groups this account owns.
    pub fn send_get_owning_groups(&mut self) -> Result<(), ClientError> {
        let id = self.ids.next("get_owning_groups_");
        self.send_group_list(&id, "owning")
    }

    fn send_group_list(&mut self, id: &str, list_type: &str) -> Result<(), ClientError> {
        let list = NodeBuilder::new("list").attr("type", list_type).build();
        let node = NodeBuilder::new("iq")
            .attr("id", id)
            .attr("type", "get")
            .attr("xmlns", GROUP_NAMESPACE)
            .attr("to", GROUP_DOMAIN)
            .children([list])
            .build();
        self.send_node(&node)
    }

    pub fn send_get_group_info(&mut self, group_jid: &str) -> Result<(), ClientError> {
        let id = self.ids.next("get_g_info_");
        let node = NodeBuilder::new("iq")
            .attr("id", id)
            .attr("type", "get")
            .attr("xmlns", GROUP_NAMESPACE)
            .attr("to", group_jid)
            .children([NodeBuilder::new("query").build()])
            .build();
        self.send_node(&node)
    }

    pub fn send_get_participants(&mut self, group_jid: &str) -> Result<(), ClientError> {
        let id = self.ids.next("get_participants_");
        let node = NodeBuilder::new("iq")
            .attr("id", id)
            .attr("type", "get")
            .attr("xmlns", GROUP_NAMESPACE)
            .attr("to", group_jid)
            .children([NodeBuilder::new("list").build()])
            .build();
        self.send_node(&node)
    }
}
