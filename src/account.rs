//! Account-scoped housekeeping: push configuration (including per-group
//! notification settings), server properties, roster edits, and account
//! removal.

use crate::binary::builder::NodeBuilder;
use crate::binary::node::Node;
use crate::client::Client;
use crate::codec::Codec;
use crate::consts::{ACCOUNT_NAMESPACE, PROPS_NAMESPACE, PUSH_NAMESPACE, ROSTER_NAMESPACE, SERVER_DOMAIN};
use crate::error::ClientError;
use crate::transport::Transport;
use chrono::{DateTime, Utc};

/// Per-group notification preference pushed with the client config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSetting {
    pub jid: String,
    pub enabled: bool,
    /// Mute until this instant; converted to remaining seconds on the
    /// wire, floored at zero.
    pub mute_expiry: Option<DateTime<Utc>>,
}

impl GroupSetting {
    fn into_node(self, now: DateTime<Utc>) -> Node {
        let mute_seconds = match self.mute_expiry {
            Some(expiry) if expiry > now => (expiry - now).num_seconds(),
            _ => 0,
        };
        NodeBuilder::new("item")
            .attr("jid", self.jid)
            .attr("notify", if self.enabled { "1" } else { "0" })
            .attr("mute", mute_seconds.to_string())
            .build()
    }
}

pub(crate) fn group_setting_nodes(groups: Vec<GroupSetting>, now: DateTime<Utc>) -> Vec<Node> {
    groups.into_iter().map(|g| g.into_node(now)).collect()
}

impl<T: Transport, C: Codec> Client<T, C> {
    /// Register basic client platform/locale config with the push realm.
    pub fn send_client_config(
        &mut self,
        platform: &str,
        language: &str,
        country: &str,
    ) -> Result<(), ClientError> {
        let id = self.ids.next("config_");
        let config = NodeBuilder::new("config")
            .attr("xmlns", PUSH_NAMESPACE)
            .attr("platform", platform)
            .attr("lg", language)
            .attr("lc", country)
            .build();
        let node = NodeBuilder::new("iq")
            .attr("id", id)
            .attr("type", "set")
            .attr("to", SERVER_DOMAIN)
            .children([config])
            .build();
        self.send_node(&node)
    }

    /// Full push registration including preview/default/group switches and
    /// per-group notification settings.
    #[allow(clippy::too_many_arguments)]
    pub fn send_push_config(
        &mut self,
        platform: &str,
        language: &str,
        country: &str,
        push_id: &str,
        preview: bool,
        default_setting: bool,
        groups_setting: bool,
        groups: Vec<GroupSetting>,
    ) -> Result<(), ClientError> {
        let id = self.ids.next("config_");
        let items = group_setting_nodes(groups, Utc::now());
        let mut config = NodeBuilder::new("config")
            .attr("xmlns", PUSH_NAMESPACE)
            .attr("platform", platform)
            .attr("lg", language)
            .attr("lc", country)
            .attr("clear", "0")
            .attr("id", push_id)
            .attr("preview", if preview { "1" } else { "0" })
            .attr("default", if default_setting { "1" } else { "0" })
            .attr("groups", if groups_setting { "1" } else { "0" });
        if !items.is_empty() {
            config = config.children(items);
        }
        let node = NodeBuilder::new("iq")
            .attr("id", id)
            .attr("type", "set")
            .attr("to", SERVER_DOMAIN)
            .children([config.build()])
            .build();
        self.send_node(&node)
    }

    pub fn send_get_client_config(&mut self) -> Result<(), ClientError> {
        let id = self.ids.next("get_config_");
        let config = NodeBuilder::new("config").attr("xmlns", PUSH_NAMESPACE).build();
        let node = NodeBuilder::new("iq")
            .attr("id", id)
            .attr("type", "get")
            .attr("to", SERVER_DOMAIN)
            .children([config])
            .build();
        self.send_node(&node)
    }

    pub fn send_get_server_properties(&mut self) -> Result<(), ClientError> {
        let id = self.ids.next("get_server_properties_");
        let props = NodeBuilder::new("props").attr("xmlns", PROPS_NAMESPACE).build();
        let node = NodeBuilder::new("iq")
            .attr("id", id)
            .attr("type", "get")
            .attr("to", SERVER_DOMAIN)
            .children([props])
            .build();
        self.send_node(&node)
    }

    pub fn send_delete_account(&mut self) -> Result<(), ClientError> {
        let id = self.ids.next("del_acct_");
        let remove = NodeBuilder::new("remove")
            .attr("xmlns", ACCOUNT_NAMESPACE)
            .build();
        let node = NodeBuilder::new("iq")
            .attr("id", id)
            .attr("type", "get")
            .attr("to", SERVER_DOMAIN)
            .children([remove])
            .build();
        self.send_node(&node)
    }

    pub fn send_remove_from_roster(&mut self, jid: &str) -> Result<(), ClientError> {
        let id = self.ids.next("roster_");
        let item = NodeBuilder::new("item")
            .attr("jid", jid)
            .attr("subscription", "remove")
            .build();
        let query = NodeBuilder::new("query")
            .attr("xmlns", ROSTER_NAMESPACE)
            .children([item])
            .build();
        let node = NodeBuilder::new("iq")
            .attr("type", "set")
            .attr("id", id)
            .children([query])
            .build();
        self.send_node(&node)
    }
}
