//! Privacy list management.
//!
//! Wire format for the deny list:
//! ```xml
//! <iq id=".." type="set">
//!   <query xmlns="jabber:iq:privacy">
//!     <list name="default">
//!       <item type="jid" value=".." action="deny" order="0"/>
//!       ...
//!     </list>
//!   </query>
//! </iq>
//! ```

use crate::binary::builder::NodeBuilder;
use crate::client::Client;
use crate::codec::Codec;
use crate::consts::PRIVACY_NAMESPACE;
use crate::error::ClientError;
use crate::transport::Transport;

impl<T: Transport, C: Codec> Client<T, C> {
    pub fn send_get_privacy_list(&mut self) -> Result<(), ClientError> {
        let id = self.ids.next("privacylist_");
        let list = NodeBuilder::new("list").attr("name", "default").build();
        let query = NodeBuilder::new("query")
            .attr("xmlns", PRIVACY_NAMESPACE)
            .children([list])
            .build();
        let node = NodeBuilder::new("iq")
            .attr("id", id)
            .attr("type", "get")
            .children([query])
            .build();
        self.send_node(&node)
    }

    /// Replace the default privacy list with an ordered deny list.
    pub fn send_set_blocked_list(&mut self, jids: &[&str]) -> Result<(), ClientError> {
        let id = self.ids.next("privacy_");
        let items: Vec<_> = jids
            .iter()
            .enumerate()
            .map(|(index, jid)| {
                NodeBuilder::new("item")
                    .attr("type", "jid")
                    .attr("value", *jid)
                    .attr("action", "deny")
                    .attr("order", index.to_string())
                    .build()
            })
            .collect();
        let mut list = NodeBuilder::new("list").attr("name", "default");
        if !items.is_empty() {
            list = list.children(items);
        }
        let query = NodeBuilder::new("query")
            .attr("xmlns", PRIVACY_NAMESPACE)
            .children([list.build()])
            .build();
        let node = NodeBuilder::new("iq")
            .attr("id", id)
            .attr("type", "set")
            .children([query])
            .build();
        self.send_node(&node)
    }
}
