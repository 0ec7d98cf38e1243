//! Profile pictures and status queries.

use crate::binary::builder::NodeBuilder;
use crate::client::Client;
use crate::codec::Codec;
use crate::consts::{PROFILE_PICTURE_NAMESPACE, SERVER_DOMAIN, STATUS_NAMESPACE};
use crate::error::ClientError;
use crate::phone::to_jid;
use crate::transport::Transport;

impl<T: Transport, C: Codec> Client<T, C> {
    /// Request a contact's profile photo; returns the request id so the
    /// caller can match the eventual photo event.
    pub fn send_get_photo(
        &mut self,
        jid: &str,
        expected_photo_id: Option<&str>,
        large_format: bool,
    ) -> Result<String, ClientError> {
        let id = self.ids.next("get_photo_");
        let mut picture = NodeBuilder::new("picture");
        if !large_format {
            picture = picture.attr("type", "preview");
        }
        picture = picture.optional_attr("id", expected_photo_id);
        let node = NodeBuilder::new("iq")
            .attr("id", id.clone())
            .attr("type", "get")
            .attr("xmlns", PROFILE_PICTURE_NAMESPACE)
            .attr("to", to_jid(jid))
            .children([picture.build()])
            .build();
        self.send_node(&node)?;
        Ok(id)
    }

    pub fn send_get_photo_ids(&mut self, jids: &[&str]) -> Result<(), ClientError> {
        let id = self.ids.next("get_photo_id_");
        let users = jids
            .iter()
            .map(|jid| NodeBuilder::new("user").attr("jid", *jid).build());
        let list = NodeBuilder::new("list")
            .attr("xmlns", PROFILE_PICTURE_NAMESPACE)
            .children(users)
            .build();
        let node = NodeBuilder::new("iq")
            .attr("id", id)
            .attr("type", "get")
            .attr("to", to_jid(&self.config.phone_number))
            .children([list])
            .build();
        self.send_node(&node)
    }

    /// Upload a new profile photo, with an optional preview thumbnail.
    pub fn send_set_photo(
        &mut self,
        jid: &str,
        bytes: &[u8],
        thumbnail: Option<&[u8]>,
    ) -> Result<(), ClientError> {
        let id = self.ids.next("set_photo_");
        let mut pictures = vec![NodeBuilder::new("picture").bytes(bytes.to_vec()).build()];
        if let Some(thumb) = thumbnail {
            pictures.push(
                NodeBuilder::new("picture")
                    .attr("type", "preview")
                    .bytes(thumb.to_vec())
                    .build(),
            );
        }
        let node = NodeBuilder::new("iq")
            .attr("id", id)
            .attr("type", "set")
            .attr("xmlns", PROFILE_PICTURE_NAMESPACE)
            .attr("to", jid)
            .children(pictures)
            .build();
        self.send_node(&node)
    }

    /// Fetch the status lines of several contacts at once.
    pub fn send_get_statuses(&mut self, jids: &[&str]) -> Result<(), ClientError> {
        let id = self.ids.next("getstatus_");
        let users = jids
            .iter()
            .map(|jid| NodeBuilder::new("user").attr("jid", to_jid(jid)).build());
        let status = NodeBuilder::new("status").children(users).build();
        let node = NodeBuilder::new("iq")
            .attr("to", SERVER_DOMAIN)
            .attr("type", "get")
            .attr("xmlns", STATUS_NAMESPACE)
            .attr("id", id)
            .children([status])
            .build();
        self.send_node(&node)
    }
}
