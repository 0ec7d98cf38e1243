//! Typing indicators. Wire format: `<chatstate to=..><composing/></chatstate>`.

use crate::binary::builder::NodeBuilder;
use crate::client::Client;
use crate::codec::Codec;
use crate::error::ClientError;
use crate::phone::to_jid;
use crate::transport::Transport;

impl<T: Transport, C: Codec> Client<T, C> {
    pub fn send_composing(&mut self, to: &str) -> Result<(), ClientError> {
        self.send_chat_state(to, "composing")
    }

    pub fn send_paused(&mut self, to: &str) -> Result<(), ClientError> {
        self.send_chat_state(to, "paused")
    }

    fn send_chat_state(&mut self, to: &str, state: &str) -> Result<(), ClientError> {
        let node = NodeBuilder::new("chatstate")
            .attr("to", to_jid(to))
            .children([NodeBuilder::new(state).build()])
            .build();
        self.send_node(&node)
    }
}
