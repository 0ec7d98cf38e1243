//! Session protocol engine for a binary, XMPP-derived messaging protocol.
//!
//! The crate owns everything between an already-framed transport and the
//! application: the authentication handshake, the inbound stanza
//! dispatcher, the outbound stanza builders, and the media upload
//! pipeline. Framing, the token codec and the stream cipher live behind
//! the [`transport::Transport`] and [`codec::Codec`] traits; callers
//! drive the engine from a single thread with a blocking poll loop.
//!
//! ```no_run
//! use funxmpp::client::{Client, ClientConfig};
//! # fn run<T: funxmpp::transport::Transport, C: funxmpp::codec::Codec>(
//! #     transport: T, codec: C, secret: Vec<u8>,
//! # ) -> Result<(), funxmpp::error::ClientError> {
//! let config = ClientConfig::new("15555215554", secret, "device", "nickname");
//! let mut client = Client::new(transport, codec, config);
//! client.on_event(|event| println!("{event:?}"));
//! client.connect()?;
//! client.login(None)?;
//! client.send_text("15551234567", "hello")?;
//! client.poll_messages(true)?;
//! # Ok(())
//! # }
//! ```

pub mod account;
pub mod binary;
pub mod chatstate;
pub mod client;
pub mod codec;
pub mod consts;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod groups;
pub mod handshake;
pub mod keepalive;
pub mod message;
pub mod phone;
pub mod presence;
pub mod privacy;
pub mod profile;
pub mod request;
pub mod send;
pub mod session;
pub mod sync;
pub mod test_utils;
pub mod transport;
pub mod upload;

pub use binary::builder::NodeBuilder;
pub use binary::node::{Attrs, Node, NodeContent};
pub use client::{Client, ClientConfig};
pub use error::ClientError;
pub use events::Event;
pub use session::SessionPhase;
