//! Codec/cipher boundary: encodes a stanza tree to wire bytes and decodes
//! inbound bytes back to a tree, owning one keyed cipher state per
//! direction. The token dictionary and cipher algorithm are the
//! implementor's concern; the engine drives this interface only.

use crate::binary::node::Node;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("malformed unit: {0}")]
    Malformed(String),
    #[error("cipher failure: {0}")]
    Cipher(String),
}

/// The four byte-strings the key-derivation primitive yields from the
/// account secret and the server challenge, in derivation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionKeys {
    pub outbound_cipher: Vec<u8>,
    pub outbound_mac: Vec<u8>,
    pub inbound_cipher: Vec<u8>,
    pub inbound_mac: Vec<u8>,
}

pub trait Codec {
    /// Wire bytes of the stream-open unit declaring the target domain and
    /// the client resource string.
    fn start_stream(&mut self, domain: &str, resource: &str) -> Vec<u8>;

    /// Encode a stanza; `encrypt` selects the outbound cipher state, which
    /// must already be installed when it is set.
    fn encode(&mut self, node: &Node, encrypt: bool) -> Result<Vec<u8>, CodecError>;

    /// Decode (and, once inbound keys are installed, decrypt) one unit.
    fn decode(&mut self, bytes: &[u8]) -> Result<Node, CodecError>;

    /// Derive the four session keys from the account secret and the
    /// server-issued challenge bytes.
    fn derive_session_keys(&self, secret: &[u8], challenge: &[u8]) -> SessionKeys;

    fn install_outbound_keys(&mut self, cipher_key: &[u8], mac_key: &[u8]);

    fn install_inbound_keys(&mut self, cipher_key: &[u8], mac_key: &[u8]);

    /// Clear both cipher directions; the next units go out unencrypted.
    fn reset(&mut self);

    /// Apply the outbound stream cipher in place over
    /// `buf[offset..offset + len]`. Used for the handshake's manual blob
    /// encryption, where bytes before `offset` stay untouched.
    fn apply_outbound(&mut self, buf: &mut [u8], offset: usize, len: usize);
}
