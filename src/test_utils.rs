//! Scripted doubles for driving the engine without sockets or a real
//! codec: a transport that replays canned units, a codec that hands out
//! pre-built stanzas and records everything encoded, and posters for the
//! upload path.

use crate::binary::node::Node;
use crate::client::{Client, ClientConfig};
use crate::codec::{Codec, CodecError, SessionKeys};
use crate::session::SessionPhase;
use crate::transport::{Transport, TransportError};
use crate::upload::{UploadError, UploadPoster};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

pub const TEST_PHONE: &str = "15555215554";

/// Transport double: hands out one dummy unit per scripted stanza and
/// records every outbound write.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    pub units: VecDeque<Vec<u8>>,
    pub written: Vec<Vec<u8>>,
    pub connected: bool,
    pub disconnects: usize,
}

impl ScriptedTransport {
    pub fn with_unit_count(count: usize) -> Self {
        let mut transport = Self::default();
        for _ in 0..count {
            transport.units.push_back(vec![0]);
        }
        transport
    }
}

impl Transport for ScriptedTransport {
    fn connect(&mut self, _server: &str, _port: u16) -> Result<(), TransportError> {
        self.connected = true;
        Ok(())
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        if !self.connected {
            return Err(TransportError::NotConnected);
        }
        self.written.push(bytes.to_vec());
        Ok(())
    }

    fn read_next_unit(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        Ok(self.units.pop_front())
    }

    fn disconnect(&mut self) {
        self.connected = false;
        self.disconnects += 1;
    }
}

/// Codec double: `decode` pops the next scripted stanza regardless of the
/// input bytes, `encode` records the stanza and its encryption flag, and
/// `apply_outbound` XORs with a fixed byte so tests can verify exactly
/// which region was enciphered.
#[derive(Debug, Default)]
pub struct ScriptedCodec {
    pub script: VecDeque<Node>,
    pub sent: Vec<(Node, bool)>,
    pub outbound_keys: Option<(Vec<u8>, Vec<u8>)>,
    pub inbound_keys: Option<(Vec<u8>, Vec<u8>)>,
    pub resets: usize,
}

pub const SCRIPT_CIPHER_BYTE: u8 = 0x5A;

impl ScriptedCodec {
    pub fn with_script(nodes: impl IntoIterator<Item = Node>) -> Self {
        Self {
            script: nodes.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn sent_tags(&self) -> Vec<&str> {
        self.sent.iter().map(|(node, _)| node.tag.as_str()).collect()
    }

    pub fn sent_nodes(&self) -> Vec<&Node> {
        self.sent.iter().map(|(node, _)| node).collect()
    }

    pub fn last_sent(&self) -> Option<&Node> {
        self.sent.last().map(|(node, _)| node)
    }
}

impl Codec for ScriptedCodec {
    fn start_stream(&mut self, domain: &str, resource: &str) -> Vec<u8> {
        format!("stream-open:{domain}:{resource}").into_bytes()
    }

    fn encode(&mut self, node: &Node, encrypt: bool) -> Result<Vec<u8>, CodecError> {
        self.sent.push((node.clone(), encrypt));
        Ok(vec![0])
    }

    fn decode(&mut self, _bytes: &[u8]) -> Result<Node, CodecError> {
        self.script
            .pop_front()
            .ok_or_else(|| CodecError::Malformed("script exhausted".to_string()))
    }

    fn derive_session_keys(&self, secret: &[u8], challenge: &[u8]) -> SessionKeys {
        let mix = |label: u8| {
            let mut key = vec![label];
            key.extend_from_slice(secret);
            key.extend_from_slice(challenge);
            key
        };
        SessionKeys {
            outbound_cipher: mix(1),
            outbound_mac: mix(2),
            inbound_cipher: mix(3),
            inbound_mac: mix(4),
        }
    }

    fn install_outbound_keys(&mut self, cipher_key: &[u8], mac_key: &[u8]) {
        self.outbound_keys = Some((cipher_key.to_vec(), mac_key.to_vec()));
    }

    fn install_inbound_keys(&mut self, cipher_key: &[u8], mac_key: &[u8]) {
        self.inbound_keys = Some((cipher_key.to_vec(), mac_key.to_vec()));
    }

    fn reset(&mut self) {
        self.outbound_keys = None;
        self.inbound_keys = None;
        self.resets += 1;
    }

    fn apply_outbound(&mut self, buf: &mut [u8], offset: usize, len: usize) {
        for byte in &mut buf[offset..offset + len] {
            *byte ^= SCRIPT_CIPHER_BYTE;
        }
    }
}

/// Upload poster that records every request and replies with a canned
/// body. The request log is shared so tests keep a handle after the
/// poster moves into the client.
#[derive(Debug, Clone, Default)]
pub struct RecordingPoster {
    pub requests: Rc<RefCell<Vec<(String, Vec<u8>)>>>,
    pub response: Vec<u8>,
}

impl RecordingPoster {
    pub fn respond_with(body: &str) -> Self {
        Self {
            requests: Rc::default(),
            response: body.as_bytes().to_vec(),
        }
    }
}

impl UploadPoster for RecordingPoster {
    fn post(&mut self, host: &str, request: &[u8]) -> Result<Vec<u8>, UploadError> {
        self.requests
            .borrow_mut()
            .push((host.to_string(), request.to_vec()));
        Ok(self.response.clone())
    }
}

/// Upload poster whose every post fails at the TLS layer.
#[derive(Debug, Default)]
pub struct FailingPoster;

impl UploadPoster for FailingPoster {
    fn post(&mut self, _host: &str, _request: &[u8]) -> Result<Vec<u8>, UploadError> {
        Err(UploadError::Tls("connection refused".to_string()))
    }
}

pub fn test_config() -> ClientConfig {
    ClientConfig::new(TEST_PHONE, b"account-secret".to_vec(), "device-1", "Tester")
}

/// A connected (but not yet authenticated) client whose codec replays the
/// given stanzas, one transport unit per stanza.
pub fn connected_client(script: Vec<Node>) -> Client<ScriptedTransport, ScriptedCodec> {
    let transport = ScriptedTransport::with_unit_count(script.len());
    let codec = ScriptedCodec::with_script(script);
    let mut client = Client::new(transport, codec, test_config());
    client.transport.connected = true;
    client.state.phase = SessionPhase::Connected;
    client
}

/// A client already past the handshake, ready for application stanzas.
pub fn logged_in_client(script: Vec<Node>) -> Client<ScriptedTransport, ScriptedCodec> {
    let mut client = connected_client(script);
    client.state.phase = SessionPhase::LoggedIn;
    client
}

/// [`logged_in_client`] with a caller-tuned config.
pub fn logged_in_client_with_config(
    script: Vec<Node>,
    config: ClientConfig,
) -> Client<ScriptedTransport, ScriptedCodec> {
    let transport = ScriptedTransport::with_unit_count(script.len());
    let codec = ScriptedCodec::with_script(script);
    let mut client = Client::new(transport, codec, config);
    client.transport.connected = true;
    client.state.phase = SessionPhase::LoggedIn;
    client
}
