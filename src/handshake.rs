//! Authentication handshake: key derivation, challenge response, and the
//! multi-step login exchange that must complete before application stanzas
//! mean anything.
//!
//! Wire sequence (all unencrypted until keys are installed):
//! ```text
//! --> stream open, <stream:features/>, <auth mechanism=.. user=..>blob?</auth>
//! <-- stream ack, features ack, <challenge>|<success>|<failure>
//! --> <response xmlns="urn:ietf:params:xml:ns:xmpp-sasl">blob</response>   (challenge round only)
//! <-- <success>|<failure>
//! ```

use crate::binary::builder::NodeBuilder;
use crate::binary::node::Node;
use crate::client::Client;
use crate::codec::Codec;
use crate::consts::{
    AUTH_MECHANISM, CLIENT_VERSION, DEVICE, SASL_NAMESPACE, SERVER_DOMAIN, SERVER_PORT, USER_AGENT,
};
use crate::error::ClientError;
use crate::phone;
use crate::session::SessionPhase;
use crate::transport::Transport;
use chrono::Utc;
use log::{debug, info};

/// Pre-cipher auth proof: a 4-byte reserved prefix, then the identity,
/// the server nonce, and client telemetry. The cipher is applied over
/// everything after the prefix.
pub(crate) fn auth_blob_plaintext(
    phone_number: &str,
    challenge: &[u8],
    timestamp: i64,
    user_agent: &str,
) -> Vec<u8> {
    let mut buf = vec![0u8; 4];
    buf.extend_from_slice(phone_number.as_bytes());
    buf.extend_from_slice(challenge);
    buf.extend_from_slice(timestamp.to_string().as_bytes());
    buf.extend_from_slice(user_agent.as_bytes());
    buf.extend_from_slice(format!(" MccMnc/{}001", phone::mcc_for(phone_number)).as_bytes());
    buf
}

impl<T: Transport, C: Codec> Client<T, C> {
    /// Run the login exchange. Pass a previously-received challenge to
    /// resume with a one-round handshake.
    ///
    /// A `failure` from the server is non-fatal to the session object: the
    /// phase becomes `Unauthorized`, the reason is surfaced both as an
    /// event and in the returned error, and the caller may retry.
    pub fn login(&mut self, next_challenge: Option<Vec<u8>>) -> Result<(), ClientError> {
        self.codec.reset();
        self.state.pending_challenge = next_challenge;
        self.state.last_failure = None;

        let resource = format!("{DEVICE}-{CLIENT_VERSION}-{SERVER_PORT}");
        debug!(target: "Client", "Opening stream as {resource}");
        let open = self.codec.start_stream(SERVER_DOMAIN, &resource);
        self.transport.write(&open)?;

        let features = NodeBuilder::new("stream:features").build();
        let bytes = self.codec.encode(&features, false)?;
        self.transport.write(&bytes)?;

        let auth = self.auth_node();
        let bytes = self.codec.encode(&auth, false)?;
        self.transport.write(&bytes)?;

        // Stream ack, features ack, then challenge or success/failure.
        self.poll_message(true)?;
        self.poll_message(true)?;
        self.poll_message(true)?;

        if self.state.phase != SessionPhase::LoggedIn
            && self.state.phase != SessionPhase::Unauthorized
        {
            let response = self.auth_response_node()?;
            let bytes = self.codec.encode(&response, false)?;
            self.transport.write(&bytes)?;
            self.poll_message(true)?;
        }

        match self.state.phase {
            SessionPhase::LoggedIn => {
                info!(target: "Client", "Login complete");
                self.send_available()
            }
            SessionPhase::Unauthorized => Err(ClientError::LoginFailed(
                self.state
                    .last_failure
                    .take()
                    .unwrap_or_else(|| "unknown".to_string()),
            )),
            _ => Err(ClientError::LoginFailed(
                "no auth result from server".to_string(),
            )),
        }
    }

    fn auth_node(&mut self) -> Node {
        let mut builder = NodeBuilder::new("auth")
            .attr("mechanism", AUTH_MECHANISM)
            .attr("user", self.config.phone_number.clone());
        if self.config.hidden {
            builder = builder.attr("passive", "true");
        }
        if let Some(blob) = self.auth_blob() {
            builder = builder.bytes(blob);
        }
        builder.build()
    }

    /// Consume the pending challenge: derive and install both cipher
    /// directions, then produce the enciphered proof blob. `None` when no
    /// challenge has been seen yet (first round of a fresh handshake).
    fn auth_blob(&mut self) -> Option<Vec<u8>> {
        let challenge = self.state.pending_challenge.take()?;
        self.install_session_keys(&challenge);
        let mut buf = auth_blob_plaintext(
            &self.config.phone_number,
            &challenge,
            Utc::now().timestamp(),
            USER_AGENT,
        );
        let len = buf.len();
        self.codec.apply_outbound(&mut buf, 4, len - 4);
        Some(buf)
    }

    /// Second-round response once the server has issued its challenge.
    fn auth_response_node(&mut self) -> Result<Node, ClientError> {
        let challenge = self
            .state
            .pending_challenge
            .take()
            .ok_or(ClientError::MissingChallenge)?;
        self.install_session_keys(&challenge);

        let mut buf = vec![0u8; 4];
        buf.extend_from_slice(self.config.phone_number.as_bytes());
        buf.extend_from_slice(&challenge);
        let len = buf.len();
        self.codec.apply_outbound(&mut buf, 4, len - 4);

        Ok(NodeBuilder::new("response")
            .attr("xmlns", SASL_NAMESPACE)
            .bytes(buf)
            .build())
    }

    fn install_session_keys(&mut self, challenge: &[u8]) {
        let keys = self.codec.derive_session_keys(&self.config.secret, challenge);
        self.codec
            .install_inbound_keys(&keys.inbound_cipher, &keys.inbound_mac);
        self.codec
            .install_outbound_keys(&keys.outbound_cipher, &keys.outbound_mac);
        debug!(target: "Client", "Session keys installed");
    }
}
