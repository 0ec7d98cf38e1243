//! The session engine: one transport, one codec, one phase machine. The
//! caller drives a poll loop; everything else hangs off `&mut self`.

use crate::codec::Codec;
use crate::consts::{SERVER_DOMAIN, SERVER_PORT};
use crate::error::ClientError;
use crate::events::{Event, EventHandler};
use crate::request::IdGenerator;
use crate::session::{SessionPhase, SessionState};
use crate::transport::Transport;
use crate::upload::{TlsUploadPoster, UploadPoster};
use log::{debug, info, warn};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub phone_number: String,
    /// Account secret fed to session key derivation.
    pub secret: Vec<u8>,
    pub device_id: String,
    pub nickname: String,
    /// Advertise a passive presence during auth.
    pub hidden: bool,
    /// Receipt inbound text messages automatically when polling via
    /// [`Client::poll`].
    pub auto_receipt: bool,
    /// Deadline for the media-registration response during uploads.
    pub upload_timeout: Duration,
}

impl ClientConfig {
    pub fn new(
        phone_number: impl Into<String>,
        secret: impl Into<Vec<u8>>,
        device_id: impl Into<String>,
        nickname: impl Into<String>,
    ) -> Self {
        Self {
            phone_number: phone_number.into(),
            secret: secret.into(),
            device_id: device_id.into(),
            nickname: nickname.into(),
            hidden: false,
            auto_receipt: true,
            upload_timeout: Duration::from_secs(30),
        }
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    pub fn auto_receipt(mut self, auto_receipt: bool) -> Self {
        self.auto_receipt = auto_receipt;
        self
    }

    pub fn upload_timeout(mut self, timeout: Duration) -> Self {
        self.upload_timeout = timeout;
        self
    }
}

pub struct Client<T: Transport, C: Codec> {
    pub(crate) transport: T,
    pub(crate) codec: C,
    pub(crate) config: ClientConfig,
    pub(crate) state: SessionState,
    pub(crate) ids: IdGenerator,
    pub(crate) poster: Box<dyn UploadPoster>,
    handlers: Vec<EventHandler>,
}

impl<T: Transport, C: Codec> Client<T, C> {
    pub fn new(transport: T, codec: C, config: ClientConfig) -> Self {
        Self {
            transport,
            codec,
            config,
            state: SessionState::new(),
            ids: IdGenerator::new(),
            poster: Box::new(TlsUploadPoster::new()),
            handlers: Vec::new(),
        }
    }

    /// Replace the TLS poster used for media uploads.
    pub fn with_poster(mut self, poster: Box<dyn UploadPoster>) -> Self {
        self.poster = poster;
        self
    }

    /// Register an event handler. Handlers run synchronously in
    /// registration order for every dispatched event.
    pub fn on_event(&mut self, handler: impl FnMut(&Event) + 'static) {
        self.handlers.push(Box::new(handler));
    }

    pub(crate) fn emit(&mut self, event: Event) {
        debug!(target: "Client/Recv", "event: {event:?}");
        for handler in &mut self.handlers {
            handler(&event);
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.phase
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The injected codec boundary; tests use this to inspect traffic.
    pub fn codec(&self) -> &C {
        &self.codec
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn connect(&mut self) -> Result<(), ClientError> {
        self.transport.connect(SERVER_DOMAIN, SERVER_PORT)?;
        self.state.phase = SessionPhase::Connected;
        info!(target: "Client", "Connected to {SERVER_DOMAIN}:{SERVER_PORT}");
        Ok(())
    }

    /// Tear the session down. One-way: phase leaves `LoggedIn`/`Connected`
    /// and only a new handshake brings it back.
    pub fn disconnect(&mut self) {
        self.transport.disconnect();
        self.codec.reset();
        self.state.teardown();
        info!(target: "Client", "Disconnected");
    }

    /// Encode, encrypt and write one outbound stanza.
    pub fn send_node(&mut self, node: &crate::binary::node::Node) -> Result<(), ClientError> {
        if !self.state.is_online() {
            return Err(ClientError::NotConnected);
        }
        debug!(target: "Client/Send", "{node}");
        let bytes = self.codec.encode(node, true)?;
        self.transport.write(&bytes)?;
        Ok(())
    }

    /// Read and dispatch the next inbound unit. Blocks on the transport.
    ///
    /// Returns `Ok(false)` without processing anything when the session is
    /// offline or the read fails; a read failure tears the session down, so
    /// callers must notice the phase change. Decode and dispatch failures
    /// propagate.
    pub fn poll_message(&mut self, auto_receipt: bool) -> Result<bool, ClientError> {
        if !self.state.is_online() {
            return Ok(false);
        }
        let bytes = match self.transport.read_next_unit() {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                debug!(target: "Client", "End of stream");
                self.disconnect();
                return Ok(false);
            }
            Err(e) => {
                warn!(target: "Client", "Read failed: {e}");
                self.disconnect();
                return Ok(false);
            }
        };
        let node = self.codec.decode(&bytes)?;
        self.dispatch(node, auto_receipt)?;
        Ok(true)
    }

    /// [`Self::poll_message`] with the configured receipt behavior.
    pub fn poll(&mut self) -> Result<bool, ClientError> {
        let auto_receipt = self.config.auto_receipt;
        self.poll_message(auto_receipt)
    }

    /// Poll until the session goes offline.
    pub fn poll_messages(&mut self, auto_receipt: bool) -> Result<(), ClientError> {
        while self.poll_message(auto_receipt)? {}
        Ok(())
    }
}
