use crate::codec::CodecError;
use crate::transport::TransportError;
use crate::upload::UploadError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("client is not connected")]
    NotConnected,
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
    /// A recognized parent tag carried an unrecognized child or variant.
    /// Signals a coverage gap, not a transient condition.
    #[error("unsupported stanza: {0}")]
    UnsupportedStanza(String),
    #[error("login failed: {0}")]
    LoginFailed(String),
    #[error("no challenge available for auth response")]
    MissingChallenge,
    #[error("cannot send message: {0}")]
    InvalidMessage(String),
    #[error("upload failed: {0}")]
    Upload(#[from] UploadError),
}
