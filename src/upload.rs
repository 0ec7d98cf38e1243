//! Media upload pipeline: register the file with the media realm over the
//! session stream, then push the bytes to the returned host with a raw
//! multipart POST over TLS.
//!
//! Registration answers land through the normal dispatch path; the
//! orchestrator correlates them by request id and polls the session until
//! its answer shows up or the deadline passes.

use crate::binary::builder::NodeBuilder;
use crate::client::Client;
use crate::codec::Codec;
use crate::consts::{MEDIA_NAMESPACE, SERVER_DOMAIN, USER_AGENT};
use crate::error::ClientError;
use crate::message::{MediaKind, MessageDescriptor};
use crate::phone::to_jid;
use crate::transport::Transport;
use base64::Engine;
use log::{debug, info};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::io::{Read, Write};
use std::net::TcpStream;
use std::path::Path;
use std::time::{Duration, Instant};

const MULTIPART_BOUNDARY: &str = "zzXXzzYYzzXXzzQQ";
const UPLOAD_PORT: u16 = 443;

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("upload io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("no registration response within {0:?}")]
    RegistrationTimeout(Duration),
    #[error("session went offline during upload")]
    Disconnected,
    #[error("tls handshake with upload host failed: {0}")]
    Tls(String),
    #[error("unusable upload url: {0}")]
    BadUrl(String),
    #[error("upload host sent no parseable response")]
    MalformedResponse,
    #[error("upload response carried no url")]
    EmptyUrl,
    #[error("upload response was not valid json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Final description of the hosted file, either parsed from the upload
/// host's JSON answer or lifted from a `duplicate` registration result.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub mimetype: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub duration: u32,
    /// The realm already had these bytes; no POST happened.
    #[serde(skip)]
    pub is_duplicate: bool,
}

/// Delivers one raw HTTP request to an upload host and returns whatever
/// the host answers. Injected so tests never open sockets.
pub trait UploadPoster {
    fn post(&mut self, host: &str, request: &[u8]) -> Result<Vec<u8>, UploadError>;
}

/// Production poster: one TLS connection per upload, single read of the
/// response.
#[derive(Debug, Default)]
pub struct TlsUploadPoster;

impl TlsUploadPoster {
    pub fn new() -> Self {
        Self
    }
}

impl UploadPoster for TlsUploadPoster {
    fn post(&mut self, host: &str, request: &[u8]) -> Result<Vec<u8>, UploadError> {
        let connector = native_tls::TlsConnector::new().map_err(|e| UploadError::Tls(e.to_string()))?;
        let tcp = TcpStream::connect((host, UPLOAD_PORT))?;
        let mut stream = connector
            .connect(host, tcp)
            .map_err(|e| UploadError::Tls(e.to_string()))?;
        stream.write_all(request)?;
        let mut buf = vec![0u8; 1024];
        let n = stream.read(&mut buf)?;
        buf.truncate(n);
        Ok(buf)
    }
}

/// Split `https://host/path` into host and absolute request path.
pub(crate) fn split_upload_url(url: &str) -> Result<(String, String), UploadError> {
    let rest = url
        .strip_prefix("https://")
        .ok_or_else(|| UploadError::BadUrl(url.to_string()))?;
    match rest.split_once('/') {
        Some((host, path)) if !host.is_empty() => Ok((host.to_string(), format!("/{path}"))),
        _ => Err(UploadError::BadUrl(url.to_string())),
    }
}

/// Assemble the complete POST request: request line, headers and the
/// three-field multipart body (`to`, `from`, `file`). The Content-Length
/// covers the body exactly.
pub(crate) fn build_upload_request(
    host: &str,
    path: &str,
    to: &str,
    from: &str,
    hashname: &str,
    mime: &str,
    data: &[u8],
) -> Vec<u8> {
    let b = MULTIPART_BOUNDARY;
    let head = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"to\"\r\n\r\n{to}\r\n\
         --{b}\r\nContent-Disposition: form-data; name=\"from\"\r\n\r\n{from}\r\n\
         --{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{hashname}\"\r\n\
         Content-Type: {mime}\r\n\r\n"
    );
    let tail = format!("\r\n--{b}--\r\n");
    let length = head.len() + data.len() + tail.len();
    let mut request = format!(
        "POST {path} HTTP/1.1\r\nHost: {host}\r\nUser-Agent: {USER_AGENT}\r\n\
         Content-Type: multipart/form-data; boundary={b}\r\nContent-Length: {length}\r\n\r\n"
    )
    .into_bytes();
    request.extend_from_slice(head.as_bytes());
    request.extend_from_slice(data);
    request.extend_from_slice(tail.as_bytes());
    request
}

/// Pull the JSON object out of the raw HTTP response. Hosts pad the body
/// with trailing NULs, so the object is bounded by brace positions rather
/// than line structure.
pub(crate) fn parse_upload_response(raw: &[u8]) -> Result<UploadResponse, UploadError> {
    let text = String::from_utf8_lossy(raw);
    let start = text.find('{').ok_or(UploadError::MalformedResponse)?;
    let end = text.rfind('}').ok_or(UploadError::MalformedResponse)?;
    if end < start {
        return Err(UploadError::MalformedResponse);
    }
    let response: UploadResponse = serde_json::from_str(&text[start..=end])?;
    if response.url.is_empty() {
        return Err(UploadError::EmptyUrl);
    }
    Ok(response)
}

/// Upload filename presented to the host: uppercase md5 of the local path
/// plus the original extension.
pub(crate) fn upload_hashname(path: &Path) -> String {
    let digest = md5::compute(path.to_string_lossy().as_bytes());
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    format!("{}.{ext}", hex::encode_upper(digest.0))
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default()
}

pub(crate) fn mime_for(kind: MediaKind, extension: &str) -> &'static str {
    match kind {
        MediaKind::Image => match extension {
            "png" => "image/png",
            "gif" => "image/gif",
            _ => "image/jpeg",
        },
        MediaKind::Video => match extension {
            "mov" => "video/quicktime",
            "avi" => "video/x-msvideo",
            _ => "video/mp4",
        },
        MediaKind::Audio => match extension {
            "wav" => "audio/wav",
            "ogg" => "audio/ogg",
            "aif" => "audio/x-aiff",
            "aac" => "audio/aac",
            "m4a" => "audio/mp4",
            _ => "audio/mpeg",
        },
        _ => "application/octet-stream",
    }
}

impl<T: Transport, C: Codec> Client<T, C> {
    /// Register a local file with the media realm and, unless the realm
    /// already holds the bytes, POST them to the returned host.
    pub fn upload_file(
        &mut self,
        path: &Path,
        kind: MediaKind,
        to: &str,
    ) -> Result<UploadResponse, ClientError> {
        let data = std::fs::read(path).map_err(UploadError::Io)?;
        let hash = base64::engine::general_purpose::STANDARD.encode(Sha256::digest(&data));
        let id = self.ids.next("upload_");

        let media = NodeBuilder::new("media")
            .attr("hash", hash)
            .attr("type", kind.as_str())
            .attr("size", data.len().to_string())
            .build();
        let iq = NodeBuilder::new("iq")
            .attr("id", id.clone())
            .attr("to", SERVER_DOMAIN)
            .attr("type", "set")
            .attr("xmlns", MEDIA_NAMESPACE)
            .children([media])
            .build();

        self.state.upload_responses.remove(&id);
        self.send_node(&iq)?;

        let deadline = Instant::now() + self.config.upload_timeout;
        let auto_receipt = self.config.auto_receipt;
        while !self.state.upload_responses.contains_key(&id) {
            if Instant::now() >= deadline {
                return Err(UploadError::RegistrationTimeout(self.config.upload_timeout).into());
            }
            if !self.poll_message(auto_receipt)? {
                return Err(UploadError::Disconnected.into());
            }
        }
        let answer = self
            .state
            .upload_responses
            .remove(&id)
            .ok_or(UploadError::MalformedResponse)?;

        if let Some(duplicate) = answer.get_optional_child("duplicate") {
            info!(target: "Client/Upload", "Realm already holds {}", path.display());
            return Ok(UploadResponse {
                url: duplicate.attr_or_empty("url").to_string(),
                mimetype: duplicate.attr_or_empty("mimetype").to_string(),
                size: duplicate.attr_u64("size").unwrap_or(0),
                duration: duplicate.attr_u64("duration").unwrap_or(0) as u32,
                is_duplicate: true,
            });
        }

        let slot_url = answer
            .get_optional_child("media")
            .and_then(|m| m.attr("url"))
            .ok_or(UploadError::EmptyUrl)?
            .to_string();
        let (host, post_path) = split_upload_url(&slot_url)?;
        let hashname = upload_hashname(path);
        let mime = mime_for(kind, &extension_of(path));
        let request = build_upload_request(
            &host,
            &post_path,
            to,
            &self.config.phone_number,
            &hashname,
            mime,
            &data,
        );
        debug!(target: "Client/Upload", "POST {} bytes to {host}{post_path}", request.len());
        let raw = self.poster.post(&host, &request).map_err(ClientError::Upload)?;
        let response = parse_upload_response(&raw)?;
        Ok(response)
    }

    /// Upload an image and send it with an optional raw thumbnail.
    pub fn send_image(
        &mut self,
        to: &str,
        path: &Path,
        thumbnail: Option<Vec<u8>>,
    ) -> Result<String, ClientError> {
        self.send_uploaded(to, path, MediaKind::Image, thumbnail)
    }

    pub fn send_video(
        &mut self,
        to: &str,
        path: &Path,
        thumbnail: Option<Vec<u8>>,
    ) -> Result<String, ClientError> {
        self.send_uploaded(to, path, MediaKind::Video, thumbnail)
    }

    pub fn send_audio(&mut self, to: &str, path: &Path) -> Result<String, ClientError> {
        self.send_uploaded(to, path, MediaKind::Audio, None)
    }

    fn send_uploaded(
        &mut self,
        to: &str,
        path: &Path,
        kind: MediaKind,
        thumbnail: Option<Vec<u8>>,
    ) -> Result<String, ClientError> {
        let recipient = to_jid(to);
        let hosted = self.upload_file(path, kind, &recipient)?;
        let mut msg = MessageDescriptor::media(recipient, self.ids.message_id(), kind);
        msg.file_name = hosted
            .url
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string();
        msg.url = hosted.url;
        msg.size = hosted.size;
        msg.mime_type = hosted.mimetype;
        if matches!(kind, MediaKind::Audio | MediaKind::Video) {
            msg.seconds = hosted.duration;
        }
        msg.raw_bytes = thumbnail;
        self.send_message(&msg)?;
        Ok(msg.key.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_upload_url() {
        let (host, path) = split_upload_url("https://mms1.example.net/u/abc.jpg").unwrap();
        assert_eq!(host, "mms1.example.net");
        assert_eq!(path, "/u/abc.jpg");
    }

    #[test]
    fn test_split_upload_url_rejects_plain_http() {
        assert!(matches!(
            split_upload_url("http://mms1.example.net/u/abc.jpg"),
            Err(UploadError::BadUrl(_))
        ));
    }

    #[test]
    fn test_split_upload_url_rejects_bare_host() {
        assert!(matches!(
            split_upload_url("https://hostonly"),
            Err(UploadError::BadUrl(_))
        ));
    }

    #[test]
    fn test_request_content_length_covers_body_exactly() {
        let data = vec![0xAAu8; 37];
        let request = build_upload_request(
            "mms.example.net",
            "/u/x.jpg",
            "1444@s.whatsapp.net",
            "15555215554",
            "ABCDEF.jpg",
            "image/jpeg",
            &data,
        );
        let text = String::from_utf8_lossy(&request);
        let header_end = text.find("\r\n\r\n").unwrap() + 4;
        let declared: usize = text
            .lines()
            .find_map(|l| l.strip_prefix("Content-Length: "))
            .unwrap()
            .parse()
            .unwrap();
        assert_eq!(declared, request.len() - header_end);
    }

    #[test]
    fn test_request_shape() {
        let request = build_upload_request(
            "mms.example.net",
            "/u/x.jpg",
            "1444@s.whatsapp.net",
            "15555215554",
            "ABCDEF.jpg",
            "image/jpeg",
            b"data",
        );
        let text = String::from_utf8_lossy(&request);
        assert!(text.starts_with("POST /u/x.jpg HTTP/1.1\r\n"));
        assert!(text.contains("boundary=zzXXzzYYzzXXzzQQ"));
        assert!(text.contains("name=\"to\"\r\n\r\n1444@s.whatsapp.net"));
        assert!(text.contains("name=\"from\"\r\n\r\n15555215554"));
        assert!(text.contains("filename=\"ABCDEF.jpg\""));
        assert!(text.ends_with("--zzXXzzYYzzXXzzQQ--\r\n"));
    }

    #[test]
    fn test_parse_upload_response_skips_http_preamble_and_nuls() {
        let raw = b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\n\r\n{\"url\":\"https://mms.example.net/f.jpg\",\"size\":12}\0\0";
        let parsed = parse_upload_response(raw).unwrap();
        assert_eq!(parsed.url, "https://mms.example.net/f.jpg");
        assert_eq!(parsed.size, 12);
        assert!(!parsed.is_duplicate);
    }

    #[test]
    fn test_parse_upload_response_requires_url() {
        let raw = b"{\"size\":12}";
        assert!(matches!(
            parse_upload_response(raw),
            Err(UploadError::EmptyUrl)
        ));
    }

    #[test]
    fn test_parse_upload_response_without_json_is_malformed() {
        assert!(matches!(
            parse_upload_response(b"HTTP/1.1 500 Internal Server Error\r\n\r\n"),
            Err(UploadError::MalformedResponse)
        ));
    }

    #[test]
    fn test_hashname_is_uppercase_md5_with_extension() {
        let name = upload_hashname(Path::new("/tmp/photo.JPG"));
        let (digest, ext) = name.split_once('.').unwrap();
        assert_eq!(digest.len(), 32);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
        assert_eq!(ext, "jpg");
    }

    #[test]
    fn test_mime_tables() {
        assert_eq!(mime_for(MediaKind::Image, "png"), "image/png");
        assert_eq!(mime_for(MediaKind::Image, "webp"), "image/jpeg");
        assert_eq!(mime_for(MediaKind::Video, "mov"), "video/quicktime");
        assert_eq!(mime_for(MediaKind::Audio, "m4a"), "audio/mp4");
        assert_eq!(mime_for(MediaKind::Audio, "mp3"), "audio/mpeg");
    }
}
