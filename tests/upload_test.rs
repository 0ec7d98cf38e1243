use funxmpp::message::MediaKind;
use funxmpp::test_utils::{
    logged_in_client, logged_in_client_with_config, test_config, FailingPoster, RecordingPoster,
};
use funxmpp::upload::UploadError;
use funxmpp::{ClientError, Node, NodeBuilder};
use std::io::Write;
use std::time::Duration;

fn media_fixture(bytes: &[u8]) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".jpg")
        .tempfile()
        .unwrap();
    file.write_all(bytes).unwrap();
    file.flush().unwrap();
    file
}

/// Registration answers correlate by id; the first id a fresh client
/// allocates for an upload is `upload_0`.
fn registration_result(inner: Node) -> Node {
    NodeBuilder::new("iq")
        .attr("type", "result")
        .attr("id", "upload_0")
        .children([inner])
        .build()
}

#[test]
fn test_duplicate_registration_short_circuits_the_post() {
    let duplicate = NodeBuilder::new("duplicate")
        .attr("url", "https://mms.example.net/f/DEAD.jpg")
        .attr("mimetype", "image/jpeg")
        .attr("size", "4")
        .build();
    let poster = RecordingPoster::respond_with("{}");
    let requests = poster.requests.clone();
    let mut client =
        logged_in_client(vec![registration_result(duplicate)]).with_poster(Box::new(poster));

    let fixture = media_fixture(b"data");
    let hosted = client
        .upload_file(fixture.path(), MediaKind::Image, "1444@s.whatsapp.net")
        .unwrap();

    assert!(hosted.is_duplicate);
    assert_eq!(hosted.url, "https://mms.example.net/f/DEAD.jpg");
    assert_eq!(hosted.size, 4);
    assert!(requests.borrow().is_empty());
}

#[test]
fn test_fresh_upload_posts_once_to_the_granted_slot() {
    let slot = NodeBuilder::new("media")
        .attr("url", "https://mms1.example.net/u/slot-1")
        .build();
    let poster = RecordingPoster::respond_with(
        "{\"url\":\"https://mms1.example.net/f/ABC.jpg\",\"size\":4,\"mimetype\":\"image/jpeg\"}",
    );
    let requests = poster.requests.clone();
    let mut client =
        logged_in_client(vec![registration_result(slot)]).with_poster(Box::new(poster));

    let fixture = media_fixture(b"data");
    let hosted = client
        .upload_file(fixture.path(), MediaKind::Image, "1444@s.whatsapp.net")
        .unwrap();

    assert!(!hosted.is_duplicate);
    assert_eq!(hosted.url, "https://mms1.example.net/f/ABC.jpg");

    let requests = requests.borrow();
    assert_eq!(requests.len(), 1);
    let (host, request) = &requests[0];
    assert_eq!(host, "mms1.example.net");
    let text = String::from_utf8_lossy(request);
    assert!(text.starts_with("POST /u/slot-1 HTTP/1.1\r\n"));
    assert!(text.contains("name=\"to\"\r\n\r\n1444@s.whatsapp.net"));
    assert!(text.contains("name=\"from\"\r\n\r\n15555215554"));
    assert!(text.contains("Content-Type: image/jpeg"));

    // The registration iq itself went over the session stream, addressed
    // to the media realm by its namespace.
    let registration = &client.codec().sent[0].0;
    assert_eq!(registration.tag, "iq");
    assert_eq!(registration.attr("xmlns"), Some("w:m"));
    assert_eq!(registration.attr("type"), Some("set"));
    let media = registration.children().unwrap().first().unwrap();
    assert_eq!(media.attr("type"), Some("image"));
    assert_eq!(media.attr("size"), Some("4"));
    assert!(media.attr("hash").is_some());
}

#[test]
fn test_messages_arriving_mid_upload_are_receipted() {
    let message = NodeBuilder::new("message")
        .attr("from", "1666@s.whatsapp.net")
        .attr("id", "m-7")
        .attr("type", "text")
        .children([NodeBuilder::new("body").bytes(b"hi".to_vec()).build()])
        .build();
    let duplicate = NodeBuilder::new("duplicate")
        .attr("url", "https://mms.example.net/f/DEAD.jpg")
        .attr("size", "4")
        .build();
    let mut client = logged_in_client(vec![message, registration_result(duplicate)]);

    let fixture = media_fixture(b"data");
    client
        .upload_file(fixture.path(), MediaKind::Image, "1444@s.whatsapp.net")
        .unwrap();

    // The text message that interleaved with the registration wait got
    // its receipt, per the configured default.
    assert!(client.config().auto_receipt);
    let receipt = client
        .codec()
        .sent_nodes()
        .into_iter()
        .find(|n| n.tag == "receipt")
        .unwrap();
    assert_eq!(receipt.attr("to"), Some("1666@s.whatsapp.net"));
    assert_eq!(receipt.attr("id"), Some("m-7"));
}

#[test]
fn test_poster_failure_propagates() {
    let slot = NodeBuilder::new("media")
        .attr("url", "https://mms1.example.net/u/slot-1")
        .build();
    let mut client =
        logged_in_client(vec![registration_result(slot)]).with_poster(Box::new(FailingPoster));

    let fixture = media_fixture(b"data");
    let err = client
        .upload_file(fixture.path(), MediaKind::Image, "1444@s.whatsapp.net")
        .unwrap_err();
    assert!(matches!(err, ClientError::Upload(UploadError::Tls(_))));
}

#[test]
fn test_registration_deadline() {
    let config = test_config().upload_timeout(Duration::ZERO);
    let mut client = logged_in_client_with_config(Vec::new(), config);

    let fixture = media_fixture(b"data");
    let err = client
        .upload_file(fixture.path(), MediaKind::Image, "1444@s.whatsapp.net")
        .unwrap_err();
    assert!(matches!(
        err,
        ClientError::Upload(UploadError::RegistrationTimeout(_))
    ));
}

#[test]
fn test_session_loss_while_waiting_for_registration() {
    // No scripted stanzas: the first poll hits end of stream.
    let mut client = logged_in_client(Vec::new());

    let fixture = media_fixture(b"data");
    let err = client
        .upload_file(fixture.path(), MediaKind::Image, "1444@s.whatsapp.net")
        .unwrap_err();
    assert!(matches!(err, ClientError::Upload(UploadError::Disconnected)));
}

#[test]
fn test_send_image_wraps_the_hosted_file() {
    let slot = NodeBuilder::new("media")
        .attr("url", "https://mms1.example.net/u/slot-1")
        .build();
    let poster = RecordingPoster::respond_with(
        "{\"url\":\"https://mms1.example.net/f/ABC.jpg\",\"size\":4,\"mimetype\":\"image/jpeg\"}",
    );
    let mut client =
        logged_in_client(vec![registration_result(slot)]).with_poster(Box::new(poster));

    let fixture = media_fixture(b"data");
    let id = client
        .send_image("1444", fixture.path(), Some(vec![7, 7]))
        .unwrap();
    assert!(!id.is_empty());

    let message = client.codec().last_sent().unwrap();
    assert_eq!(message.tag, "message");
    assert_eq!(message.attr("type"), Some("media"));
    assert_eq!(message.attr("to"), Some("1444@s.whatsapp.net"));
    let media = message.get_optional_child("media").unwrap();
    assert_eq!(media.attr("url"), Some("https://mms1.example.net/f/ABC.jpg"));
    assert_eq!(media.attr("file"), Some("ABC.jpg"));
    assert_eq!(media.attr("size"), Some("4"));
    assert_eq!(media.attr("encoding"), Some("raw"));
    assert_eq!(media.payload(), Some([7u8, 7].as_ref()));
}

#[test]
fn test_send_audio_carries_duration() {
    let slot = NodeBuilder::new("media")
        .attr("url", "https://mms1.example.net/u/slot-1")
        .build();
    let poster = RecordingPoster::respond_with(
        "{\"url\":\"https://mms1.example.net/f/ABC.mp3\",\"size\":4,\"mimetype\":\"audio/mpeg\",\"duration\":31}",
    );
    let mut client =
        logged_in_client(vec![registration_result(slot)]).with_poster(Box::new(poster));

    let mut fixture = tempfile::Builder::new().suffix(".mp3").tempfile().unwrap();
    fixture.write_all(b"data").unwrap();
    fixture.flush().unwrap();

    client.send_audio("1444", fixture.path()).unwrap();
    let media = client
        .codec()
        .last_sent()
        .unwrap()
        .get_optional_child("media")
        .unwrap();
    assert_eq!(media.attr("type"), Some("audio"));
    assert_eq!(media.attr("seconds"), Some("31"));
}
