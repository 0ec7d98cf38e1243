use funxmpp::consts::SERVER_DOMAIN;
use funxmpp::events::ReceiptKind;
use funxmpp::message::MediaKind;
use funxmpp::test_utils::logged_in_client;
use funxmpp::{ClientError, Event, Node, NodeBuilder};
use std::cell::RefCell;
use std::rc::Rc;

type ScriptedClient =
    funxmpp::Client<funxmpp::test_utils::ScriptedTransport, funxmpp::test_utils::ScriptedCodec>;

fn capture_events(client: &mut ScriptedClient) -> Rc<RefCell<Vec<Event>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = events.clone();
    client.on_event(move |event| sink.borrow_mut().push(event.clone()));
    events
}

fn text_message(from: &str, id: &str, notify: &str, body: &str) -> Node {
    NodeBuilder::new("message")
        .attr("from", from)
        .attr("id", id)
        .attr("notify", notify)
        .attr("type", "text")
        .children([NodeBuilder::new("body").bytes(body.as_bytes().to_vec()).build()])
        .build()
}

#[test]
fn test_events_fire_in_arrival_order() {
    let script = vec![
        NodeBuilder::new("receipt")
            .attr("from", "1444@s.whatsapp.net")
            .attr("id", "m-1")
            .build(),
        text_message("1444@s.whatsapp.net", "m-2", "Alice", "hi"),
        NodeBuilder::new("iq")
            .attr("type", "result")
            .children([NodeBuilder::new("sync").attr("sid", "s-1").attr("index", "0").build()])
            .build(),
    ];
    let mut client = logged_in_client(script);
    let events = capture_events(&mut client);

    client.poll_messages(true).unwrap();

    let events = events.borrow();
    assert!(matches!(
        &events[0],
        Event::Receipt { id, kind: ReceiptKind::Delivered, .. } if id == "m-1"
    ));
    assert!(matches!(
        &events[1],
        Event::ContactName { name, .. } if name == "Alice"
    ));
    assert!(matches!(
        &events[2],
        Event::TextMessage { id, body, .. } if id == "m-2" && body == "hi"
    ));
    assert!(matches!(
        &events[3],
        Event::SyncResult { sid, .. } if sid == "s-1"
    ));

    // One ack for the receipt, one receipt for the message; the sync
    // result triggers no reply.
    assert_eq!(client.codec().sent_tags(), vec!["ack", "receipt"]);
}

#[test]
fn test_receipt_ack_mirrors_the_stanza() {
    let script = vec![
        NodeBuilder::new("receipt")
            .attr("from", "123-456@g.us")
            .attr("to", "15555215554@s.whatsapp.net")
            .attr("participant", "1444@s.whatsapp.net")
            .attr("id", "m-9")
            .attr("type", "read")
            .build(),
    ];
    let mut client = logged_in_client(script);
    client.poll_messages(true).unwrap();

    let ack = client.codec().last_sent().unwrap();
    assert_eq!(ack.tag, "ack");
    assert_eq!(ack.attr("to"), Some("123-456@g.us"));
    assert_eq!(ack.attr("from"), Some("15555215554@s.whatsapp.net"));
    assert_eq!(ack.attr("participant"), Some("1444@s.whatsapp.net"));
    assert_eq!(ack.attr("class"), Some("receipt"));
    assert_eq!(ack.attr("id"), Some("m-9"));
    assert_eq!(ack.attr("type"), Some("read"));
}

#[test]
fn test_text_message_without_auto_receipt_stays_silent() {
    let script = vec![text_message("1444@s.whatsapp.net", "m-2", "", "hi")];
    let mut client = logged_in_client(script);
    let events = capture_events(&mut client);

    client.poll_messages(false).unwrap();

    assert_eq!(events.borrow().len(), 1);
    assert!(client.codec().sent.is_empty());
}

#[test]
fn test_media_messages_are_always_receipted() {
    let media = NodeBuilder::new("media")
        .attr("type", "image")
        .attr("file", "photo.jpg")
        .attr("size", "2048")
        .attr("url", "https://mms.example.net/photo.jpg")
        .bytes(vec![1, 2, 3])
        .build();
    let script = vec![NodeBuilder::new("message")
        .attr("from", "1444@s.whatsapp.net")
        .attr("id", "m-3")
        .attr("type", "media")
        .children([media])
        .build()];
    let mut client = logged_in_client(script);
    let events = capture_events(&mut client);

    client.poll_messages(false).unwrap();

    assert!(matches!(
        events.borrow().first(),
        Some(Event::FileMessage { kind: MediaKind::Image, size: 2048, preview: Some(p), .. })
            if p == &[1, 2, 3]
    ));
    assert_eq!(client.codec().sent_tags(), vec!["receipt"]);
}

#[test]
fn test_location_and_vcard_media() {
    let location = NodeBuilder::new("media")
        .attr("type", "location")
        .attr("latitude", "52.52")
        .attr("longitude", "13.405")
        .attr("name", "Berlin")
        .build();
    let vcard = NodeBuilder::new("media")
        .attr("type", "vcard")
        .children([NodeBuilder::new("vcard")
            .attr("name", "Alice")
            .bytes(b"BEGIN:VCARD".to_vec())
            .build()])
        .build();
    let script = vec![
        NodeBuilder::new("message")
            .attr("from", "a@s.whatsapp.net")
            .attr("id", "m-4")
            .children([location])
            .build(),
        NodeBuilder::new("message")
            .attr("from", "a@s.whatsapp.net")
            .attr("id", "m-5")
            .children([vcard])
            .build(),
    ];
    let mut client = logged_in_client(script);
    let events = capture_events(&mut client);

    client.poll_messages(false).unwrap();

    let events = events.borrow();
    assert!(matches!(
        &events[0],
        Event::LocationMessage { latitude, name, .. }
            if *latitude == 52.52 && name == "Berlin"
    ));
    assert!(matches!(
        &events[1],
        Event::ContactMessage { name, vcard, .. }
            if name == "Alice" && vcard == b"BEGIN:VCARD"
    ));
}

#[test]
fn test_error_message_is_unsupported() {
    let script = vec![NodeBuilder::new("message")
        .attr("from", "a@s.whatsapp.net")
        .attr("type", "error")
        .build()];
    let mut client = logged_in_client(script);
    assert!(matches!(
        client.poll_message(true),
        Err(ClientError::UnsupportedStanza(_))
    ));
}

#[test]
fn test_ping_gets_a_pong() {
    let script = vec![NodeBuilder::new("iq")
        .attr("type", "get")
        .attr("id", "ping-7")
        .attr("from", SERVER_DOMAIN)
        .children([NodeBuilder::new("ping").build()])
        .build()];
    let mut client = logged_in_client(script);
    client.poll_messages(true).unwrap();

    let pong = client.codec().last_sent().unwrap();
    assert_eq!(pong.tag, "iq");
    assert_eq!(pong.attr("type"), Some("result"));
    assert_eq!(pong.attr("id"), Some("ping-7"));
    assert_eq!(pong.attr("to"), Some(SERVER_DOMAIN));
}

#[test]
fn test_dirty_ib_triggers_cleanup() {
    let script = vec![NodeBuilder::new("ib")
        .children([NodeBuilder::new("dirty").attr("type", "groups").build()])
        .build()];
    let mut client = logged_in_client(script);
    client.poll_messages(true).unwrap();

    let clean = client.codec().last_sent().unwrap();
    assert_eq!(clean.tag, "iq");
    let category = clean
        .children()
        .unwrap()
        .iter()
        .find(|c| c.tag == "clean")
        .unwrap();
    assert_eq!(category.attr("type"), Some("groups"));
}

#[test]
fn test_unknown_ib_child_is_unsupported() {
    let script = vec![NodeBuilder::new("ib")
        .children([NodeBuilder::new("mystery").build()])
        .build()];
    let mut client = logged_in_client(script);
    assert!(matches!(
        client.poll_message(true),
        Err(ClientError::UnsupportedStanza(_))
    ));
}

#[test]
fn test_chat_states() {
    let script = vec![
        NodeBuilder::new("chatstate")
            .attr("from", "a@s.whatsapp.net")
            .children([NodeBuilder::new("composing").build()])
            .build(),
        NodeBuilder::new("chatstate")
            .attr("from", "a@s.whatsapp.net")
            .children([NodeBuilder::new("paused").build()])
            .build(),
    ];
    let mut client = logged_in_client(script);
    let events = capture_events(&mut client);
    client.poll_messages(true).unwrap();
    let events = events.borrow();
    assert!(matches!(&events[0], Event::Typing { .. }));
    assert!(matches!(&events[1], Event::TypingPaused { .. }));
}

#[test]
fn test_server_ack_for_sent_message() {
    let script = vec![NodeBuilder::new("ack")
        .attr("class", "message")
        .attr("from", "1444@s.whatsapp.net")
        .attr("id", "m-1")
        .build()];
    let mut client = logged_in_client(script);
    let events = capture_events(&mut client);
    client.poll_messages(true).unwrap();
    assert!(matches!(
        events.borrow().first(),
        Some(Event::ServerAck { id, .. }) if id == "m-1"
    ));
}

#[test]
fn test_picture_notification_is_emitted_and_acked() {
    let script = vec![NodeBuilder::new("notification")
        .attr("from", "1444@s.whatsapp.net")
        .attr("id", "n-1")
        .attr("type", "picture")
        .children([NodeBuilder::new("set")
            .attr("jid", "1444@s.whatsapp.net")
            .attr("id", "777")
            .build()])
        .build()];
    let mut client = logged_in_client(script);
    let events = capture_events(&mut client);
    client.poll_messages(true).unwrap();

    assert!(matches!(
        events.borrow().first(),
        Some(Event::PictureNotification { kind, id, .. })
            if kind == "set" && id == "777"
    ));
    let ack = client.codec().last_sent().unwrap();
    assert_eq!(ack.attr("class"), Some("notification"));
    assert_eq!(ack.attr("type"), Some("picture"));
    assert_eq!(ack.attr("id"), Some("n-1"));
}

#[test]
fn test_sync_result_partitions_numbers() {
    let matched = NodeBuilder::new("in").children([NodeBuilder::new("user")
        .attr("jid", "1444@s.whatsapp.net")
        .bytes(b"+1444".to_vec())
        .build()]);
    let unmatched = NodeBuilder::new("out")
        .children([NodeBuilder::new("user").bytes(b"+1999".to_vec()).build()]);
    let script = vec![NodeBuilder::new("iq")
        .attr("type", "result")
        .children([NodeBuilder::new("sync")
            .attr("sid", "sync-1")
            .attr("index", "2")
            .children([matched.build(), unmatched.build()])
            .build()])
        .build()];
    let mut client = logged_in_client(script);
    let events = capture_events(&mut client);
    client.poll_messages(true).unwrap();

    let events = events.borrow();
    let Event::SyncResult { index, sid, existing, missing } = &events[0] else {
        panic!("expected a sync result, got {:?}", events[0]);
    };
    assert_eq!(*index, 2);
    assert_eq!(sid, "sync-1");
    assert_eq!(existing.get("+1444").map(String::as_str), Some("1444@s.whatsapp.net"));
    assert_eq!(missing, &["+1999".to_string()]);
}

#[test]
fn test_stream_error_tears_the_session_down() {
    let script = vec![NodeBuilder::new("stream:error")
        .children([NodeBuilder::new("text").bytes(b"conflict".to_vec()).build()])
        .build()];
    let mut client = logged_in_client(script);
    client.poll_messages(true).unwrap();
    assert_eq!(client.phase(), funxmpp::SessionPhase::Disconnected);
    assert_eq!(client.transport().disconnects, 1);
}

#[test]
fn test_unknown_top_level_stanza_is_skipped() {
    let script = vec![
        NodeBuilder::new("wobble").build(),
        text_message("a@s.whatsapp.net", "m-1", "", "still here"),
    ];
    let mut client = logged_in_client(script);
    let events = capture_events(&mut client);
    client.poll_messages(true).unwrap();
    assert_eq!(events.borrow().len(), 1);
}
