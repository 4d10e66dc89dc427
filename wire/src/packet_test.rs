use super::*;

// =============================================================
// decode
// =============================================================

#[test]
fn decode_open_reads_handshake_timings() {
    let packet = decode(r#"0{"sid":"abc","upgrades":[],"pingInterval":25000,"pingTimeout":20000,"maxPayload":1000000}"#)
        .expect("open packet");
    let Packet::Open(handshake) = packet else {
        panic!("expected open, got {packet:?}");
    };
    assert_eq!(handshake.sid, "abc");
    assert_eq!(handshake.ping_interval, 25000);
    assert_eq!(handshake.ping_timeout, 20000);
    assert_eq!(handshake.max_payload, Some(1_000_000));
}

#[test]
fn decode_heartbeat_and_control_packets() {
    assert_eq!(decode("1").expect("close"), Packet::Close);
    assert_eq!(decode("2").expect("ping"), Packet::Ping);
    assert_eq!(decode("2probe").expect("probe ping"), Packet::Ping);
    assert_eq!(decode("3").expect("pong"), Packet::Pong);
    assert_eq!(decode("6").expect("noop"), Packet::Noop);
}

#[test]
fn decode_connect_with_and_without_data() {
    assert_eq!(
        decode("40").expect("connect"),
        Packet::Connect { namespace: "/".to_owned(), data: None }
    );
    assert_eq!(
        decode(r#"40{"sid":"xyz"}"#).expect("connect ack"),
        Packet::Connect { namespace: "/".to_owned(), data: Some(serde_json::json!({"sid":"xyz"})) }
    );
}

#[test]
fn decode_event_with_payload() {
    let packet = decode(r#"42["chat message",{"text":"hi","type":"message"}]"#).expect("event");
    assert_eq!(
        packet,
        Packet::Event {
            namespace: "/".to_owned(),
            ack_id: None,
            name: "chat message".to_owned(),
            payload: serde_json::json!({"text":"hi","type":"message"}),
        }
    );
}

#[test]
fn decode_event_without_payload_yields_null() {
    let Packet::Event { name, payload, .. } = decode(r#"42["user stopped typing"]"#).expect("event") else {
        panic!("expected event");
    };
    assert_eq!(name, "user stopped typing");
    assert!(payload.is_null());
}

#[test]
fn decode_event_reads_namespace_and_ack_id() {
    let packet = decode(r#"42/admin,7["typing",{"room":"r"}]"#).expect("event");
    assert_eq!(
        packet,
        Packet::Event {
            namespace: "/admin".to_owned(),
            ack_id: Some(7),
            name: "typing".to_owned(),
            payload: serde_json::json!({"room":"r"}),
        }
    );
}

#[test]
fn decode_event_ignores_extra_arguments() {
    let Packet::Event { payload, .. } = decode(r#"42["update user list",["a","b"],"extra"]"#).expect("event") else {
        panic!("expected event");
    };
    assert_eq!(payload, serde_json::json!(["a", "b"]));
}

#[test]
fn decode_connect_error_keeps_message() {
    let packet = decode(r#"44{"message":"Not authorized"}"#).expect("connect error");
    assert_eq!(
        packet,
        Packet::ConnectError { namespace: "/".to_owned(), data: serde_json::json!({"message":"Not authorized"}) }
    );
}

#[test]
fn decode_rejects_empty_and_unknown_types() {
    assert!(matches!(decode(""), Err(CodecError::Empty)));
    assert!(matches!(decode("9"), Err(CodecError::UnknownType('9'))));
    assert!(matches!(decode("4"), Err(CodecError::Empty)));
    assert!(matches!(decode("49"), Err(CodecError::UnknownType('9'))));
}

#[test]
fn decode_rejects_unsupported_packets() {
    assert!(matches!(decode("5"), Err(CodecError::Unsupported(_))));
    assert!(matches!(decode("43[]"), Err(CodecError::Unsupported(_))));
    assert!(matches!(decode(r#"451-["x",{"_placeholder":true,"num":0}]"#), Err(CodecError::Unsupported(_))));
}

#[test]
fn decode_rejects_malformed_events() {
    assert!(matches!(decode(r#"42{"text":"hi"}"#), Err(CodecError::MalformedEvent)));
    assert!(matches!(decode("42[]"), Err(CodecError::MalformedEvent)));
    assert!(matches!(decode("42[1,2]"), Err(CodecError::MalformedEvent)));
    assert!(matches!(decode("42[\"x\""), Err(CodecError::Json(_))));
    assert!(matches!(decode("4299999999999999999999[\"x\"]"), Err(CodecError::InvalidAckId)));
}

// =============================================================
// encode
// =============================================================

#[test]
fn encode_control_packets() {
    assert_eq!(encode(&Packet::Pong), "3");
    assert_eq!(encode(&Packet::Close), "1");
    assert_eq!(encode(&Packet::Connect { namespace: "/".to_owned(), data: None }), "40");
    assert_eq!(encode(&Packet::Disconnect { namespace: "/chat".to_owned() }), "41/chat,");
}

#[test]
fn encode_event_writes_name_then_payload() {
    let packet = Packet::Event {
        namespace: "/".to_owned(),
        ack_id: None,
        name: "stop typing".to_owned(),
        payload: serde_json::json!({"room":"r1"}),
    };
    assert_eq!(encode(&packet), r#"42["stop typing",{"room":"r1"}]"#);
}

#[test]
fn encode_event_omits_null_payload_and_keeps_namespace() {
    let packet = Packet::Event {
        namespace: "/chat".to_owned(),
        ack_id: Some(3),
        name: "user stopped typing".to_owned(),
        payload: serde_json::Value::Null,
    };
    assert_eq!(encode(&packet), r#"42/chat,3["user stopped typing"]"#);
}

#[test]
fn encoded_event_decodes_to_same_packet() {
    let packet = Packet::Event {
        namespace: "/".to_owned(),
        ack_id: None,
        name: "join room".to_owned(),
        payload: serde_json::json!({"room":"r1","username":"bob"}),
    };
    assert_eq!(decode(&encode(&packet)).expect("decode"), packet);
}
