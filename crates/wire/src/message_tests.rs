// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn request_ping_and_query_ping_round_trip_distinctly() {
    let request = Message::Request(Request::Ping);
    let query = Message::Query(Query::Ping);

    let request_json = serde_json::to_string(&request).expect("serialize");
    let query_json = serde_json::to_string(&query).expect("serialize");
    assert_ne!(request_json, query_json);

    let request_back: Message = serde_json::from_str(&request_json).expect("deserialize");
    let query_back: Message = serde_json::from_str(&query_json).expect("deserialize");
    assert_eq!(request_back, request);
    assert_eq!(query_back, query);
}

#[test]
fn message_round_trips_through_the_frame_codec() {
    let message = Message::Query(Query::GetStatus);
    let frame = crate::encode(&message).expect("encode");
    let decoded: Message = crate::decode(&frame[4..]).expect("decode");
    assert_eq!(decoded, message);
}
