//! Unit tests for the AMI framing codec.
//!
//! Covers message extraction, separator tolerance between messages, chunked
//! versus whole-buffer feeding, the buffer ceiling, and action encoding.

use bytes::BytesMut;
use rstest::rstest;
use tokio_util::codec::{Decoder, Encoder};

use super::*;
use crate::actions::Ping;

fn drain(codec: &mut AmiCodec, src: &mut BytesMut) -> Vec<String> {
    let mut messages = Vec::new();
    while let Ok(Some(message)) = codec.decode(src) {
        messages.push(message);
    }
    messages
}

#[test]
fn decode_extracts_complete_message_and_keeps_partial() {
    let mut codec = AmiCodec::new();
    let mut src = BytesMut::from(
        "Event: Hangup\r\nChannel: SIP/100\r\n\r\nResponse: Success\r\n".as_bytes(),
    );

    let messages = drain(&mut codec, &mut src);

    assert_eq!(messages, vec!["Event: Hangup\r\nChannel: SIP/100".to_owned()]);
    assert_eq!(&src[..], b"Response: Success\r\n");
}

#[test]
fn decode_returns_none_for_incomplete_message() {
    let mut codec = AmiCodec::new();
    let mut src = BytesMut::from("Event: Hangup\r\n".as_bytes());

    assert!(codec.decode(&mut src).expect("decode should succeed").is_none());
    assert_eq!(&src[..], b"Event: Hangup\r\n");
}

#[test]
fn decode_skips_extraneous_blank_lines_between_messages() {
    let mut codec = AmiCodec::new();
    let mut src = BytesMut::from(
        "Event: A\r\n\r\n\r\n\r\nEvent: B\r\n\r\n".as_bytes(),
    );

    let messages = drain(&mut codec, &mut src);

    assert_eq!(messages, vec!["Event: A".to_owned(), "Event: B".to_owned()]);
    assert!(src.is_empty());
}

#[rstest]
#[case(1)]
#[case(3)]
#[case(7)]
fn chunked_feeding_matches_whole_buffer(#[case] chunk: usize) {
    let input = b"Response: Success\r\nActionID: 1\r\n\r\n\r\nEvent: Status\r\nActionID: 1\r\n\r\nEvent: StatusComplete\r\nActionID: 1\r\n\r\npartial";

    let mut whole_codec = AmiCodec::new();
    let mut whole_src = BytesMut::from(&input[..]);
    let expected = drain(&mut whole_codec, &mut whole_src);

    let mut codec = AmiCodec::new();
    let mut src = BytesMut::new();
    let mut messages = Vec::new();
    for piece in input.chunks(chunk) {
        src.extend_from_slice(piece);
        messages.extend(drain(&mut codec, &mut src));
    }

    assert_eq!(messages, expected);
    assert_eq!(&src[..], &whole_src[..]);
}

#[test]
fn overflow_without_delimiter_resets_buffer_and_errors_once() {
    let mut codec = AmiCodec::with_max_buffer(64);
    let mut src = BytesMut::from(vec![b'x'; 65].as_slice());

    let err = codec
        .decode(&mut src)
        .expect_err("expected buffer overflow error");

    assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
    assert!(src.is_empty());
    // The buffer was reset, so the next feed starts clean.
    src.extend_from_slice(b"Event: A\r\n\r\n");
    assert_eq!(drain(&mut codec, &mut src), vec!["Event: A".to_owned()]);
}

#[test]
fn buffer_at_ceiling_is_not_an_overflow() {
    let mut codec = AmiCodec::with_max_buffer(8);
    let mut src = BytesMut::from(vec![b'x'; 8].as_slice());

    assert!(codec.decode(&mut src).expect("decode should succeed").is_none());
}

#[test]
fn decode_eof_discards_trailing_partial_message() {
    let mut codec = AmiCodec::new();
    let mut src = BytesMut::from("Event: A\r\n\r\nEvent: B\r\nhalf".as_bytes());

    let first = codec.decode_eof(&mut src).expect("decode_eof should succeed");
    assert_eq!(first.as_deref(), Some("Event: A"));

    let second = codec.decode_eof(&mut src).expect("decode_eof should succeed");
    assert!(second.is_none());
    assert!(src.is_empty());
}

#[test]
fn encode_writes_marshalled_action_text() {
    let mut codec = AmiCodec::new();
    let action = Action::build(5, &Ping);
    let mut dst = BytesMut::new();

    codec.encode(&action, &mut dst).expect("encode should succeed");

    assert_eq!(&dst[..], b"ActionID: 5\r\nAction: Ping\r\n\r\n");
}
