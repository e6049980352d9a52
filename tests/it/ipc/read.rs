use arrow_format::ipc;
use arrow_format::ipc::planus::Builder;

use arrow_wire::alloc::HeapAllocator;
use arrow_wire::error::Error;
use arrow_wire::io::ipc::channel::{ReadChannel, WriteChannel};
use arrow_wire::io::ipc::read::{read_message, read_next, read_record_batch, read_schema};
use arrow_wire::io::ipc::write::serialize_schema_message;

use super::{int32_batch, sample_schema};

/// Frames `payload` as a single message at stream position 0: prefix,
/// payload and padding, with the stored length inflated by the padding.
fn frame(payload: &[u8]) -> Vec<u8> {
    let mut stored = payload.len();
    let padding = (4 + stored) % 8;
    if padding != 0 {
        stored += 8 - padding;
    }
    let mut out = (stored as i32).to_le_bytes().to_vec();
    out.extend_from_slice(payload);
    out.resize(4 + stored, 0);
    out
}

fn message_bytes(message: &ipc::Message) -> Vec<u8> {
    let mut builder = Builder::new();
    builder.finish(message, None).to_vec()
}

fn empty_batch_header() -> ipc::MessageHeader {
    ipc::MessageHeader::RecordBatch(Box::new(ipc::RecordBatch {
        length: 0,
        nodes: Some(vec![]),
        buffers: Some(vec![]),
        compression: None,
    }))
}

#[test]
fn zero_prefix_is_end_of_stream() {
    let mut channel = ReadChannel::new(&[0u8, 0, 0, 0][..]);
    let mut scratch = vec![];
    assert!(!read_message(&mut channel, &mut scratch).unwrap());

    let mut channel = ReadChannel::new(&[0u8, 0, 0, 0][..]);
    let next = read_next(&mut channel, &HeapAllocator, &mut scratch).unwrap();
    assert!(next.is_none());
}

#[test]
fn empty_stream_is_end_of_stream() {
    let mut channel = ReadChannel::new(&[][..]);
    let mut scratch = vec![];
    assert!(!read_message(&mut channel, &mut scratch).unwrap());
}

#[test]
fn partial_prefix_is_unexpected_eof() {
    let mut channel = ReadChannel::new(&[0u8, 0][..]);
    let mut scratch = vec![];
    let result = read_message(&mut channel, &mut scratch);
    assert!(matches!(result, Err(Error::UnexpectedEof(_))));
}

#[test]
fn truncated_metadata_is_unexpected_eof() {
    let mut channel = WriteChannel::new(vec![]);
    serialize_schema_message(&mut channel, &sample_schema(), &[Default::default()]).unwrap();
    let data = channel.into_inner();

    let mut channel = ReadChannel::new(&data[..10]);
    let mut scratch = vec![];
    let result = read_message(&mut channel, &mut scratch);
    assert!(matches!(result, Err(Error::UnexpectedEof(_))));
}

#[test]
fn truncated_body_is_unexpected_eof() {
    let mut writer = arrow_wire::io::ipc::write::StreamWriter::new(vec![]);
    writer.start(&sample_schema(), None).unwrap();
    writer.write(&int32_batch()).unwrap();
    let data = writer.into_inner();

    // cut into the last buffer's padding
    let mut channel = ReadChannel::new(&data[..data.len() - 4]);
    let mut scratch = vec![];
    read_schema(&mut channel, &mut scratch).unwrap();
    let result = read_record_batch(&mut channel, &HeapAllocator, &mut scratch);
    assert!(matches!(result, Err(Error::UnexpectedEof(_))));
}

#[test]
fn negative_prefix_is_out_of_spec() {
    let mut data = (-8i32).to_le_bytes().to_vec();
    data.extend_from_slice(&[0; 16]);
    let mut channel = ReadChannel::new(data.as_slice());
    let mut scratch = vec![];
    let result = read_message(&mut channel, &mut scratch);
    assert!(matches!(result, Err(Error::OutOfSpec(_))));
}

#[test]
fn version_mismatch_is_rejected() {
    let message = ipc::Message {
        version: ipc::MetadataVersion::V3,
        header: Some(empty_batch_header()),
        body_length: 0,
        custom_metadata: None,
    };
    let data = frame(&message_bytes(&message));

    let mut channel = ReadChannel::new(data.as_slice());
    let mut scratch = vec![];
    let result = read_next(&mut channel, &HeapAllocator, &mut scratch);
    assert!(matches!(result, Err(Error::IncompatibleVersion(_))));
}

#[test]
fn oversized_body_is_rejected_before_reading_it() {
    let message = ipc::Message {
        version: ipc::MetadataVersion::V4,
        header: Some(empty_batch_header()),
        body_length: i64::from(i32::MAX) + 1,
        custom_metadata: None,
    };
    // no body bytes follow: the gate must fire on the declared length alone
    let data = frame(&message_bytes(&message));

    let mut channel = ReadChannel::new(data.as_slice());
    let mut scratch = vec![];
    let result = read_next(&mut channel, &HeapAllocator, &mut scratch);
    assert!(matches!(result, Err(Error::Oversized(_))));
}

#[test]
fn oversized_row_count_is_rejected() {
    let message = ipc::Message {
        version: ipc::MetadataVersion::V4,
        header: Some(ipc::MessageHeader::RecordBatch(Box::new(
            ipc::RecordBatch {
                length: i64::from(i32::MAX) + 1,
                nodes: Some(vec![]),
                buffers: Some(vec![]),
                compression: None,
            },
        ))),
        body_length: 0,
        custom_metadata: None,
    };
    let data = frame(&message_bytes(&message));

    let mut channel = ReadChannel::new(data.as_slice());
    let mut scratch = vec![];
    let result = read_next(&mut channel, &HeapAllocator, &mut scratch);
    assert!(matches!(result, Err(Error::Oversized(_))));
}

#[test]
fn schema_where_batch_expected_is_unexpected_header() {
    let mut channel = WriteChannel::new(vec![]);
    serialize_schema_message(&mut channel, &sample_schema(), &[Default::default()]).unwrap();
    let data = channel.into_inner();

    let mut channel = ReadChannel::new(data.as_slice());
    let mut scratch = vec![];
    let result = read_record_batch(&mut channel, &HeapAllocator, &mut scratch);
    assert!(matches!(result, Err(Error::UnexpectedHeader(_))));
}

#[test]
fn batch_where_schema_expected_is_unexpected_header() {
    let message = ipc::Message {
        version: ipc::MetadataVersion::V4,
        header: Some(empty_batch_header()),
        body_length: 0,
        custom_metadata: None,
    };
    let data = frame(&message_bytes(&message));

    let mut channel = ReadChannel::new(data.as_slice());
    let mut scratch = vec![];
    let result = read_schema(&mut channel, &mut scratch);
    assert!(matches!(result, Err(Error::UnexpectedHeader(_))));
}

#[test]
fn buffer_outside_body_is_a_layout_violation() {
    let message = ipc::Message {
        version: ipc::MetadataVersion::V4,
        header: Some(ipc::MessageHeader::RecordBatch(Box::new(
            ipc::RecordBatch {
                length: 1,
                nodes: Some(vec![ipc::FieldNode {
                    length: 1,
                    null_count: 0,
                }]),
                buffers: Some(vec![ipc::Buffer {
                    offset: 0,
                    length: 32,
                }]),
                compression: None,
            },
        ))),
        body_length: 8,
        custom_metadata: None,
    };
    let mut data = frame(&message_bytes(&message));
    data.extend_from_slice(&[0u8; 8]);

    let mut channel = ReadChannel::new(data.as_slice());
    let mut scratch = vec![];
    let result = read_next(&mut channel, &HeapAllocator, &mut scratch);
    assert!(matches!(result, Err(Error::BufferLayout(_))));
}

#[test]
fn overlapping_buffers_are_a_layout_violation() {
    let message = ipc::Message {
        version: ipc::MetadataVersion::V4,
        header: Some(ipc::MessageHeader::RecordBatch(Box::new(
            ipc::RecordBatch {
                length: 1,
                nodes: Some(vec![ipc::FieldNode {
                    length: 1,
                    null_count: 0,
                }]),
                buffers: Some(vec![
                    ipc::Buffer {
                        offset: 0,
                        length: 16,
                    },
                    ipc::Buffer {
                        offset: 8,
                        length: 8,
                    },
                ]),
                compression: None,
            },
        ))),
        body_length: 24,
        custom_metadata: None,
    };
    let mut data = frame(&message_bytes(&message));
    data.extend_from_slice(&[0u8; 24]);

    let mut channel = ReadChannel::new(data.as_slice());
    let mut scratch = vec![];
    let result = read_next(&mut channel, &HeapAllocator, &mut scratch);
    assert!(matches!(result, Err(Error::BufferLayout(_))));
}

#[test]
fn map_without_key_value_struct_child_is_rejected() {
    let child = ipc::Field {
        name: None,
        nullable: false,
        type_: Some(ipc::Type::Int(Box::new(ipc::Int {
            bit_width: 32,
            is_signed: true,
        }))),
        dictionary: None,
        children: Some(vec![]),
        custom_metadata: None,
    };
    let map_field = ipc::Field {
        name: Some("m".to_string()),
        nullable: true,
        type_: Some(ipc::Type::Map(Box::new(ipc::Map { keys_sorted: false }))),
        dictionary: None,
        children: Some(vec![child]),
        custom_metadata: None,
    };
    let schema = ipc::Schema {
        endianness: ipc::Endianness::Little,
        fields: Some(vec![map_field]),
        custom_metadata: None,
        features: None,
    };
    let message = ipc::Message {
        version: ipc::MetadataVersion::V4,
        header: Some(ipc::MessageHeader::Schema(Box::new(schema))),
        body_length: 0,
        custom_metadata: None,
    };
    let data = frame(&message_bytes(&message));

    let mut channel = ReadChannel::new(data.as_slice());
    let mut scratch = vec![];
    let result = read_schema(&mut channel, &mut scratch);
    assert!(matches!(result, Err(Error::OutOfSpec(_))));
}

#[test]
fn stream_without_schema_errors() {
    use arrow_wire::io::ipc::read::StreamReader;
    let result = StreamReader::try_new(&[][..], HeapAllocator);
    assert!(matches!(result, Err(Error::UnexpectedEof(_))));
}

#[test]
fn stream_with_only_end_marker_after_schema() {
    use arrow_wire::io::ipc::read::StreamReader;

    let mut writer = arrow_wire::io::ipc::write::StreamWriter::new(vec![]);
    writer.start(&sample_schema(), None).unwrap();
    writer.finish().unwrap();
    let data = writer.into_inner();

    let mut reader = StreamReader::try_new(data.as_slice(), HeapAllocator).unwrap();
    assert!(reader.next().is_none());
    assert!(reader.is_finished());
}
