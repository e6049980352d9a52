use std::io::Cursor;

use arrow_wire::alloc::HeapAllocator;
use arrow_wire::io::ipc::channel::{ReadChannel, WriteChannel};
use arrow_wire::io::ipc::read::{
    read_dictionary_batch, read_record_batch_at, read_schema, ArrowMessage, StreamReader,
};
use arrow_wire::io::ipc::write::{
    default_ipc_fields, serialize_dictionary_batch, serialize_schema_message, StreamWriter,
};

use super::{dictionary_of_strings, int32_batch, rich_schema, sample_schema};

#[test]
fn empty_schema_round_trip() {
    let schema = arrow_wire::datatypes::Schema::default();

    let mut channel = WriteChannel::new(vec![]);
    let block = serialize_schema_message(&mut channel, &schema, &[]).unwrap();

    assert_eq!(block.offset, 0);
    assert_eq!(block.body_length, 0);
    assert_eq!(block.meta_data_length % 8, 0);
    let written = channel.position();
    assert_eq!(written % 8, 0);
    assert!(written >= 16);
    assert_eq!(written, block.meta_data_length as u64);

    let data = channel.into_inner();
    let mut channel = ReadChannel::new(data.as_slice());
    let mut scratch = vec![];
    let (read, ipc_schema) = read_schema(&mut channel, &mut scratch).unwrap();
    assert_eq!(read, schema);
    assert!(ipc_schema.fields.is_empty());
    assert_eq!(
        ipc_schema.is_little_endian,
        cfg!(target_endian = "little")
    );
}

#[test]
fn rich_schema_round_trip() {
    let schema = rich_schema();
    let ipc_fields = default_ipc_fields(&schema.fields);

    let mut channel = WriteChannel::new(vec![]);
    serialize_schema_message(&mut channel, &schema, &ipc_fields).unwrap();

    let data = channel.into_inner();
    let mut channel = ReadChannel::new(data.as_slice());
    let mut scratch = vec![];
    let (read, ipc_schema) = read_schema(&mut channel, &mut scratch).unwrap();

    assert_eq!(read, schema);
    assert_eq!(ipc_schema.fields, ipc_fields);
}

#[test]
fn int32_batch_round_trip() {
    let schema = sample_schema();
    let batch = int32_batch();

    let mut writer = StreamWriter::new(vec![]);
    writer.start(&schema, None).unwrap();
    let block = writer.write(&batch).unwrap();
    writer.finish().unwrap();

    assert_eq!(block.offset % 8, 0);
    assert_eq!(block.meta_data_length % 8, 0);
    assert_eq!(block.body_length % 8, 0);
    // validity padded to 8, values padded to 8
    assert_eq!(block.body_length, 24);

    let data = writer.into_inner();
    let mut reader = StreamReader::try_new(data.as_slice(), HeapAllocator).unwrap();
    assert_eq!(reader.metadata().schema, schema);

    let message = reader.next().unwrap().unwrap();
    let read = match message {
        ArrowMessage::Batch(read) => read,
        other => panic!("expected a record batch, got {other:?}"),
    };
    assert_eq!(read, batch);
    assert_eq!(read.length(), 3);
    assert_eq!(read.nodes(), batch.nodes());
    // values recover bit-exactly
    assert_eq!(
        read.buffers()[1].as_ref(),
        [1i32, 2, 3]
            .iter()
            .flat_map(|value| value.to_le_bytes())
            .collect::<Vec<u8>>()
    );

    assert!(reader.next().is_none());
    assert!(reader.is_finished());
}

#[test]
fn every_message_is_framed_aligned() {
    let schema = sample_schema();
    let batch = int32_batch();

    let mut writer = StreamWriter::new(vec![]);
    let start = writer.position();
    writer.start(&schema, None).unwrap();
    for _ in 0..3 {
        let before = writer.position();
        let block = writer.write(&batch).unwrap();
        let after = writer.position();

        assert_eq!(before % 8, 0);
        assert_eq!((after - before) % 8, 0);
        assert_eq!(block.offset as u64, before);
        assert_eq!(
            after,
            before + block.meta_data_length as u64 + block.body_length as u64
        );
    }
    writer.finish().unwrap();
    assert_eq!(start, 0);
    assert_eq!(writer.record_blocks().len(), 3);
}

#[test]
fn random_access_matches_streaming() {
    let schema = sample_schema();
    let batch = int32_batch();

    let mut writer = StreamWriter::new(vec![]);
    writer.start(&schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.finish().unwrap();

    let block = writer.record_blocks()[0];
    let data = writer.into_inner();

    // streaming
    let mut reader = StreamReader::try_new(data.as_slice(), HeapAllocator).unwrap();
    let streamed = match reader.next().unwrap().unwrap() {
        ArrowMessage::Batch(streamed) => streamed,
        other => panic!("expected a record batch, got {other:?}"),
    };

    // block-addressed
    let mut cursor = Cursor::new(data);
    let direct = read_record_batch_at(&mut cursor, &HeapAllocator, &block).unwrap();

    assert_eq!(direct, streamed);
    assert_eq!(direct, batch);
}

#[test]
fn dictionary_batch_round_trip() {
    let dictionary = dictionary_of_strings(7);

    let mut channel = WriteChannel::new(vec![]);
    let block = serialize_dictionary_batch(&mut channel, &dictionary).unwrap();
    assert_eq!(block.body_length % 8, 0);

    let data = channel.into_inner();
    let mut channel = ReadChannel::new(data.as_slice());
    let mut scratch = vec![];
    let read = read_dictionary_batch(&mut channel, &HeapAllocator, &mut scratch).unwrap();

    assert_eq!(read.id(), 7);
    assert_eq!(read, dictionary);
    assert_eq!(read.data().buffers()[2].as_ref(), b"abbcccdddd".as_slice());
}

#[test]
fn dictionary_stream_round_trip() {
    let schema = arrow_wire::datatypes::Schema::from(vec![arrow_wire::datatypes::Field::new(
        "tags",
        arrow_wire::datatypes::DataType::Dictionary(
            arrow_wire::datatypes::IntegerType::Int32,
            Box::new(arrow_wire::datatypes::DataType::Utf8),
            false,
        ),
        true,
    )]);
    let dictionary = dictionary_of_strings(0);

    let mut writer = StreamWriter::new(vec![]);
    writer.start(&schema, None).unwrap();
    writer.write_dictionary(&dictionary).unwrap();
    writer.finish().unwrap();
    assert_eq!(writer.dictionary_blocks().len(), 1);

    let data = writer.into_inner();
    let mut reader = StreamReader::try_new(data.as_slice(), HeapAllocator).unwrap();
    assert_eq!(
        reader.metadata().ipc_schema.fields[0].dictionary_id,
        Some(0)
    );

    match reader.next().unwrap().unwrap() {
        ArrowMessage::Dictionary(read) => assert_eq!(read, dictionary),
        other => panic!("expected a dictionary batch, got {other:?}"),
    }
    assert!(reader.next().is_none());
}

#[test]
fn gaps_between_buffers_are_zero_filled() {
    let batch = arrow_wire::record_batch::RecordBatch::try_new(
        1,
        vec![arrow_format::ipc::FieldNode {
            length: 1,
            null_count: 0,
        }],
        vec![
            bytes::Bytes::from_static(&[0xAB]),
            bytes::Bytes::from_static(&[0xCD]),
        ],
    )
    .unwrap();
    assert_eq!(batch.body_length(), 16);

    let mut writer = StreamWriter::new(vec![]);
    writer.start(&sample_schema(), None).unwrap();
    let block = writer.write(&batch).unwrap();
    writer.finish().unwrap();

    let data = writer.into_inner();
    let body_start = (block.offset + block.meta_data_length as i64) as usize;
    let body = &data[body_start..body_start + block.body_length as usize];
    let mut expected = [0u8; 16];
    expected[0] = 0xAB;
    expected[8] = 0xCD;
    assert_eq!(body, expected);
}

#[test]
fn write_requires_start() {
    let mut writer = StreamWriter::new(vec![]);
    assert!(writer.write(&int32_batch()).is_err());
}

#[test]
fn write_after_finish_errors() {
    let mut writer = StreamWriter::new(vec![]);
    writer.start(&sample_schema(), None).unwrap();
    writer.finish().unwrap();
    assert!(writer.write(&int32_batch()).is_err());
}
