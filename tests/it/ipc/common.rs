use arrow_format::ipc;
use bytes::Bytes;

use arrow_wire::datatypes::{
    DataType, Field, IntegerType, IntervalUnit, Metadata, Schema, TimeUnit, UnionMode,
};
use arrow_wire::record_batch::{DictionaryBatch, RecordBatch};

/// A single nullable `Int32` column, as in most smoke tests.
pub fn sample_schema() -> Schema {
    Schema::from(vec![Field::new("a", DataType::Int32, true)])
}

/// A batch of the values `[1i32, 2, 3]` for [`sample_schema`]: one field
/// node and two buffers (validity, values).
pub fn int32_batch() -> RecordBatch {
    let validity = Bytes::from_static(&[0b0000_0111]);
    let values = Bytes::from(
        [1i32, 2, 3]
            .iter()
            .flat_map(|value| value.to_le_bytes())
            .collect::<Vec<u8>>(),
    );
    RecordBatch::try_new(
        3,
        vec![ipc::FieldNode {
            length: 3,
            null_count: 0,
        }],
        vec![validity, values],
    )
    .unwrap()
}

/// A dictionary batch of the strings `["a", "bb", "ccc", "dddd"]` under the
/// given id: one Utf8 column with validity, offsets and values buffers.
pub fn dictionary_of_strings(id: i64) -> DictionaryBatch {
    let validity = Bytes::from_static(&[0b0000_1111]);
    let offsets = Bytes::from(
        [0i32, 1, 3, 6, 10]
            .iter()
            .flat_map(|offset| offset.to_le_bytes())
            .collect::<Vec<u8>>(),
    );
    let values = Bytes::from_static(b"abbcccdddd");
    let data = RecordBatch::try_new(
        4,
        vec![ipc::FieldNode {
            length: 4,
            null_count: 0,
        }],
        vec![validity, offsets, values],
    )
    .unwrap();
    DictionaryBatch::new(id, data)
}

/// A schema exercising every supported logical type, including nested
/// children, unions, maps, dictionaries and custom metadata.
pub fn rich_schema() -> Schema {
    let entries = Field::new(
        "entries",
        DataType::Struct(vec![
            Field::new("key", DataType::Utf8, false),
            Field::new("value", DataType::Int32, false),
        ]),
        false,
    );

    let mut field_metadata = Metadata::new();
    field_metadata.insert("origin".to_string(), "sensor-7".to_string());

    let mut schema_metadata = Metadata::new();
    schema_metadata.insert("producer".to_string(), "arrow-wire".to_string());
    schema_metadata.insert("revision".to_string(), "2".to_string());

    Schema::from(vec![
        Field::new("null", DataType::Null, true),
        Field::new("bool", DataType::Boolean, true),
        Field::new("i8", DataType::Int8, false),
        Field::new("u16", DataType::UInt16, true),
        Field::new("i64", DataType::Int64, true).with_metadata(field_metadata),
        Field::new("f16", DataType::Float16, true),
        Field::new("f64", DataType::Float64, true),
        Field::new("bin", DataType::Binary, true),
        Field::new("str", DataType::Utf8, true),
        Field::new("dec", DataType::Decimal(18, 4), true),
        Field::new("d32", DataType::Date32, true),
        Field::new("d64", DataType::Date64, true),
        Field::new("t32", DataType::Time32(TimeUnit::Millisecond), true),
        Field::new("t64", DataType::Time64(TimeUnit::Nanosecond), true),
        Field::new(
            "ts",
            DataType::Timestamp(TimeUnit::Microsecond, Some("+02:00".to_string())),
            true,
        ),
        Field::new("iv_ym", DataType::Interval(IntervalUnit::YearMonth), true),
        Field::new("iv_dt", DataType::Interval(IntervalUnit::DayTime), true),
        Field::new(
            "list",
            DataType::List(Box::new(Field::unnamed(DataType::Int32, true))),
            true,
        ),
        Field::new(
            "strct",
            DataType::Struct(vec![
                Field::new("x", DataType::Float32, false),
                Field::new("y", DataType::Float32, false),
            ]),
            false,
        ),
        Field::new(
            "union",
            DataType::Union(
                vec![
                    Field::new("i", DataType::Int32, true),
                    Field::new("s", DataType::Utf8, true),
                ],
                Some(vec![2, 5]),
                UnionMode::Dense,
            ),
            false,
        ),
        Field::new("fsb", DataType::FixedSizeBinary(16), true),
        Field::new(
            "fsl",
            DataType::FixedSizeList(Box::new(Field::unnamed(DataType::Float32, false)), 3),
            true,
        ),
        Field::new("map", DataType::Map(Box::new(entries), false), true),
        Field::new(
            "dict",
            DataType::Dictionary(IntegerType::Int16, Box::new(DataType::Utf8), false),
            true,
        ),
    ])
    .with_metadata(schema_metadata)
}
