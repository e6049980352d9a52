use arrow_format::ipc;
use arrow_format::ipc::planus::Builder;

use crate::datatypes::{
    DataType, Field, IntegerType, IntervalUnit, Metadata, Schema, TimeUnit, UnionMode,
};
use crate::io::ipc::endianness::is_native_little_endian;
use crate::io::ipc::IpcField;

/// Converts a [`Schema`] and [`IpcField`]s to a flatbuffer-encoded
/// [`arrow_format::ipc::Message`].
pub fn schema_to_bytes(schema: &Schema, ipc_fields: &[IpcField]) -> Vec<u8> {
    let schema = serialize_schema(schema, ipc_fields);

    let message = ipc::Message {
        version: ipc::MetadataVersion::V4,
        header: Some(ipc::MessageHeader::Schema(Box::new(schema))),
        body_length: 0,
        custom_metadata: None,
    };
    let mut builder = Builder::new();
    let data = builder.finish(&message, None);
    data.to_vec()
}

/// Converts a [`Schema`] and [`IpcField`]s to a flatbuffer
/// [`arrow_format::ipc::Schema`], stamped with the endianness of this
/// platform.
pub fn serialize_schema(schema: &Schema, ipc_fields: &[IpcField]) -> ipc::Schema {
    let endianness = if is_native_little_endian() {
        ipc::Endianness::Little
    } else {
        ipc::Endianness::Big
    };

    let fields = schema
        .fields
        .iter()
        .zip(ipc_fields.iter())
        .map(|(field, ipc_field)| serialize_field(field, ipc_field))
        .collect::<Vec<_>>();

    let custom_metadata = serialize_metadata(&schema.metadata);

    ipc::Schema {
        endianness,
        fields: Some(fields),
        custom_metadata,
        features: None,
    }
}

fn serialize_metadata(metadata: &Metadata) -> Option<Vec<ipc::KeyValue>> {
    if metadata.is_empty() {
        return None;
    }
    Some(
        metadata
            .iter()
            .map(|(key, value)| ipc::KeyValue {
                key: Some(key.clone()),
                value: Some(value.clone()),
            })
            .collect(),
    )
}

fn serialize_field(field: &Field, ipc_field: &IpcField) -> ipc::Field {
    let type_ = serialize_type(&field.dtype);
    let children = serialize_children(&field.dtype, ipc_field);

    let dictionary = if let DataType::Dictionary(index_type, _, is_ordered) = field.dtype {
        Some(serialize_dictionary(
            index_type,
            ipc_field
                .dictionary_id
                .expect("All dictionary types have a dictionary id"),
            is_ordered,
        ))
    } else {
        None
    };

    ipc::Field {
        name: field.name.clone(),
        nullable: field.is_nullable,
        type_: Some(type_),
        dictionary: dictionary.map(Box::new),
        children: Some(children),
        custom_metadata: serialize_metadata(&field.metadata),
    }
}

fn serialize_time_unit(unit: TimeUnit) -> ipc::TimeUnit {
    match unit {
        TimeUnit::Second => ipc::TimeUnit::Second,
        TimeUnit::Millisecond => ipc::TimeUnit::Millisecond,
        TimeUnit::Microsecond => ipc::TimeUnit::Microsecond,
        TimeUnit::Nanosecond => ipc::TimeUnit::Nanosecond,
    }
}

fn serialize_type(dtype: &DataType) -> ipc::Type {
    use DataType::*;
    match dtype {
        Null => ipc::Type::Null(Box::new(ipc::Null {})),
        Boolean => ipc::Type::Bool(Box::new(ipc::Bool {})),
        Int8 => ipc::Type::Int(Box::new(ipc::Int {
            bit_width: 8,
            is_signed: true,
        })),
        Int16 => ipc::Type::Int(Box::new(ipc::Int {
            bit_width: 16,
            is_signed: true,
        })),
        Int32 => ipc::Type::Int(Box::new(ipc::Int {
            bit_width: 32,
            is_signed: true,
        })),
        Int64 => ipc::Type::Int(Box::new(ipc::Int {
            bit_width: 64,
            is_signed: true,
        })),
        UInt8 => ipc::Type::Int(Box::new(ipc::Int {
            bit_width: 8,
            is_signed: false,
        })),
        UInt16 => ipc::Type::Int(Box::new(ipc::Int {
            bit_width: 16,
            is_signed: false,
        })),
        UInt32 => ipc::Type::Int(Box::new(ipc::Int {
            bit_width: 32,
            is_signed: false,
        })),
        UInt64 => ipc::Type::Int(Box::new(ipc::Int {
            bit_width: 64,
            is_signed: false,
        })),
        Float16 => ipc::Type::FloatingPoint(Box::new(ipc::FloatingPoint {
            precision: ipc::Precision::Half,
        })),
        Float32 => ipc::Type::FloatingPoint(Box::new(ipc::FloatingPoint {
            precision: ipc::Precision::Single,
        })),
        Float64 => ipc::Type::FloatingPoint(Box::new(ipc::FloatingPoint {
            precision: ipc::Precision::Double,
        })),
        Binary => ipc::Type::Binary(Box::new(ipc::Binary {})),
        Utf8 => ipc::Type::Utf8(Box::new(ipc::Utf8 {})),
        Decimal(precision, scale) => ipc::Type::Decimal(Box::new(ipc::Decimal {
            precision: *precision as i32,
            scale: *scale as i32,
            bit_width: 128,
        })),
        Date32 => ipc::Type::Date(Box::new(ipc::Date {
            unit: ipc::DateUnit::Day,
        })),
        Date64 => ipc::Type::Date(Box::new(ipc::Date {
            unit: ipc::DateUnit::Millisecond,
        })),
        Time32(unit) => ipc::Type::Time(Box::new(ipc::Time {
            unit: serialize_time_unit(*unit),
            bit_width: 32,
        })),
        Time64(unit) => ipc::Type::Time(Box::new(ipc::Time {
            unit: serialize_time_unit(*unit),
            bit_width: 64,
        })),
        Timestamp(unit, timezone) => ipc::Type::Timestamp(Box::new(ipc::Timestamp {
            unit: serialize_time_unit(*unit),
            timezone: timezone.clone(),
        })),
        Interval(unit) => ipc::Type::Interval(Box::new(ipc::Interval {
            unit: match unit {
                IntervalUnit::YearMonth => ipc::IntervalUnit::YearMonth,
                IntervalUnit::DayTime => ipc::IntervalUnit::DayTime,
            },
        })),
        List(_) => ipc::Type::List(Box::new(ipc::List {})),
        Struct(_) => ipc::Type::Struct(Box::new(ipc::Struct {})),
        Union(_, type_ids, mode) => ipc::Type::Union(Box::new(ipc::Union {
            mode: match mode {
                UnionMode::Dense => ipc::UnionMode::Dense,
                UnionMode::Sparse => ipc::UnionMode::Sparse,
            },
            type_ids: type_ids.clone(),
        })),
        FixedSizeBinary(size) => ipc::Type::FixedSizeBinary(Box::new(ipc::FixedSizeBinary {
            byte_width: *size as i32,
        })),
        FixedSizeList(_, size) => ipc::Type::FixedSizeList(Box::new(ipc::FixedSizeList {
            list_size: *size as i32,
        })),
        Map(_, keys_sorted) => ipc::Type::Map(Box::new(ipc::Map {
            keys_sorted: *keys_sorted,
        })),
        Dictionary(_, value_type, _) => serialize_type(value_type),
    }
}

fn serialize_children(dtype: &DataType, ipc_field: &IpcField) -> Vec<ipc::Field> {
    use DataType::*;
    match dtype {
        Null | Boolean | Int8 | Int16 | Int32 | Int64 | UInt8 | UInt16 | UInt32 | UInt64
        | Float16 | Float32 | Float64 | Binary | Utf8 | Decimal(..) | Date32 | Date64
        | Time32(_) | Time64(_) | Timestamp(..) | Interval(_) | FixedSizeBinary(_) => vec![],
        List(inner) | FixedSizeList(inner, _) | Map(inner, _) => {
            vec![serialize_field(inner, &ipc_field.fields[0])]
        },
        Struct(fields) | Union(fields, ..) => fields
            .iter()
            .zip(ipc_field.fields.iter())
            .map(|(field, ipc_field)| serialize_field(field, ipc_field))
            .collect(),
        Dictionary(_, value_type, _) => serialize_children(value_type, ipc_field),
    }
}

fn serialize_dictionary(
    index_type: IntegerType,
    dict_id: i64,
    is_ordered: bool,
) -> ipc::DictionaryEncoding {
    use IntegerType::*;
    let is_signed = match index_type {
        Int8 | Int16 | Int32 | Int64 => true,
        UInt8 | UInt16 | UInt32 | UInt64 => false,
    };
    let bit_width = match index_type {
        Int8 | UInt8 => 8,
        Int16 | UInt16 => 16,
        Int32 | UInt32 => 32,
        Int64 | UInt64 => 64,
    };

    let index_type = ipc::Int {
        bit_width,
        is_signed,
    };

    ipc::DictionaryEncoding {
        id: dict_id,
        index_type: Some(Box::new(index_type)),
        is_ordered,
        dictionary_kind: ipc::DictionaryKind::DenseArray,
    }
}
