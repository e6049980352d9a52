use arrow_format::ipc;

use super::OutOfSpecKind;
use crate::datatypes::{
    DataType, Field, IntegerType, IntervalUnit, Metadata, Schema, TimeUnit, UnionMode,
};
use crate::error::{Error, Result};
use crate::io::ipc::{IpcField, IpcSchema};

/// Deserializes a flatbuffer [`ipc::SchemaRef`] into a [`Schema`] and its
/// wire-level [`IpcSchema`].
pub fn fb_to_schema(schema: ipc::SchemaRef) -> Result<(Schema, IpcSchema)> {
    let fields = schema
        .fields()
        .map_err(|err| Error::from(OutOfSpecKind::InvalidFlatbufferField(err)))?
        .ok_or_else(|| Error::from(OutOfSpecKind::MissingFields))?;

    let mut arrow_fields = Vec::with_capacity(fields.len());
    let mut ipc_fields = Vec::with_capacity(fields.len());
    for field in fields.iter() {
        let field = field.map_err(|err| Error::from(OutOfSpecKind::InvalidFlatbufferField(err)))?;
        let (field, ipc_field) = deserialize_field(field)?;
        arrow_fields.push(field);
        ipc_fields.push(ipc_field);
    }

    let is_little_endian = match schema
        .endianness()
        .map_err(|err| Error::from(OutOfSpecKind::InvalidFlatbufferEndianness(err)))?
    {
        ipc::Endianness::Little => true,
        ipc::Endianness::Big => false,
    };

    let metadata = read_metadata(
        schema
            .custom_metadata()
            .map_err(|err| Error::from(OutOfSpecKind::InvalidFlatbufferKeyValue(err)))?,
    )?;

    Ok((
        Schema {
            fields: arrow_fields,
            metadata,
        },
        IpcSchema {
            fields: ipc_fields,
            is_little_endian,
        },
    ))
}

fn read_metadata(
    custom_metadata: Option<ipc::planus::Vector<'_, ipc::planus::Result<ipc::KeyValueRef<'_>>>>,
) -> Result<Metadata> {
    let mut metadata = Metadata::new();
    if let Some(list) = custom_metadata {
        for kv in list.iter() {
            let kv = kv.map_err(|err| Error::from(OutOfSpecKind::InvalidFlatbufferKeyValue(err)))?;
            if let (Some(key), Some(value)) = (
                kv.key()
                    .map_err(|err| Error::from(OutOfSpecKind::InvalidFlatbufferKeyValue(err)))?,
                kv.value()
                    .map_err(|err| Error::from(OutOfSpecKind::InvalidFlatbufferKeyValue(err)))?,
            ) {
                metadata.insert(key.to_string(), value.to_string());
            }
        }
    }
    Ok(metadata)
}

fn deserialize_field(ipc_field: ipc::FieldRef) -> Result<(Field, IpcField)> {
    let metadata = read_metadata(
        ipc_field
            .custom_metadata()
            .map_err(|err| Error::from(OutOfSpecKind::InvalidFlatbufferKeyValue(err)))?,
    )?;

    let (dtype, ipc_field_) = get_dtype(ipc_field, true)?;

    let field = Field {
        name: ipc_field
            .name()
            .map_err(|err| Error::from(OutOfSpecKind::InvalidFlatbufferField(err)))?
            .map(|name| name.to_string()),
        dtype,
        is_nullable: ipc_field
            .nullable()
            .map_err(|err| Error::from(OutOfSpecKind::InvalidFlatbufferField(err)))?,
        metadata,
    };

    Ok((field, ipc_field_))
}

fn deserialize_integer(int: ipc::IntRef) -> Result<IntegerType> {
    Ok(match (int.bit_width()?, int.is_signed()?) {
        (8, true) => IntegerType::Int8,
        (8, false) => IntegerType::UInt8,
        (16, true) => IntegerType::Int16,
        (16, false) => IntegerType::UInt16,
        (32, true) => IntegerType::Int32,
        (32, false) => IntegerType::UInt32,
        (64, true) => IntegerType::Int64,
        (64, false) => IntegerType::UInt64,
        (bit_width, _) => {
            return Err(Error::oos(format!(
                "integers must have a bit width of 8, 16, 32 or 64, got {bit_width}"
            )))
        },
    })
}

fn deserialize_timeunit(unit: ipc::TimeUnit) -> TimeUnit {
    match unit {
        ipc::TimeUnit::Second => TimeUnit::Second,
        ipc::TimeUnit::Millisecond => TimeUnit::Millisecond,
        ipc::TimeUnit::Microsecond => TimeUnit::Microsecond,
        ipc::TimeUnit::Nanosecond => TimeUnit::Nanosecond,
    }
}

/// Deserializes the children of `field`, requiring exactly `expected` when
/// given.
fn deserialize_children(
    field: ipc::FieldRef,
    expected: Option<usize>,
) -> Result<(Vec<Field>, Vec<IpcField>)> {
    let children = field
        .children()
        .map_err(|err| Error::from(OutOfSpecKind::InvalidFlatbufferField(err)))?
        .ok_or_else(|| Error::oos("nested types must declare their children"))?;
    if let Some(expected) = expected {
        if children.len() != expected {
            return Err(Error::oos(format!(
                "expected {expected} child field(s), got {}",
                children.len()
            )));
        }
    }

    let mut fields = Vec::with_capacity(children.len());
    let mut ipc_fields = Vec::with_capacity(children.len());
    for child in children.iter() {
        let child = child.map_err(|err| Error::from(OutOfSpecKind::InvalidFlatbufferField(err)))?;
        let (field, ipc_field) = deserialize_field(child)?;
        fields.push(field);
        ipc_fields.push(ipc_field);
    }
    Ok((fields, ipc_fields))
}

fn get_dtype(field: ipc::FieldRef, may_be_dictionary: bool) -> Result<(DataType, IpcField)> {
    if may_be_dictionary {
        if let Some(dictionary) = field
            .dictionary()
            .map_err(|err| Error::from(OutOfSpecKind::InvalidFlatbufferDictionary(err)))?
        {
            // the default index type when absent is a signed 32-bit integer
            let index_type = match dictionary
                .index_type()
                .map_err(|err| Error::from(OutOfSpecKind::InvalidFlatbufferDictionary(err)))?
            {
                Some(int) => deserialize_integer(int)?,
                None => IntegerType::Int32,
            };
            let (value_type, mut ipc_field) = get_dtype(field, false)?;
            ipc_field.dictionary_id = Some(
                dictionary
                    .id()
                    .map_err(|err| Error::from(OutOfSpecKind::InvalidFlatbufferDictionary(err)))?,
            );
            let is_ordered = dictionary
                .is_ordered()
                .map_err(|err| Error::from(OutOfSpecKind::InvalidFlatbufferDictionary(err)))?;
            return Ok((
                DataType::Dictionary(index_type, Box::new(value_type), is_ordered),
                ipc_field,
            ));
        }
    }

    let type_ = field
        .type_()
        .map_err(|err| Error::UnsupportedType(format!("cannot decode the type tag: {err}")))?
        .ok_or_else(|| Error::from(OutOfSpecKind::MissingType))?;

    use ipc::TypeRef;
    Ok(match type_ {
        TypeRef::Null(_) => (DataType::Null, IpcField::default()),
        TypeRef::Bool(_) => (DataType::Boolean, IpcField::default()),
        TypeRef::Int(int) => (deserialize_integer(int)?.into(), IpcField::default()),
        TypeRef::FloatingPoint(float) => {
            let dtype = match float.precision()? {
                ipc::Precision::Half => DataType::Float16,
                ipc::Precision::Single => DataType::Float32,
                ipc::Precision::Double => DataType::Float64,
            };
            (dtype, IpcField::default())
        },
        TypeRef::Binary(_) => (DataType::Binary, IpcField::default()),
        TypeRef::Utf8(_) => (DataType::Utf8, IpcField::default()),
        TypeRef::Decimal(decimal) => {
            let bit_width = decimal.bit_width()?;
            if bit_width != 128 {
                return Err(Error::UnsupportedType(format!(
                    "decimal of {bit_width} bits"
                )));
            }
            let precision: usize = decimal
                .precision()?
                .try_into()
                .map_err(|_| Error::from(OutOfSpecKind::UnexpectedNegativeInteger))?;
            let scale: usize = decimal
                .scale()?
                .try_into()
                .map_err(|_| Error::from(OutOfSpecKind::UnexpectedNegativeInteger))?;
            (DataType::Decimal(precision, scale), IpcField::default())
        },
        TypeRef::Date(date) => {
            let dtype = match date.unit()? {
                ipc::DateUnit::Day => DataType::Date32,
                ipc::DateUnit::Millisecond => DataType::Date64,
            };
            (dtype, IpcField::default())
        },
        TypeRef::Time(time) => {
            let unit = deserialize_timeunit(time.unit()?);
            let dtype = match (time.bit_width()?, unit) {
                (32, TimeUnit::Second) => DataType::Time32(TimeUnit::Second),
                (32, TimeUnit::Millisecond) => DataType::Time32(TimeUnit::Millisecond),
                (64, TimeUnit::Microsecond) => DataType::Time64(TimeUnit::Microsecond),
                (64, TimeUnit::Nanosecond) => DataType::Time64(TimeUnit::Nanosecond),
                (bits, unit) => {
                    return Err(Error::oos(format!(
                        "a time type of {bits} bits with unit {unit:?} is invalid"
                    )))
                },
            };
            (dtype, IpcField::default())
        },
        TypeRef::Timestamp(timestamp) => {
            let unit = deserialize_timeunit(timestamp.unit()?);
            let timezone = timestamp.timezone()?.map(|timezone| timezone.to_string());
            (DataType::Timestamp(unit, timezone), IpcField::default())
        },
        TypeRef::Interval(interval) => {
            let unit = match interval.unit()? {
                ipc::IntervalUnit::YearMonth => IntervalUnit::YearMonth,
                ipc::IntervalUnit::DayTime => IntervalUnit::DayTime,
                other => {
                    return Err(Error::UnsupportedType(format!("interval unit {other:?}")))
                },
            };
            (DataType::Interval(unit), IpcField::default())
        },
        TypeRef::List(_) => {
            let (mut fields, mut ipc_fields) = deserialize_children(field, Some(1))?;
            (
                DataType::List(Box::new(fields.remove(0))),
                IpcField {
                    fields: vec![ipc_fields.remove(0)],
                    dictionary_id: None,
                },
            )
        },
        TypeRef::Struct(_) => {
            let (fields, ipc_fields) = deserialize_children(field, None)?;
            (
                DataType::Struct(fields),
                IpcField {
                    fields: ipc_fields,
                    dictionary_id: None,
                },
            )
        },
        TypeRef::Union(union_) => {
            let mode = UnionMode::sparse(union_.mode()? == ipc::UnionMode::Sparse);
            let type_ids = union_
                .type_ids()?
                .map(|type_ids| type_ids.iter().collect::<Vec<_>>());
            let (fields, ipc_fields) = deserialize_children(field, None)?;
            (
                DataType::Union(fields, type_ids, mode),
                IpcField {
                    fields: ipc_fields,
                    dictionary_id: None,
                },
            )
        },
        TypeRef::FixedSizeBinary(fixed) => {
            let byte_width: usize = fixed
                .byte_width()?
                .try_into()
                .map_err(|_| Error::from(OutOfSpecKind::UnexpectedNegativeInteger))?;
            (DataType::FixedSizeBinary(byte_width), IpcField::default())
        },
        TypeRef::FixedSizeList(fixed) => {
            let list_size: usize = fixed
                .list_size()?
                .try_into()
                .map_err(|_| Error::from(OutOfSpecKind::UnexpectedNegativeInteger))?;
            let (mut fields, mut ipc_fields) = deserialize_children(field, Some(1))?;
            (
                DataType::FixedSizeList(Box::new(fields.remove(0)), list_size),
                IpcField {
                    fields: vec![ipc_fields.remove(0)],
                    dictionary_id: None,
                },
            )
        },
        TypeRef::Map(map) => {
            let keys_sorted = map.keys_sorted()?;
            // a map has exactly one child, the entries struct, so that its
            // buffer layout is indistinguishable from a list
            let (mut fields, mut ipc_fields) = deserialize_children(field, Some(1))?;
            let entries = fields.remove(0);
            match &entries.dtype {
                DataType::Struct(children)
                    if children.len() == 2
                        && children.iter().all(|child| !child.is_nullable) => {},
                _ => {
                    return Err(Error::oos(
                        "the child of a map must be a struct of two non-nullable fields (key, value)",
                    ))
                },
            }
            (
                DataType::Map(Box::new(entries), keys_sorted),
                IpcField {
                    fields: vec![ipc_fields.remove(0)],
                    dictionary_id: None,
                },
            )
        },
        other => return Err(Error::UnsupportedType(format!("{other:?}"))),
    })
}
