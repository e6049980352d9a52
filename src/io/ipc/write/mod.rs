//! APIs to write to the Arrow IPC wire format.
pub(crate) mod common;
mod schema;
mod serialize;
mod stream;

pub use common::write_end_of_stream;
pub use schema::{schema_to_bytes, serialize_schema};
pub use serialize::{
    serialize_dictionary_batch, serialize_record_batch, serialize_schema_message,
};
pub use stream::StreamWriter;

use crate::datatypes::{DataType, Field};

use super::IpcField;

fn default_ipc_field(dtype: &DataType, current_id: &mut i64) -> IpcField {
    use DataType::*;
    match dtype {
        // single child
        Map(inner, ..) | FixedSizeList(inner, _) | List(inner) => IpcField {
            fields: vec![default_ipc_field(inner.dtype(), current_id)],
            dictionary_id: None,
        },
        // multiple children
        Union(fields, ..) | Struct(fields) => IpcField {
            fields: fields
                .iter()
                .map(|field| default_ipc_field(field.dtype(), current_id))
                .collect(),
            dictionary_id: None,
        },
        // dictionary takes the next id and encodes its value type's children
        Dictionary(_, value_type, _) => {
            let dictionary_id = Some(*current_id);
            *current_id += 1;
            IpcField {
                fields: default_ipc_field(value_type, current_id).fields,
                dictionary_id,
            }
        },
        // no children
        _ => IpcField::default(),
    }
}

/// Assigns every dictionary field of `fields` a unique dictionary id, in the
/// depth-first pre-order of the schema.
pub fn default_ipc_fields(fields: &[Field]) -> Vec<IpcField> {
    let mut dictionary_id = 0i64;
    fields
        .iter()
        .map(|field| default_ipc_field(field.dtype(), &mut dictionary_id))
        .collect()
}
