use super::{DataType, Metadata};

/// Represents the metadata of a "column".
///
/// A [`Field`] is the closest representation of the traditional "column": a
/// logical type ([`DataType`]) with a name and nullability.
/// A Field has optional [`Metadata`] that can be used to annotate the field
/// with custom metadata.
///
/// The name is optional: child fields of nested types (e.g. the item of a
/// [`DataType::List`]) are commonly unnamed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Field {
    /// Its name, if any
    pub name: Option<String>,
    /// Its logical [`DataType`]
    pub dtype: DataType,
    /// Its nullability
    pub is_nullable: bool,
    /// Additional custom (opaque) metadata
    pub metadata: Metadata,
}

impl Field {
    /// Creates a new named [`Field`].
    pub fn new<N: Into<String>>(name: N, dtype: DataType, is_nullable: bool) -> Self {
        Field {
            name: Some(name.into()),
            dtype,
            is_nullable,
            metadata: Default::default(),
        }
    }

    /// Creates a new unnamed [`Field`].
    pub fn unnamed(dtype: DataType, is_nullable: bool) -> Self {
        Field {
            name: None,
            dtype,
            is_nullable,
            metadata: Default::default(),
        }
    }

    /// Attaches a [`Metadata`] to the [`Field`].
    #[inline]
    pub fn with_metadata(self, metadata: Metadata) -> Self {
        Self { metadata, ..self }
    }

    /// Returns the [`Field`]'s [`DataType`].
    #[inline]
    pub fn dtype(&self) -> &DataType {
        &self.dtype
    }
}
