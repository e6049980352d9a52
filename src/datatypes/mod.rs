//! Contains all metadata of the logical data model: [`DataType`], [`Field`]
//! and [`Schema`].
mod field;
mod schema;

use std::collections::BTreeMap;

pub use field::Field;
pub use schema::Schema;

/// typedef for [`BTreeMap<String, String>`] denoting custom metadata attached
/// to a [`Field`] or a [`Schema`].
pub type Metadata = BTreeMap<String, String>;

/// The set of supported logical types of a column.
///
/// Each variant uniquely identifies a logical type; nested variants carry the
/// [`Field`]s of their children so that a schema is a tree of fields. The
/// set is closed on the wire but extensible in the metadata format: tags this
/// enum does not know are surfaced as a typed error by the readers, never as
/// a silent fallback.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DataType {
    /// Null type, with no values
    Null,
    /// `true` and `false`, stored as a bitmap
    Boolean,
    /// An [`i8`]
    Int8,
    /// An [`i16`]
    Int16,
    /// An [`i32`]
    Int32,
    /// An [`i64`]
    Int64,
    /// An [`u8`]
    UInt8,
    /// An [`u16`]
    UInt16,
    /// An [`u32`]
    UInt32,
    /// An [`u64`]
    UInt64,
    /// An IEEE 754 half precision float
    Float16,
    /// An [`f32`]
    Float32,
    /// An [`f64`]
    Float64,
    /// Opaque binary data of variable length
    Binary,
    /// A variable-length string in UTF-8
    Utf8,
    /// A fixed-point decimal with the given precision and scale, stored as a
    /// 128 bit value
    Decimal(usize, usize),
    /// A date as days since the UNIX epoch, stored as [`i32`]
    Date32,
    /// A date as milliseconds since the UNIX epoch, stored as [`i64`]
    Date64,
    /// A time of day with the given unit, stored as [`i32`]; only
    /// [`TimeUnit::Second`] and [`TimeUnit::Millisecond`] are valid
    Time32(TimeUnit),
    /// A time of day with the given unit, stored as [`i64`]; only
    /// [`TimeUnit::Microsecond`] and [`TimeUnit::Nanosecond`] are valid
    Time64(TimeUnit),
    /// An instant with the given unit and an optional timezone, stored as
    /// [`i64`]
    Timestamp(TimeUnit, Option<String>),
    /// A calendar interval with the given unit
    Interval(IntervalUnit),
    /// A list of values of the child field's type
    List(Box<Field>),
    /// A nested type with an arbitrary number of child fields
    Struct(Vec<Field>),
    /// A union of the child fields' types, with optional explicit type ids
    Union(Vec<Field>, Option<Vec<i32>>, UnionMode),
    /// Opaque binary data of a fixed byte width per value
    FixedSizeBinary(usize),
    /// A list of a fixed number of values of the child field's type
    FixedSizeList(Box<Field>, usize),
    /// A map whose single child is the entries struct of (key, value) pairs;
    /// the flag denotes whether the keys are sorted. Its buffer layout is
    /// identical to [`DataType::List`] so that readers unaware of maps can
    /// consume it as a list.
    Map(Box<Field>, bool),
    /// A dictionary-encoded column: values of the inner type stored as
    /// indices of the given [`IntegerType`]; the flag denotes whether the
    /// dictionary values are ordered
    Dictionary(IntegerType, Box<DataType>, bool),
}

impl Default for DataType {
    fn default() -> Self {
        DataType::Null
    }
}

/// The set of supported integer types used as dictionary indices and to
/// resolve `Int` type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntegerType {
    /// A signed 8-bit integer
    Int8,
    /// A signed 16-bit integer
    Int16,
    /// A signed 32-bit integer
    Int32,
    /// A signed 64-bit integer
    Int64,
    /// An unsigned 8-bit integer
    UInt8,
    /// An unsigned 16-bit integer
    UInt16,
    /// An unsigned 32-bit integer
    UInt32,
    /// An unsigned 64-bit integer
    UInt64,
}

impl From<IntegerType> for DataType {
    fn from(item: IntegerType) -> Self {
        match item {
            IntegerType::Int8 => DataType::Int8,
            IntegerType::Int16 => DataType::Int16,
            IntegerType::Int32 => DataType::Int32,
            IntegerType::Int64 => DataType::Int64,
            IntegerType::UInt8 => DataType::UInt8,
            IntegerType::UInt16 => DataType::UInt16,
            IntegerType::UInt32 => DataType::UInt32,
            IntegerType::UInt64 => DataType::UInt64,
        }
    }
}

/// The time units defined for [`DataType::Time32`], [`DataType::Time64`] and
/// [`DataType::Timestamp`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    /// Seconds
    Second,
    /// Milliseconds
    Millisecond,
    /// Microseconds
    Microsecond,
    /// Nanoseconds
    Nanosecond,
}

/// The interval units defined for [`DataType::Interval`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntervalUnit {
    /// A number of months
    YearMonth,
    /// A number of days and milliseconds
    DayTime,
}

/// Mode of a [`DataType::Union`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnionMode {
    /// Dense union: child arrays hold only the values selected into them
    Dense,
    /// Sparse union: every child array has the length of the union
    Sparse,
}

impl UnionMode {
    /// Constructs a [`UnionMode::Sparse`] if the input bool is true,
    /// or otherwise constructs a [`UnionMode::Dense`]
    pub fn sparse(is_sparse: bool) -> Self {
        if is_sparse { Self::Sparse } else { Self::Dense }
    }

    /// Returns whether the mode is sparse
    pub fn is_sparse(&self) -> bool {
        matches!(self, Self::Sparse)
    }

    /// Returns whether the mode is dense
    pub fn is_dense(&self) -> bool {
        matches!(self, Self::Dense)
    }
}
