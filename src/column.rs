//! Physical column encodings handed to the kernel.
//!
//! ```text
//!  Column::Const { len: N }
//!    └─ Column::Nullable { null_map }      (optional layer)
//!         └─ ColumnData::{Int32, String, Decimal128, ...}
//! ```
//!
//! A constant holds a single row that is logically repeated `len` times.
//! The nullable layer pairs a data buffer with one null flag per row.

use crate::types::DataType;
use crate::value::{Decimal32, Decimal64, Decimal128};

/// Variable-length byte strings.
///
/// Every value is stored followed by a zero terminator and `offsets[i]`
/// points one past the terminator of row `i`, so the payload of row `i`
/// spans `offsets[i - 1]..offsets[i] - 1`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StringColumn {
    chars: Vec<u8>,
    offsets: Vec<usize>,
}

impl StringColumn {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(rows: usize, bytes: usize) -> Self {
        Self {
            chars: Vec::with_capacity(bytes + rows),
            offsets: Vec::with_capacity(rows),
        }
    }

    pub fn push(&mut self, value: impl AsRef<[u8]>) {
        self.chars.extend_from_slice(value.as_ref());
        self.chars.push(0);
        self.offsets.push(self.chars.len());
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    pub fn chars(&self) -> &[u8] {
        &self.chars
    }

    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    /// Payload of row `row`, terminator excluded.
    pub fn value(&self, row: usize) -> &[u8] {
        let start = if row == 0 { 0 } else { self.offsets[row - 1] };
        &self.chars[start..self.offsets[row] - 1]
    }
}

impl<S: AsRef<[u8]>> FromIterator<S> for StringColumn {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut column = StringColumn::new();
        for value in iter {
            column.push(value);
        }
        column
    }
}

/// Fixed-length byte strings stored back to back in `n`-byte slots.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FixedStringColumn {
    chars: Vec<u8>,
    n: usize,
}

impl FixedStringColumn {
    /// Wraps an existing buffer. `None` unless `n > 0` and the buffer is a
    /// whole number of slots.
    pub fn from_chars(n: usize, chars: Vec<u8>) -> Option<Self> {
        if n == 0 || chars.len() % n != 0 {
            return None;
        }
        Some(Self { chars, n })
    }

    /// Builds a column from values, zero padding short ones. `None` if any
    /// value is longer than `n` or `n` is zero.
    pub fn from_rows<S: AsRef<[u8]>>(n: usize, rows: impl IntoIterator<Item = S>) -> Option<Self> {
        if n == 0 {
            return None;
        }
        let mut chars = Vec::new();
        for row in rows {
            let row = row.as_ref();
            if row.len() > n {
                return None;
            }
            chars.extend_from_slice(row);
            chars.resize(chars.len() + (n - row.len()), 0);
        }
        Some(Self { chars, n })
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn len(&self) -> usize {
        self.chars.len() / self.n
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn chars(&self) -> &[u8] {
        &self.chars
    }

    pub fn value(&self, row: usize) -> &[u8] {
        &self.chars[row * self.n..(row + 1) * self.n]
    }
}

/// A single physical data buffer.
#[derive(Clone, Debug, PartialEq)]
pub enum ColumnData {
    UInt8(Vec<u8>),
    UInt16(Vec<u16>),
    UInt32(Vec<u32>),
    UInt64(Vec<u64>),
    Int8(Vec<i8>),
    Int16(Vec<i16>),
    Int32(Vec<i32>),
    Int64(Vec<i64>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
    Decimal32(Vec<Decimal32>),
    Decimal64(Vec<Decimal64>),
    Decimal128(Vec<Decimal128>),
    String(StringColumn),
    FixedString(FixedStringColumn),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::UInt8(v) => v.len(),
            ColumnData::UInt16(v) => v.len(),
            ColumnData::UInt32(v) => v.len(),
            ColumnData::UInt64(v) => v.len(),
            ColumnData::Int8(v) => v.len(),
            ColumnData::Int16(v) => v.len(),
            ColumnData::Int32(v) => v.len(),
            ColumnData::Int64(v) => v.len(),
            ColumnData::Float32(v) => v.len(),
            ColumnData::Float64(v) => v.len(),
            ColumnData::Decimal32(v) => v.len(),
            ColumnData::Decimal64(v) => v.len(),
            ColumnData::Decimal128(v) => v.len(),
            ColumnData::String(c) => c.len(),
            ColumnData::FixedString(c) => c.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn name(&self) -> String {
        match self {
            ColumnData::UInt8(_) => "UInt8".into(),
            ColumnData::UInt16(_) => "UInt16".into(),
            ColumnData::UInt32(_) => "UInt32".into(),
            ColumnData::UInt64(_) => "UInt64".into(),
            ColumnData::Int8(_) => "Int8".into(),
            ColumnData::Int16(_) => "Int16".into(),
            ColumnData::Int32(_) => "Int32".into(),
            ColumnData::Int64(_) => "Int64".into(),
            ColumnData::Float32(_) => "Float32".into(),
            ColumnData::Float64(_) => "Float64".into(),
            ColumnData::Decimal32(_) => "Decimal32".into(),
            ColumnData::Decimal64(_) => "Decimal64".into(),
            ColumnData::Decimal128(_) => "Decimal128".into(),
            ColumnData::String(_) => "String".into(),
            ColumnData::FixedString(c) => format!("FixedString({})", c.n()),
        }
    }
}

/// Typed access to the buffer behind a [`ColumnData`] variant.
pub trait NativeColumn: Sized {
    fn values(data: &ColumnData) -> Option<&[Self]>;
}

macro_rules! native_column {
    ($($native:ty => $variant:ident),* $(,)?) => {
        $(
            impl NativeColumn for $native {
                #[inline]
                fn values(data: &ColumnData) -> Option<&[Self]> {
                    match data {
                        ColumnData::$variant(values) => Some(values),
                        _ => None,
                    }
                }
            }

            impl From<Vec<$native>> for ColumnData {
                fn from(values: Vec<$native>) -> Self {
                    ColumnData::$variant(values)
                }
            }
        )*
    };
}

native_column!(
    u8 => UInt8,
    u16 => UInt16,
    u32 => UInt32,
    u64 => UInt64,
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    f32 => Float32,
    f64 => Float64,
    Decimal32 => Decimal32,
    Decimal64 => Decimal64,
    Decimal128 => Decimal128,
);

impl From<StringColumn> for ColumnData {
    fn from(column: StringColumn) -> Self {
        ColumnData::String(column)
    }
}

impl From<FixedStringColumn> for ColumnData {
    fn from(column: FixedStringColumn) -> Self {
        ColumnData::FixedString(column)
    }
}

/// Per-row null flags, `true` meaning null.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NullMap(Vec<bool>);

impl NullMap {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline(always)]
    pub fn is_null(&self, row: usize) -> bool {
        self.0[row]
    }
}

impl From<Vec<bool>> for NullMap {
    fn from(flags: Vec<bool>) -> Self {
        Self(flags)
    }
}

impl FromIterator<bool> for NullMap {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Column {
    Vector(ColumnData),
    Nullable {
        nested: ColumnData,
        null_map: NullMap,
    },
    /// One row of `inner`, broadcast to `len` rows.
    Const { inner: Box<Column>, len: usize },
}

impl Column {
    pub fn nullable(nested: impl Into<ColumnData>, null_map: impl Into<NullMap>) -> Self {
        Column::Nullable {
            nested: nested.into(),
            null_map: null_map.into(),
        }
    }

    /// Builds a nullable column from optional values.
    pub fn from_options<T>(values: impl IntoIterator<Item = Option<T>>) -> Self
    where
        T: Default,
        Vec<T>: Into<ColumnData>,
    {
        let (data, nulls): (Vec<T>, Vec<bool>) = values
            .into_iter()
            .map(|v| match v {
                Some(v) => (v, false),
                None => (T::default(), true),
            })
            .unzip();
        Column::nullable(data, nulls)
    }

    /// Broadcasts the first row of `inner` to `len` rows. Constants of
    /// constants collapse into one layer.
    pub fn constant(inner: impl Into<Column>, len: usize) -> Self {
        match inner.into() {
            Column::Const { inner, .. } => Column::Const { inner, len },
            other => Column::Const {
                inner: Box::new(other),
                len,
            },
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Column::Vector(data) => data.len(),
            Column::Nullable { nested, .. } => nested.len(),
            Column::Const { len, .. } => *len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_const(&self) -> bool {
        matches!(self, Column::Const { .. })
    }

    pub fn name(&self) -> String {
        match self {
            Column::Vector(data) => data.name(),
            Column::Nullable { nested, .. } => format!("Nullable({})", nested.name()),
            Column::Const { inner, .. } => format!("Const({})", inner.name()),
        }
    }
}

impl From<ColumnData> for Column {
    fn from(data: ColumnData) -> Self {
        Column::Vector(data)
    }
}

/// One argument of a hash call: its column, declared type and display name.
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnWithType {
    pub column: Column,
    pub data_type: DataType,
    pub name: String,
}

impl ColumnWithType {
    pub fn new(name: impl Into<String>, data_type: DataType, column: impl Into<Column>) -> Self {
        Self {
            column: column.into(),
            data_type,
            name: name.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_column_excludes_terminator() {
        let column: StringColumn = ["abc", "", "hello"].into_iter().collect();
        assert_eq!(column.len(), 3);
        assert_eq!(column.chars(), b"abc\0\0hello\0");
        assert_eq!(column.offsets(), &[4, 5, 11]);
        assert_eq!(column.value(0), b"abc");
        assert_eq!(column.value(1), b"");
        assert_eq!(column.value(2), b"hello");
    }

    #[test]
    fn fixed_string_pads_and_rejects() {
        let column = FixedStringColumn::from_rows(4, ["ab", "abcd"]).unwrap();
        assert_eq!(column.len(), 2);
        assert_eq!(column.value(0), b"ab\0\0");
        assert_eq!(column.value(1), b"abcd");

        assert!(FixedStringColumn::from_rows(2, ["abc"]).is_none());
        assert!(FixedStringColumn::from_rows(0, [""]).is_none());
        assert!(FixedStringColumn::from_chars(3, vec![0; 7]).is_none());
        assert_eq!(FixedStringColumn::from_chars(3, vec![0; 9]).unwrap().len(), 3);
    }

    #[test]
    fn native_access_matches_variant() {
        let data = ColumnData::from(vec![1_i32, 2, 3]);
        assert_eq!(i32::values(&data), Some(&[1, 2, 3][..]));
        assert_eq!(i64::values(&data), None);
        assert_eq!(u32::values(&data), None);
    }

    #[test]
    fn column_lengths_and_names() {
        let plain = Column::from(ColumnData::from(vec![1_u8, 2]));
        assert_eq!(plain.len(), 2);
        assert_eq!(plain.name(), "UInt8");

        let nullable = Column::from_options(vec![Some(1_i64), None]);
        assert_eq!(nullable.len(), 2);
        assert_eq!(nullable.name(), "Nullable(Int64)");

        let constant = Column::constant(Column::constant(nullable, 7), 9);
        assert_eq!(constant.len(), 9);
        assert!(constant.is_const());
        assert_eq!(constant.name(), "Const(Nullable(Int64))");
    }
}
