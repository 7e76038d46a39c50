//! Logical column types.

use std::fmt;

/// Logical type of an argument column.
///
/// The hashable subset mirrors what the host engine can hand us for
/// partitioning keys. The remaining variants exist so that callers can
/// describe what they have and get a typed `NotImplemented` back instead
/// of a silent coercion.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum DataType {
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Int8,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    /// Days since epoch stored as `u16`.
    Date,
    /// Days since epoch stored as `i32`.
    Date32,
    /// Seconds since epoch stored as `u32`.
    DateTime,
    /// Sub-second ticks since epoch stored as `i64`.
    DateTime64 { precision: u8 },
    Decimal32 { precision: u8, scale: u8 },
    Decimal64 { precision: u8, scale: u8 },
    Decimal128 { precision: u8, scale: u8 },
    String,
    FixedString(usize),
    Nullable(Box<DataType>),

    // Describable but not hashable.
    Int128,
    UInt128,
    Decimal256 { precision: u8, scale: u8 },
    Uuid,
    Array(Box<DataType>),
    Map(Box<DataType>, Box<DataType>),
    Tuple(Vec<DataType>),
    Nothing,
}

impl DataType {
    pub fn nullable(inner: DataType) -> Self {
        match inner {
            nullable @ DataType::Nullable(_) => nullable,
            other => DataType::Nullable(Box::new(other)),
        }
    }

    /// Strips a `Nullable` wrapper, if any.
    pub fn remove_nullable(&self) -> &DataType {
        match self {
            DataType::Nullable(inner) => inner,
            other => other,
        }
    }

    pub fn is_nullable(&self) -> bool {
        matches!(self, DataType::Nullable(_))
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::UInt8 => f.write_str("UInt8"),
            DataType::UInt16 => f.write_str("UInt16"),
            DataType::UInt32 => f.write_str("UInt32"),
            DataType::UInt64 => f.write_str("UInt64"),
            DataType::Int8 => f.write_str("Int8"),
            DataType::Int16 => f.write_str("Int16"),
            DataType::Int32 => f.write_str("Int32"),
            DataType::Int64 => f.write_str("Int64"),
            DataType::Float32 => f.write_str("Float32"),
            DataType::Float64 => f.write_str("Float64"),
            DataType::Date => f.write_str("Date"),
            DataType::Date32 => f.write_str("Date32"),
            DataType::DateTime => f.write_str("DateTime"),
            DataType::DateTime64 { precision } => write!(f, "DateTime64({precision})"),
            DataType::Decimal32 { precision, scale }
            | DataType::Decimal64 { precision, scale }
            | DataType::Decimal128 { precision, scale }
            | DataType::Decimal256 { precision, scale } => {
                write!(f, "Decimal({precision}, {scale})")
            }
            DataType::String => f.write_str("String"),
            DataType::FixedString(n) => write!(f, "FixedString({n})"),
            DataType::Nullable(inner) => write!(f, "Nullable({inner})"),
            DataType::Int128 => f.write_str("Int128"),
            DataType::UInt128 => f.write_str("UInt128"),
            DataType::Uuid => f.write_str("UUID"),
            DataType::Array(inner) => write!(f, "Array({inner})"),
            DataType::Map(key, value) => write!(f, "Map({key}, {value})"),
            DataType::Tuple(items) => {
                f.write_str("Tuple(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str(")")
            }
            DataType::Nothing => f.write_str("Nothing"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names() {
        assert_eq!(DataType::Int32.to_string(), "Int32");
        assert_eq!(
            DataType::Decimal128 {
                precision: 38,
                scale: 2
            }
            .to_string(),
            "Decimal(38, 2)"
        );
        assert_eq!(
            DataType::nullable(DataType::FixedString(16)).to_string(),
            "Nullable(FixedString(16))"
        );
        assert_eq!(
            DataType::Tuple(vec![DataType::Int8, DataType::String]).to_string(),
            "Tuple(Int8, String)"
        );
        assert_eq!(
            DataType::Map(Box::new(DataType::String), Box::new(DataType::UInt64)).to_string(),
            "Map(String, UInt64)"
        );
    }

    #[test]
    fn nullable_does_not_nest() {
        let once = DataType::nullable(DataType::Date);
        let twice = DataType::nullable(once.clone());
        assert_eq!(once, twice);
        assert!(twice.is_nullable());
        assert_eq!(twice.remove_nullable(), &DataType::Date);
        assert_eq!(DataType::Date.remove_nullable(), &DataType::Date);
    }
}
