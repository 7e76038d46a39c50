//! Variadic column hashing.
//!
//! `hash(a, b, c)` starts every row at the algorithm's seed and folds the
//! arguments in from left to right: the value a row holds after argument
//! `k - 1` is the seed argument `k` is hashed with. A null contributes
//! nothing, so the row keeps its previous value and the result column is
//! never null.
//!
//! # Dispatch
//!
//! ```text
//!  execute ──► selector (tier fn ptr) ──► execute_arguments
//!                                           │ per argument
//!                                           ▼
//!                     size check, unwrap Const, unwrap Nullable
//!                                           │
//!                     match DataType ───────┼──► execute_number::<T>
//!                                           ├──► execute_string
//!                                           └──► execute_fixed_string
//! ```
//!
//! The type match happens once per argument, never per row.

use tracing::debug_span;

use crate::algorithm::{HashAlgorithm, SparkMurmurHash3_32, SparkXxHash64};
use crate::column::{Column, ColumnData, ColumnWithType, NativeColumn, NullMap};
use crate::context::{ExecutionContext, HashOptions};
use crate::error::{HashError, Result};
use crate::target::{ImplementationSelector, Tier};
use crate::types::DataType;
use crate::value::{Decimal32, Decimal64, Decimal128, HashValue};

/// Spark `xxhash64(...)`.
pub type SparkFunctionXxHash64 = SparkAnyHash<SparkXxHash64>;

/// Spark `hash(...)`.
pub type SparkFunctionMurmurHash3_32 = SparkAnyHash<SparkMurmurHash3_32>;

/// A hash function over any number of typed argument columns.
///
/// Cheap to share: calls take `&self` and keep all per-call state on
/// their own stack and accumulator.
#[derive(Debug)]
pub struct SparkAnyHash<H: HashAlgorithm> {
    selector: ImplementationSelector<H>,
    options: HashOptions,
}

impl<H: HashAlgorithm> SparkAnyHash<H> {
    pub fn new(context: &ExecutionContext) -> Self {
        Self {
            selector: ImplementationSelector::new(context),
            options: context.options,
        }
    }

    pub fn name(&self) -> &'static str {
        H::NAME
    }

    pub fn is_variadic(&self) -> bool {
        true
    }

    pub fn return_type(&self) -> DataType {
        H::return_type()
    }

    pub fn tier(&self) -> Tier {
        self.selector.selected()
    }

    pub fn options(&self) -> &HashOptions {
        &self.options
    }

    /// Hashes `rows` rows of `arguments`.
    ///
    /// Either every row is produced or an error is returned; a failing
    /// argument never leaves a half-updated result behind.
    pub fn execute(&self, arguments: &[ColumnWithType], rows: usize) -> Result<Vec<H::Output>> {
        let _span = debug_span!(
            "hash_batch",
            function = H::NAME,
            rows,
            arguments = arguments.len(),
            tier = %self.tier()
        )
        .entered();

        let mut vec_to = vec![H::SEED; rows];
        self.selector.execute(arguments, &self.options, &mut vec_to)?;
        Ok(vec_to)
    }

    /// Like [`SparkAnyHash::execute`], wrapped as a result column.
    pub fn apply(&self, arguments: &[ColumnWithType], rows: usize) -> Result<Column> {
        let values = self.execute(arguments, rows)?;
        Ok(Column::Vector(H::into_column(values)))
    }
}

/// Kernel body shared by every tier.
#[inline(always)]
pub(crate) fn execute_arguments<H: HashAlgorithm>(
    arguments: &[ColumnWithType],
    options: &HashOptions,
    vec_to: &mut [H::Output],
) -> Result<()> {
    for argument in arguments {
        execute_any::<H>(argument, options, vec_to)?;
    }
    Ok(())
}

/// An argument with its wrappers peeled off.
struct Input<'a> {
    column: &'a Column,
    data: &'a ColumnData,
    null_map: Option<&'a NullMap>,
    from_const: bool,
}

impl Input<'_> {
    #[inline(always)]
    fn is_null(&self, row: usize) -> bool {
        match self.null_map {
            Some(null_map) => null_map.is_null(row),
            None => false,
        }
    }

    fn illegal<H: HashAlgorithm>(&self) -> HashError {
        HashError::IllegalColumn {
            function: H::NAME,
            column: self.column.name(),
        }
    }
}

#[inline(always)]
fn execute_any<H: HashAlgorithm>(
    argument: &ColumnWithType,
    options: &HashOptions,
    vec_to: &mut [H::Output],
) -> Result<()> {
    let column = &argument.column;
    if column.len() != vec_to.len() {
        return Err(HashError::SizeMismatch {
            function: H::NAME,
            column: column.name(),
            size: column.len(),
            expected: vec_to.len(),
        });
    }

    let (from_const, data_column) = match column {
        Column::Const { inner, .. } => (true, inner.as_ref()),
        other => (false, other),
    };

    let (data, null_map) = match data_column {
        Column::Vector(data) => (data, None),
        Column::Nullable { nested, null_map } => (nested, Some(null_map)),
        Column::Const { .. } => {
            return Err(HashError::IllegalColumn {
                function: H::NAME,
                column: column.name(),
            });
        }
    };

    let input = Input {
        column,
        data,
        null_map,
        from_const,
    };

    if null_map.is_some_and(|m| m.len() != data.len())
        || (from_const && data.is_empty() && !vec_to.is_empty())
    {
        return Err(input.illegal::<H>());
    }

    match argument.data_type.remove_nullable() {
        DataType::UInt8 => execute_number::<H, u8>(&input, options, vec_to),
        DataType::UInt16 => execute_number::<H, u16>(&input, options, vec_to),
        DataType::UInt32 => execute_number::<H, u32>(&input, options, vec_to),
        DataType::UInt64 => execute_number::<H, u64>(&input, options, vec_to),
        DataType::Int8 => execute_number::<H, i8>(&input, options, vec_to),
        DataType::Int16 => execute_number::<H, i16>(&input, options, vec_to),
        DataType::Int32 => execute_number::<H, i32>(&input, options, vec_to),
        DataType::Int64 => execute_number::<H, i64>(&input, options, vec_to),
        DataType::Float32 => execute_number::<H, f32>(&input, options, vec_to),
        DataType::Float64 => execute_number::<H, f64>(&input, options, vec_to),
        DataType::Date => execute_number::<H, u16>(&input, options, vec_to),
        DataType::Date32 => execute_number::<H, i32>(&input, options, vec_to),
        DataType::DateTime => execute_number::<H, u32>(&input, options, vec_to),
        DataType::DateTime64 { .. } => execute_number::<H, i64>(&input, options, vec_to),
        DataType::Decimal32 { .. } => execute_number::<H, Decimal32>(&input, options, vec_to),
        DataType::Decimal64 { .. } => execute_number::<H, Decimal64>(&input, options, vec_to),
        DataType::Decimal128 { .. } => execute_number::<H, Decimal128>(&input, options, vec_to),
        DataType::String => execute_string::<H>(&input, vec_to),
        DataType::FixedString(n) => execute_fixed_string::<H>(&input, *n, vec_to),
        // Nested and oversized types need pre-flattening by the caller.
        DataType::Nullable(_)
        | DataType::Int128
        | DataType::UInt128
        | DataType::Decimal256 { .. }
        | DataType::Uuid
        | DataType::Array(_)
        | DataType::Map(..)
        | DataType::Tuple(_)
        | DataType::Nothing => Err(HashError::NotImplemented {
            function: H::NAME,
            data_type: argument.data_type.to_string(),
        }),
    }
}

/// Hashes `bytes` into every row. Consecutive rows that share a seed share
/// the result, so a broadcast over a uniform accumulator hashes once.
#[inline(always)]
fn hash_broadcast<H: HashAlgorithm>(bytes: &[u8], vec_to: &mut [H::Output]) {
    let Some(&first) = vec_to.first() else {
        return;
    };
    let mut last_seed = first;
    let mut last_hash = H::hash(bytes, first);
    for to in vec_to.iter_mut() {
        if *to != last_seed {
            last_seed = *to;
            last_hash = H::hash(bytes, last_seed);
        }
        *to = last_hash;
    }
}

#[inline(always)]
fn execute_number<H: HashAlgorithm, T: NativeColumn + HashValue>(
    input: &Input<'_>,
    options: &HashOptions,
    vec_to: &mut [H::Output],
) -> Result<()> {
    let values = T::values(input.data).ok_or_else(|| input.illegal::<H>())?;

    if input.from_const {
        if !vec_to.is_empty() && !input.is_null(0) {
            let encoded = values[0].encode(options);
            hash_broadcast::<H>(encoded.as_slice(), vec_to);
        }
        return Ok(());
    }

    match input.null_map {
        None => {
            for (to, &value) in vec_to.iter_mut().zip(values) {
                *to = H::hash(value.encode(options).as_slice(), *to);
            }
        }
        Some(null_map) => {
            for (row, (to, &value)) in vec_to.iter_mut().zip(values).enumerate() {
                if !null_map.is_null(row) {
                    *to = H::hash(value.encode(options).as_slice(), *to);
                }
            }
        }
    }
    Ok(())
}

#[inline(always)]
fn execute_string<H: HashAlgorithm>(input: &Input<'_>, vec_to: &mut [H::Output]) -> Result<()> {
    let ColumnData::String(strings) = input.data else {
        return Err(input.illegal::<H>());
    };

    if input.from_const {
        if !vec_to.is_empty() && !input.is_null(0) {
            hash_broadcast::<H>(strings.value(0), vec_to);
        }
        return Ok(());
    }

    let chars = strings.chars();
    let offsets = strings.offsets();
    let mut current_offset = 0;
    for (row, to) in vec_to.iter_mut().enumerate() {
        let next_offset = offsets[row];
        if !input.is_null(row) {
            // The terminator is not part of the value.
            *to = H::hash(&chars[current_offset..next_offset - 1], *to);
        }
        current_offset = next_offset;
    }
    Ok(())
}

#[inline(always)]
fn execute_fixed_string<H: HashAlgorithm>(
    input: &Input<'_>,
    n: usize,
    vec_to: &mut [H::Output],
) -> Result<()> {
    let ColumnData::FixedString(fixed) = input.data else {
        return Err(input.illegal::<H>());
    };
    if fixed.n() != n {
        return Err(input.illegal::<H>());
    }

    if input.from_const {
        if !vec_to.is_empty() && !input.is_null(0) {
            hash_broadcast::<H>(fixed.value(0), vec_to);
        }
        return Ok(());
    }

    for (row, (to, value)) in vec_to.iter_mut().zip(fixed.chars().chunks_exact(n)).enumerate() {
        if !input.is_null(row) {
            *to = H::hash(value, *to);
        }
    }
    Ok(())
}
