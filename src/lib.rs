//! Spark-compatible columnar hashing.
//!
//! Computes Spark's `hash(...)` (Murmur3 x86_32) and `xxhash64(...)` over a
//! batch of typed columns, bit for bit the same as the JVM functions, so a
//! native engine can partition and bucket rows exactly where Spark would.
//!
//! ```
//! use sparkhash::{ColumnData, ColumnWithType, DataType, ExecutionContext, SparkFunctionMurmurHash3_32};
//!
//! let function = SparkFunctionMurmurHash3_32::new(&ExecutionContext::detect());
//! let key = ColumnWithType::new("id", DataType::Int32, ColumnData::from(vec![1_i32]));
//! let hashes = function.execute(&[key], 1).unwrap();
//! assert_eq!(hashes[0] as i32, -559_580_957);
//! ```

pub mod algorithm;
pub mod bridge;
pub mod column;
pub mod context;
pub mod error;
pub mod executor;
pub mod murmur3;
pub mod partition;
pub mod target;
pub mod types;
pub mod value;

pub use algorithm::{HashAlgorithm, SparkMurmurHash3_32, SparkXxHash64};
pub use column::{Column, ColumnData, ColumnWithType, FixedStringColumn, NullMap, StringColumn};
pub use context::{Decimal128Encoding, ExecutionContext, HashOptions, MAX_TIER_ENV};
pub use error::{HashError, Result};
pub use executor::{SparkAnyHash, SparkFunctionMurmurHash3_32, SparkFunctionXxHash64};
pub use partition::Partitioner;
pub use target::{CpuCapabilities, Tier};
pub use types::DataType;
pub use value::{Decimal32, Decimal64, Decimal128};
