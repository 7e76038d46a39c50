//! Per-type value encodings.
//!
//! Every hashable value is turned into the exact byte image the host
//! runtime feeds its hash function, then hashed by the executor. Encoding
//! never depends on the hash algorithm, so one encoded constant can be
//! reused for every row of a batch.

use std::fmt;

use tracing::trace;

use crate::context::{Decimal128Encoding, HashOptions};

/// Decimal with a 32-bit backing integer (unscaled value).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Decimal32(pub i32);

/// Decimal with a 64-bit backing integer (unscaled value).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Decimal64(pub i64);

/// Decimal with a 128-bit backing integer (unscaled value).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Decimal128(pub i128);

/// Encoded value bytes, at most 16 of them, kept on the stack.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct ValueBytes {
    buf: [u8; 16],
    len: u8,
}

impl ValueBytes {
    #[inline(always)]
    fn from_slice(bytes: &[u8]) -> Self {
        debug_assert!(bytes.len() <= 16);
        let mut buf = [0u8; 16];
        buf[..bytes.len()].copy_from_slice(bytes);
        Self {
            buf,
            len: bytes.len() as u8,
        }
    }

    #[inline(always)]
    pub fn as_slice(&self) -> &[u8] {
        &self.buf[..self.len as usize]
    }
}

impl fmt::Debug for ValueBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ValueBytes({})", HexBytes(self.as_slice()))
    }
}

/// Upper-case hex rendering of a byte slice, for logs.
pub struct HexBytes<'a>(pub &'a [u8]);

impl fmt::Display for HexBytes<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02X}")?;
        }
        Ok(())
    }
}

/// A fixed-width value the executor knows how to hash.
pub trait HashValue: Copy {
    fn encode(self, options: &HashOptions) -> ValueBytes;
}

// Integers narrower than 32 bits are widened first, so equal values of
// different integer types hash alike. Signedness follows the source type.
macro_rules! int_hash_value {
    ($($native:ty => $promoted:ty),* $(,)?) => {
        $(
            impl HashValue for $native {
                #[inline(always)]
                fn encode(self, _options: &HashOptions) -> ValueBytes {
                    ValueBytes::from_slice(&(self as $promoted).to_le_bytes())
                }
            }
        )*
    };
}

int_hash_value!(
    u8 => u32,
    u16 => u32,
    u32 => u32,
    u64 => u64,
    i8 => i32,
    i16 => i32,
    i32 => i32,
    i64 => i64,
);

impl HashValue for f32 {
    #[inline(always)]
    fn encode(self, _options: &HashOptions) -> ValueBytes {
        // -0.0 compares equal to 0.0.
        if self == 0.0 {
            ValueBytes::from_slice(&0_i32.to_le_bytes())
        } else {
            ValueBytes::from_slice(&self.to_le_bytes())
        }
    }
}

impl HashValue for f64 {
    #[inline(always)]
    fn encode(self, _options: &HashOptions) -> ValueBytes {
        if self == 0.0 {
            ValueBytes::from_slice(&0_i64.to_le_bytes())
        } else {
            ValueBytes::from_slice(&self.to_le_bytes())
        }
    }
}

impl HashValue for Decimal32 {
    #[inline(always)]
    fn encode(self, _options: &HashOptions) -> ValueBytes {
        ValueBytes::from_slice(&(self.0 as i64).to_le_bytes())
    }
}

impl HashValue for Decimal64 {
    #[inline(always)]
    fn encode(self, _options: &HashOptions) -> ValueBytes {
        ValueBytes::from_slice(&self.0.to_le_bytes())
    }
}

impl HashValue for Decimal128 {
    #[inline]
    fn encode(self, options: &HashOptions) -> ValueBytes {
        match options.decimal128 {
            Decimal128Encoding::Compact => match i64::try_from(self.0) {
                Ok(narrow) => ValueBytes::from_slice(&narrow.to_le_bytes()),
                Err(_) => canonical_bytes(self.0),
            },
            Decimal128Encoding::Canonical => canonical_bytes(self.0),
        }
    }
}

/// Minimal big-endian two's-complement image of `value`.
///
/// Leading bytes that only repeat the sign are dropped, but one sign bit
/// is always kept, giving `bit_length / 8 + 1` bytes. This is the same
/// byte string `java.math.BigInteger#toByteArray` returns.
pub fn canonical_bytes(value: i128) -> ValueBytes {
    let redundant_sign_bits = if value < 0 {
        (!value).leading_zeros()
    } else {
        value.leading_zeros()
    } as usize;
    let bit_length = 128 - redundant_sign_bits;
    let len = bit_length / 8 + 1;

    let be = value.to_be_bytes();
    let bytes = ValueBytes::from_slice(&be[be.len() - len..]);
    trace!(value = %value, bytes = %HexBytes(bytes.as_slice()), "canonical decimal bytes");
    bytes
}
