//! Hash partitioning on top of `hash(...)`.
//!
//! Spark routes a row to `pmod(hash(keys), n)`; bucketed tables use the same
//! formula with the bucket count. The hash is read as a signed 32-bit value,
//! so negative hashes wrap to the top of the range.

use std::num::NonZeroU32;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Partitioner {
    num_partitions: NonZeroU32,
}

impl Partitioner {
    pub fn new(num_partitions: NonZeroU32) -> Self {
        Self { num_partitions }
    }

    pub fn num_partitions(&self) -> u32 {
        self.num_partitions.get()
    }

    /// Non-negative remainder of the signed hash.
    #[inline]
    pub fn partition_of(&self, hash: u32) -> u32 {
        let signed = hash as i32 as i64;
        signed.rem_euclid(self.num_partitions.get() as i64) as u32
    }

    pub fn partition_ids(&self, hashes: &[u32]) -> Vec<u32> {
        hashes.iter().map(|&hash| self.partition_of(hash)).collect()
    }

    /// Row indices grouped by partition, each group in row order.
    pub fn scatter(&self, hashes: &[u32]) -> Vec<Vec<u32>> {
        let mut partitions = vec![Vec::new(); self.num_partitions.get() as usize];
        for (row, &hash) in hashes.iter().enumerate() {
            partitions[self.partition_of(hash) as usize].push(row as u32);
        }
        partitions
    }
}
