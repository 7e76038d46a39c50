//! Spark's flavour of Murmur3 x86_32.
//!
//! Bytes past the last whole 4-byte block are not packed into one final
//! block as reference Murmur3 does. Each one is sign-extended like a JVM
//! `byte` and mixed on its own as a full block. Spark kept this for
//! backward compatibility (SPARK-23381) and every partition id computed by
//! the host depends on it, so it must not be "fixed" here.
//!
//! Native ports that read the tail through a `uint8_t*` zero-extend it and
//! disagree with the JVM for bytes >= 0x80. The JVM's sign extension wins.

const C1: u32 = 0xcc9e_2d51;
const C2: u32 = 0x1b87_3593;

#[inline(always)]
fn mix_k1(mut k1: u32) -> u32 {
    k1 = k1.wrapping_mul(C1);
    k1 = k1.rotate_left(15);
    k1.wrapping_mul(C2)
}

#[inline(always)]
fn mix_h1(mut h1: u32, k1: u32) -> u32 {
    h1 ^= k1;
    h1 = h1.rotate_left(13);
    h1.wrapping_mul(5).wrapping_add(0xe654_6b64)
}

#[inline(always)]
fn fmix(mut h1: u32, len: usize) -> u32 {
    h1 ^= len as u32;
    h1 ^= h1 >> 16;
    h1 = h1.wrapping_mul(0x85eb_ca6b);
    h1 ^= h1 >> 13;
    h1 = h1.wrapping_mul(0xc2b2_ae35);
    h1 ^ (h1 >> 16)
}

pub fn hash32(data: &[u8], seed: u32) -> u32 {
    let mut h1 = seed;

    let mut blocks = data.chunks_exact(4);
    for block in &mut blocks {
        let k1 = u32::from_le_bytes([block[0], block[1], block[2], block[3]]);
        h1 = mix_h1(h1, mix_k1(k1));
    }

    for &byte in blocks.remainder() {
        h1 = mix_h1(h1, mix_k1(byte as i8 as i32 as u32));
    }

    fmix(h1, data.len())
}
