//! Broker-compatible partition hashing.
//!
//! Reproduces the Murmur2-based default partitioner of mainstream
//! broker clients bit for bit. Downstream tooling uses the resulting
//! index to predict physical partition placement, so any divergence
//! silently corrupts routing — the correctness bar is byte-exact
//! agreement with the native client, not "a reasonable hash".

/// Partition count assumed when the caller leaves it unspecified.
pub const DEFAULT_PARTITION_COUNT: i32 = 12;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PartitionError {
    #[error("partition count must be positive, got {0}")]
    NonPositiveCount(i32),
}

/// 32-bit Murmur2 with the fixed seed used by broker clients.
///
/// Mixing constants are the standard Murmur2 ones; all arithmetic is
/// wrapping unsigned 32-bit.
pub fn murmur2(data: &[u8]) -> u32 {
    const SEED: u32 = 0x9747_b28c;
    const M: u32 = 0x5bd1_e995;
    const R: u32 = 24;

    let len = data.len();
    let mut h: u32 = SEED ^ (len as u32);

    let groups = len / 4;
    for i in 0..groups {
        let off = i * 4;
        let mut k = u32::from_le_bytes([
            data[off],
            data[off + 1],
            data[off + 2],
            data[off + 3],
        ]);
        k = k.wrapping_mul(M);
        k ^= k >> R;
        k = k.wrapping_mul(M);
        h = h.wrapping_mul(M);
        h ^= k;
    }

    // Trailing 1-3 bytes, folded high to low. The final multiply only
    // happens when at least one trailing byte exists.
    let tail = groups * 4;
    let rest = len % 4;
    if rest >= 3 {
        h ^= u32::from(data[tail + 2]) << 16;
    }
    if rest >= 2 {
        h ^= u32::from(data[tail + 1]) << 8;
    }
    if rest >= 1 {
        h ^= u32::from(data[tail]);
        h = h.wrapping_mul(M);
    }

    h ^= h >> 13;
    h = h.wrapping_mul(M);
    h ^= h >> 15;

    h
}

/// Map `key` to a partition index in `[0, partition_count)`.
///
/// Matches the native client's `toPositive(murmur2(key)) % count`:
/// the sign bit is cleared before the modulo. Empty keys are valid —
/// the seed/length step still yields a deterministic value.
pub fn partition_for(key: &[u8], partition_count: i32) -> Result<i32, PartitionError> {
    if partition_count <= 0 {
        return Err(PartitionError::NonPositiveCount(partition_count));
    }
    let positive = murmur2(key) & 0x7fff_ffff;
    Ok((positive % partition_count as u32) as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // Reference vectors from Apache Kafka's UtilsTest (signed 32-bit).
    #[test]
    fn murmur2_reference_vectors() {
        assert_eq!(murmur2(b"21") as i32, -973932308);
        assert_eq!(murmur2(b"foobar") as i32, -790332482);
        assert_eq!(murmur2(b"a-little-bit-long-string") as i32, -985981536);
        assert_eq!(murmur2(b"a-little-bit-longer-string") as i32, -1486304829);
        assert_eq!(
            murmur2(b"lkjh234lh9fiuh90y23oiuhsafujhadof229phr9h19h89h8") as i32,
            -58897971
        );
        assert_eq!(murmur2(&[b'a', b'b', b'c']) as i32, 479470107);
    }

    #[test]
    fn partition_for_matches_native_placement() {
        // Derived from the reference vectors above with 12 partitions.
        assert_eq!(partition_for(b"21", 12).unwrap(), 0);
        assert_eq!(partition_for(b"foobar", 12).unwrap(), 6);
        assert_eq!(partition_for(b"abc", 12).unwrap(), 3);
    }

    #[test]
    fn empty_key_is_defined() {
        let first = murmur2(b"");
        assert_eq!(murmur2(b""), first);
        let idx = partition_for(b"", DEFAULT_PARTITION_COUNT).unwrap();
        assert!((0..DEFAULT_PARTITION_COUNT).contains(&idx));
    }

    #[test]
    fn non_positive_count_is_rejected() {
        assert_eq!(
            partition_for(b"key", 0),
            Err(PartitionError::NonPositiveCount(0))
        );
        assert_eq!(
            partition_for(b"key", -4),
            Err(PartitionError::NonPositiveCount(-4))
        );
    }

    #[test]
    fn single_partition_always_zero() {
        assert_eq!(partition_for(b"anything", 1).unwrap(), 0);
        assert_eq!(partition_for(b"", 1).unwrap(), 0);
    }

    proptest! {
        #[test]
        fn in_range_and_deterministic(key in proptest::collection::vec(any::<u8>(), 0..64),
                                      count in 1i32..1024) {
            let a = partition_for(&key, count).unwrap();
            let b = partition_for(&key, count).unwrap();
            prop_assert_eq!(a, b);
            prop_assert!((0..count).contains(&a));
        }

        #[test]
        fn hash_is_pure(key in proptest::collection::vec(any::<u8>(), 0..64)) {
            prop_assert_eq!(murmur2(&key), murmur2(&key));
        }
    }
}
