use byteorder::{ByteOrder, LittleEndian};

use crate::constants::{MAX_BLOCK_SIZE, SIZE_PREFIX_LEN};

/// CRC32 (IEEE) of `data`. Used as the stable identity of a dictionary blob.
pub fn compute_checksum(data: &[u8]) -> u32 {
    use crc32fast::Hasher;
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// Write the raw length of a block as a little-endian u32 into `out[..4]`.
/// Returns `None` if `out` cannot hold the prefix or the length does not fit.
pub fn write_size_prefix(raw_len: usize, out: &mut [u8]) -> Option<()> {
    if out.len() < SIZE_PREFIX_LEN || raw_len > MAX_BLOCK_SIZE {
        return None;
    }
    LittleEndian::write_u32(&mut out[..SIZE_PREFIX_LEN], raw_len as u32);
    Some(())
}

/// Split a size-prefixed payload into `(raw_len, body)`.
pub fn read_size_prefix(input: &[u8]) -> Option<(usize, &[u8])> {
    if input.len() < SIZE_PREFIX_LEN {
        return None;
    }
    let raw_len = LittleEndian::read_u32(&input[..SIZE_PREFIX_LEN]) as usize;
    Some((raw_len, &input[SIZE_PREFIX_LEN..]))
}
