// One-byte record checksum: two's complement of the byte sum

/// Compute the checksum of `bytes`
pub fn compute(bytes: &[u8]) -> u8 {
    sum(bytes).wrapping_neg()
}

/// Check a byte run whose last byte is its checksum.
/// Valid iff the low byte of the sum of everything, checksum included, is zero.
pub fn validate(bytes: &[u8]) -> bool {
    sum(bytes) == 0
}

/// Return `bytes` with its checksum appended
pub fn append(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len() + 1);
    out.extend_from_slice(bytes);
    out.push(compute(bytes));
    out
}

fn sum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, &b| acc.wrapping_add(b))
}
