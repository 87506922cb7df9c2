// Distance kernels for the two index backends.
// Scalar code with two accumulators; multi-hot skill vectors are short enough
// that platform intrinsics buy nothing and would make results platform dependent.

/// Dot product over equal-length slices (0.0 on length mismatch)
#[inline]
pub fn dot_product(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let mut dot0 = 0.0f32;
    let mut dot1 = 0.0f32;

    let chunks = a.chunks_exact(8);
    let remainder = chunks.remainder();
    for (a_chunk, b_chunk) in chunks.zip(b.chunks_exact(8)) {
        dot0 += a_chunk[0] * b_chunk[0]
            + a_chunk[1] * b_chunk[1]
            + a_chunk[2] * b_chunk[2]
            + a_chunk[3] * b_chunk[3];
        dot1 += a_chunk[4] * b_chunk[4]
            + a_chunk[5] * b_chunk[5]
            + a_chunk[6] * b_chunk[6]
            + a_chunk[7] * b_chunk[7];
    }

    let offset = a.len() - remainder.len();
    for (x, y) in remainder.iter().zip(&b[offset..]) {
        dot0 += x * y;
    }

    dot0 + dot1
}

#[inline]
pub fn norm(a: &[f32]) -> f32 {
    dot_product(a, a).sqrt()
}

/// Squared Euclidean distance (INFINITY on length mismatch)
#[inline]
pub fn l2_squared(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return f32::INFINITY;
    }

    let mut sum0 = 0.0f32;
    let mut sum1 = 0.0f32;
    let mut pairs = a.iter().zip(b.iter());
    loop {
        match (pairs.next(), pairs.next()) {
            (Some((x0, y0)), Some((x1, y1))) => {
                let d0 = x0 - y0;
                let d1 = x1 - y1;
                sum0 += d0 * d0;
                sum1 += d1 * d1;
            }
            (Some((x0, y0)), None) => {
                let d0 = x0 - y0;
                sum0 += d0 * d0;
                break;
            }
            _ => break,
        }
    }
    sum0 + sum1
}

/// Number of differing bits between two packed bit strings (u32::MAX on length mismatch)
#[inline]
pub fn hamming(a: &[u8], b: &[u8]) -> u32 {
    if a.len() != b.len() {
        return u32::MAX;
    }

    let mut count = 0u32;
    let chunks = a.chunks_exact(8);
    let remainder = chunks.remainder();
    for (x, y) in chunks.zip(b.chunks_exact(8)) {
        let mut xa = [0u8; 8];
        let mut ya = [0u8; 8];
        xa.copy_from_slice(x);
        ya.copy_from_slice(y);
        count += (u64::from_ne_bytes(xa) ^ u64::from_ne_bytes(ya)).count_ones();
    }
    let offset = a.len() - remainder.len();
    for (x, y) in remainder.iter().zip(&b[offset..]) {
        count += (x ^ y).count_ones();
    }
    count
}
