//! Deterministic hash functions backing the builtin `__hash__` hooks.
//!
//! Numeric hashes reduce modulo the Mersenne prime `2^61 - 1` so that values which
//! compare equal across types hash equally (`hash(1) == hash(1.0) == hash(True)`).
//! Strings use SipHash-1-3 with a zero key, which keeps results stable across runs.
//! A hash of `-1` is always remapped to `-2`.

const MODULUS: i64 = (1 << 61) - 1;

/// Hashes an integer.
#[must_use]
pub(crate) fn hash_int(value: i64) -> i64 {
    let remainder = (i128::from(value).unsigned_abs() % MODULUS as u128) as i64;
    let result = if value < 0 { -remainder } else { remainder };
    if result == -1 { -2 } else { result }
}

/// Hashes a float, agreeing with [`hash_int`] for integral values.
///
/// `+inf` hashes to `314159`, `-inf` to `-314159` and NaN to `0`.
#[must_use]
pub(crate) fn hash_float(value: f64) -> i64 {
    if value.is_infinite() {
        return if value > 0.0 { 314_159 } else { -314_159 };
    }
    if value.is_nan() {
        return 0;
    }
    let truncated = value.trunc();
    if value == truncated && truncated >= i64::MIN as f64 && truncated <= i64::MAX as f64 {
        return hash_int(truncated as i64);
    }

    let (mut mantissa, mut exponent) = frexp(value);
    let sign: i64 = if mantissa < 0.0 {
        mantissa = -mantissa;
        -1
    } else {
        1
    };

    // fold the mantissa in 28-bit chunks
    let modulus = MODULUS as u64;
    let mut acc: u64 = 0;
    while mantissa > 0.0 {
        acc = ((acc << 28) & modulus) | (acc >> 33);
        mantissa *= 268_435_456.0;
        exponent -= 28;
        let chunk = mantissa as u64;
        mantissa -= chunk as f64;
        acc = acc.wrapping_add(chunk);
        if acc >= modulus {
            acc -= modulus;
        }
    }

    let shift = exponent.rem_euclid(61) as u32;
    acc = ((acc << shift) & modulus) | (acc >> (61 - shift));

    let result = (sign * acc as i64) % MODULUS;
    if result == -1 { -2 } else { result }
}

/// Hashes string content.
#[must_use]
pub(crate) fn hash_str(value: &str) -> i64 {
    if value.is_empty() {
        return 0;
    }
    let result = i64::from_ne_bytes(siphash13(value.as_bytes()).to_ne_bytes());
    if result == -1 { -2 } else { result }
}

/// Returns `(frac, exp)` such that `value == frac * 2^exp` with `0.5 <= |frac| < 1.0`.
fn frexp(value: f64) -> (f64, i32) {
    if value == 0.0 || !value.is_finite() {
        return (value, 0);
    }
    let bits = value.to_bits();
    let biased = ((bits >> 52) & 0x7ff) as i32;
    if biased == 0 {
        // subnormal: scale into the normal range first
        let (frac, exp) = frexp(value * 2f64.powi(64));
        return (frac, exp - 64);
    }
    let frac = f64::from_bits((bits & 0x800F_FFFF_FFFF_FFFF) | 0x3FE0_0000_0000_0000);
    (frac, biased - 1022)
}

/// SipHash-1-3 with a zero key.
fn siphash13(bytes: &[u8]) -> u64 {
    let mut state = [
        0x736f_6d65_7073_6575_u64,
        0x646f_7261_6e64_6f6d,
        0x6c79_6765_6e65_7261,
        0x7465_6462_7974_6573,
    ];

    let mut chunks = bytes.chunks_exact(8);
    for chunk in &mut chunks {
        let mut block = [0_u8; 8];
        block.copy_from_slice(chunk);
        let message = u64::from_le_bytes(block);
        state[3] ^= message;
        sip_round(&mut state);
        state[0] ^= message;
    }

    let mut tail = (bytes.len() as u64) << 56;
    for (index, byte) in chunks.remainder().iter().enumerate() {
        tail |= u64::from(*byte) << (index * 8);
    }
    state[3] ^= tail;
    sip_round(&mut state);
    state[0] ^= tail;

    state[2] ^= 0xff;
    for _ in 0..3 {
        sip_round(&mut state);
    }
    state[0] ^ state[1] ^ state[2] ^ state[3]
}

fn sip_round(v: &mut [u64; 4]) {
    v[0] = v[0].wrapping_add(v[1]);
    v[1] = v[1].rotate_left(13) ^ v[0];
    v[0] = v[0].rotate_left(32);

    v[2] = v[2].wrapping_add(v[3]);
    v[3] = v[3].rotate_left(16) ^ v[2];

    v[0] = v[0].wrapping_add(v[3]);
    v[3] = v[3].rotate_left(21) ^ v[0];

    v[2] = v[2].wrapping_add(v[1]);
    v[1] = v[1].rotate_left(17) ^ v[2];
    v[2] = v[2].rotate_left(32);
}
