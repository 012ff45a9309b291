//! 256-bit word arithmetic
//!
//! A [`Word`] is a big-endian `[u8; 32]`. Bitwise and comparison operations
//! work on the bytes directly; multiplication, division and shifts go through
//! `primitive_types::U256`. Every function is pure and wraps modulo 2^256.

use std::cmp::Ordering;

use sevm_primitives::Address;

/// 256-bit machine word (big-endian)
pub type Word = [u8; 32];

type PU256 = primitive_types::U256;

/// Zero value
pub const ZERO: Word = [0u8; 32];

/// One value
pub const ONE: Word = {
    let mut v = [0u8; 32];
    v[31] = 1;
    v
};

/// Max value (2^256 - 1)
pub const MAX: Word = [0xFF; 32];

// ==================== Conversions ====================

/// Convert u64 to a word
pub fn from_u64(value: u64) -> Word {
    let mut result = ZERO;
    result[24..32].copy_from_slice(&value.to_be_bytes());
    result
}

/// Convert usize to a word
pub fn from_usize(value: usize) -> Word {
    from_u64(value as u64)
}

/// 1 for true, 0 for false
pub fn from_bool(value: bool) -> Word {
    if value {
        ONE
    } else {
        ZERO
    }
}

/// Try to convert to u64 (None if the value does not fit)
pub fn to_u64(value: &Word) -> Option<u64> {
    if value[0..24].iter().any(|&b| b != 0) {
        return None;
    }
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&value[24..32]);
    Some(u64::from_be_bytes(bytes))
}

/// Try to convert to usize (None if the value does not fit)
pub fn to_usize(value: &Word) -> Option<usize> {
    to_u64(value).and_then(|v| usize::try_from(v).ok())
}

/// Left-pad up to 32 bytes; longer input keeps its low 32 bytes
pub fn from_slice_padded(bytes: &[u8]) -> Word {
    let mut result = ZERO;
    let take = bytes.len().min(32);
    result[32 - take..].copy_from_slice(&bytes[bytes.len() - take..]);
    result
}

/// Address as a left-padded word
pub fn from_address(address: &Address) -> Word {
    from_slice_padded(address.as_bytes())
}

/// Low 20 bytes of a word as an address
pub fn to_address(value: &Word) -> Address {
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&value[12..32]);
    Address::from_bytes(bytes)
}

/// Convert to `primitive_types::U256`
pub fn to_u256(value: &Word) -> PU256 {
    PU256::from_big_endian(value)
}

/// Convert from `primitive_types::U256`
pub fn from_u256(value: PU256) -> Word {
    let mut result = ZERO;
    value.to_big_endian(&mut result);
    result
}

// ==================== Comparison and bitwise ====================

/// Check if zero
pub fn is_zero(value: &Word) -> bool {
    value.iter().all(|&b| b == 0)
}

/// Unsigned comparison
pub fn cmp(a: &Word, b: &Word) -> Ordering {
    a.cmp(b)
}

/// Unsigned less than
pub fn lt(a: &Word, b: &Word) -> bool {
    cmp(a, b) == Ordering::Less
}

/// Unsigned greater than
pub fn gt(a: &Word, b: &Word) -> bool {
    cmp(a, b) == Ordering::Greater
}

/// Equality
pub fn eq(a: &Word, b: &Word) -> bool {
    a == b
}

/// Signed less than (two's complement)
pub fn slt(a: &Word, b: &Word) -> bool {
    match (is_negative(a), is_negative(b)) {
        (true, false) => true,
        (false, true) => false,
        _ => lt(a, b),
    }
}

/// Signed greater than (two's complement)
pub fn sgt(a: &Word, b: &Word) -> bool {
    slt(b, a)
}

fn zip_with(a: &Word, b: &Word, f: impl Fn(u8, u8) -> u8) -> Word {
    let mut result = ZERO;
    for i in 0..32 {
        result[i] = f(a[i], b[i]);
    }
    result
}

/// Bitwise AND
pub fn and(a: &Word, b: &Word) -> Word {
    zip_with(a, b, |x, y| x & y)
}

/// Bitwise OR
pub fn or(a: &Word, b: &Word) -> Word {
    zip_with(a, b, |x, y| x | y)
}

/// Bitwise XOR
pub fn xor(a: &Word, b: &Word) -> Word {
    zip_with(a, b, |x, y| x ^ y)
}

/// Bitwise NOT
pub fn not(a: &Word) -> Word {
    let mut result = *a;
    result.iter_mut().for_each(|b| *b = !*b);
    result
}

/// BYTE: byte `i` of `x`, 0 being the most significant
pub fn byte(i: &Word, x: &Word) -> Word {
    match to_usize(i) {
        Some(idx) if idx < 32 => from_u64(x[idx] as u64),
        _ => ZERO,
    }
}

// ==================== Arithmetic ====================

/// Wrapping addition
pub fn add(a: &Word, b: &Word) -> Word {
    from_u256(to_u256(a).overflowing_add(to_u256(b)).0)
}

/// Wrapping subtraction
pub fn sub(a: &Word, b: &Word) -> Word {
    from_u256(to_u256(a).overflowing_sub(to_u256(b)).0)
}

/// Wrapping multiplication
pub fn mul(a: &Word, b: &Word) -> Word {
    from_u256(to_u256(a).overflowing_mul(to_u256(b)).0)
}

/// Unsigned division, 0 when dividing by zero
pub fn div(a: &Word, b: &Word) -> Word {
    let pb = to_u256(b);
    if pb.is_zero() {
        return ZERO;
    }
    from_u256(to_u256(a) / pb)
}

/// Unsigned modulo (MOD), 0 when the modulus is zero
pub fn rem(a: &Word, b: &Word) -> Word {
    let pb = to_u256(b);
    if pb.is_zero() {
        return ZERO;
    }
    from_u256(to_u256(a) % pb)
}

/// Signed division, truncating toward zero
pub fn sdiv(a: &Word, b: &Word) -> Word {
    if is_zero(b) {
        return ZERO;
    }
    let (a_neg, abs_a) = abs(a);
    let (b_neg, abs_b) = abs(b);
    let quotient = abs_a / abs_b;
    if a_neg != b_neg {
        from_u256(negate(quotient))
    } else {
        // -2^255 / -1 overflows back to -2^255 here
        from_u256(quotient)
    }
}

/// Signed modulo; the result takes the sign of the dividend
pub fn smod(a: &Word, b: &Word) -> Word {
    if is_zero(b) {
        return ZERO;
    }
    let (a_neg, abs_a) = abs(a);
    let (_, abs_b) = abs(b);
    let remainder = abs_a % abs_b;
    if a_neg {
        from_u256(negate(remainder))
    } else {
        from_u256(remainder)
    }
}

/// (a + b) % n without intermediate overflow
pub fn addmod(a: &Word, b: &Word, n: &Word) -> Word {
    let pn = to_u256(n);
    if pn.is_zero() {
        return ZERO;
    }
    from_u256(add_mod(to_u256(a) % pn, to_u256(b) % pn, pn))
}

/// (a * b) % n without intermediate overflow
pub fn mulmod(a: &Word, b: &Word, n: &Word) -> Word {
    let pn = to_u256(n);
    if pn <= PU256::one() {
        return ZERO;
    }
    // Double-and-add keeps every partial result below n
    let mut result = PU256::zero();
    let mut a = to_u256(a) % pn;
    let mut b = to_u256(b);
    while !b.is_zero() {
        if b.bit(0) {
            result = add_mod(result, a, pn);
        }
        a = add_mod(a, a, pn);
        b = b >> 1;
    }
    from_u256(result)
}

/// base^exponent mod 2^256
pub fn exp(base: &Word, exponent: &Word) -> Word {
    let mut b = to_u256(base);
    let mut e = to_u256(exponent);
    let mut result = PU256::one();
    while !e.is_zero() {
        if e.bit(0) {
            result = result.overflowing_mul(b).0;
        }
        b = b.overflowing_mul(b).0;
        e = e >> 1;
    }
    from_u256(result)
}

/// SIGNEXTEND: extend the sign bit of byte `b` (counted from the least
/// significant end) through the whole word
pub fn signextend(b: &Word, x: &Word) -> Word {
    let b = match to_usize(b) {
        Some(b) if b < 31 => b,
        _ => return *x,
    };
    let sign_index = 31 - b;
    let fill = if x[sign_index] & 0x80 != 0 { 0xFF } else { 0x00 };
    let mut result = *x;
    result[..sign_index].fill(fill);
    result
}

// ==================== Shifts ====================

/// SHL: value << shift
pub fn shl(shift: &Word, value: &Word) -> Word {
    match to_usize(shift) {
        Some(s) if s < 256 => from_u256(to_u256(value) << s),
        _ => ZERO,
    }
}

/// SHR: logical value >> shift
pub fn shr(shift: &Word, value: &Word) -> Word {
    match to_usize(shift) {
        Some(s) if s < 256 => from_u256(to_u256(value) >> s),
        _ => ZERO,
    }
}

/// SAR: arithmetic value >> shift, filling with the sign bit
pub fn sar(shift: &Word, value: &Word) -> Word {
    let negative = is_negative(value);
    let s = match to_usize(shift) {
        Some(s) if s < 256 => s,
        _ => return if negative { MAX } else { ZERO },
    };
    let shifted = to_u256(value) >> s;
    if negative && s > 0 {
        from_u256(shifted | (PU256::MAX << (256 - s)))
    } else {
        from_u256(shifted)
    }
}

// ==================== Internal helpers ====================

fn is_negative(value: &Word) -> bool {
    value[0] & 0x80 != 0
}

/// Two's complement negation: ~v + 1
fn negate(v: PU256) -> PU256 {
    (!v).overflowing_add(PU256::one()).0
}

fn abs(value: &Word) -> (bool, PU256) {
    let v = to_u256(value);
    if is_negative(value) {
        (true, negate(v))
    } else {
        (false, v)
    }
}

/// (a + b) % n for a, b < n
fn add_mod(a: PU256, b: PU256, n: PU256) -> PU256 {
    let (sum, overflow) = a.overflowing_add(b);
    if overflow || sum >= n {
        sum.overflowing_sub(n).0
    } else {
        sum
    }
}
