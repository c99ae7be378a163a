//! Wide-integer assembly from 32-bit words.
//!
//! The wire carries integers wider than 32 bits as sequences of unsigned
//! 32-bit words in big-endian significance order (high word of the high part
//! first). For signed types the top bit of the most-significant word is the
//! sign bit and the magnitude is two's-complement-equivalent. 256-bit values
//! are represented as `(hi, lo)` pairs of `u128` halves and formatted as
//! decimal strings; no external bigint crate.

use crate::error::CodecError;

// ---------------------------------------------------------------------------
// 64-bit
// ---------------------------------------------------------------------------

pub fn u64_from_words(words: [u32; 2]) -> u64 {
    ((words[0] as u64) << 32) | words[1] as u64
}

pub fn u64_to_words(v: u64) -> [u32; 2] {
    [(v >> 32) as u32, v as u32]
}

pub fn i64_from_words(words: [u32; 2]) -> i64 {
    u64_from_words(words) as i64
}

pub fn i64_to_words(v: i64) -> [u32; 2] {
    u64_to_words(v as u64)
}

// ---------------------------------------------------------------------------
// 128-bit
// ---------------------------------------------------------------------------

pub fn u128_from_words(words: [u32; 4]) -> u128 {
    words.iter().fold(0u128, |acc, w| (acc << 32) | *w as u128)
}

pub fn u128_to_words(v: u128) -> [u32; 4] {
    [
        (v >> 96) as u32,
        (v >> 64) as u32,
        (v >> 32) as u32,
        v as u32,
    ]
}

/// Decode a signed 128-bit value: if the top bit of the most-significant
/// word is set, the two's-complement reinterpretation is negative.
pub fn i128_from_words(words: [u32; 4]) -> i128 {
    u128_from_words(words) as i128
}

pub fn i128_to_words(v: i128) -> [u32; 4] {
    u128_to_words(v as u128)
}

// ---------------------------------------------------------------------------
// 256-bit
// ---------------------------------------------------------------------------

pub fn u256_from_words(words: [u32; 8]) -> (u128, u128) {
    let mut halves = [0u128; 2];
    for (i, half) in halves.iter_mut().enumerate() {
        for w in &words[i * 4..i * 4 + 4] {
            *half = (*half << 32) | *w as u128;
        }
    }
    (halves[0], halves[1])
}

pub fn u256_to_words(hi: u128, lo: u128) -> [u32; 8] {
    let h = u128_to_words(hi);
    let l = u128_to_words(lo);
    [h[0], h[1], h[2], h[3], l[0], l[1], l[2], l[3]]
}

/// Decode an unsigned 256-bit word sequence into its decimal representation.
pub fn u256_from_words_decimal(words: [u32; 8]) -> String {
    let (hi, lo) = u256_from_words(words);
    u256_to_decimal(hi, lo)
}

/// Decode a signed 256-bit word sequence into its decimal representation.
///
/// Detects the sign bit in the most-significant word, takes the
/// two's-complement magnitude, and negates.
pub fn i256_from_words_decimal(words: [u32; 8]) -> String {
    let (hi, lo) = u256_from_words(words);
    if hi >> 127 == 1 {
        let (mag_hi, mag_lo) = twos_complement_negate(hi, lo);
        format!("-{}", u256_to_decimal(mag_hi, mag_lo))
    } else {
        u256_to_decimal(hi, lo)
    }
}

/// Encode a non-negative decimal string as unsigned 256-bit words.
pub fn u256_to_words_decimal(s: &str) -> Result<[u32; 8], CodecError> {
    let (hi, lo) = parse_u256_decimal(s).map_err(|reason| CodecError::InvalidNumber {
        kind: "u256",
        value: s.to_string(),
        reason,
    })?;
    Ok(u256_to_words(hi, lo))
}

/// Encode a decimal string (optionally negative) as signed 256-bit words.
pub fn i256_to_words_decimal(s: &str) -> Result<[u32; 8], CodecError> {
    let invalid = |reason: String| CodecError::InvalidNumber {
        kind: "i256",
        value: s.to_string(),
        reason,
    };

    let is_negative = s.starts_with('-');
    let abs_str = if is_negative { &s[1..] } else { s };
    let (abs_hi, abs_lo) = parse_u256_decimal(abs_str).map_err(invalid)?;

    if is_negative {
        // Magnitude at most 2^255.
        if abs_hi >> 127 == 1 && (abs_hi << 1 != 0 || abs_lo != 0) {
            return Err(CodecError::InvalidNumber {
                kind: "i256",
                value: s.to_string(),
                reason: "below i256 minimum".to_string(),
            });
        }
        let (hi, lo) = twos_complement_negate(abs_hi, abs_lo);
        Ok(u256_to_words(hi, lo))
    } else {
        // Sign bit must stay clear for a positive value.
        if abs_hi >> 127 == 1 {
            return Err(CodecError::InvalidNumber {
                kind: "i256",
                value: s.to_string(),
                reason: "above i256 maximum".to_string(),
            });
        }
        Ok(u256_to_words(abs_hi, abs_lo))
    }
}

/// Two's complement negation over a 256-bit `(hi, lo)` pair: NOT + 1.
pub fn twos_complement_negate(hi: u128, lo: u128) -> (u128, u128) {
    let (neg_lo, carry) = (!lo).overflowing_add(1);
    let neg_hi = (!hi).wrapping_add(if carry { 1 } else { 0 });
    (neg_hi, neg_lo)
}

// ---------------------------------------------------------------------------
// 256-bit decimal formatting and parsing
// ---------------------------------------------------------------------------

/// Format a 256-bit value `hi * 2^128 + lo` as a decimal string, by repeated
/// division by 10 over 64-bit limbs.
pub fn u256_to_decimal(hi: u128, lo: u128) -> String {
    if hi == 0 {
        return lo.to_string();
    }

    // Limbs in big-endian significance order.
    let mut limbs = [(hi >> 64) as u64, hi as u64, (lo >> 64) as u64, lo as u64];
    let mut digits: Vec<u8> = Vec::new();

    while limbs.iter().any(|&l| l != 0) {
        let mut rem: u64 = 0;
        for limb in limbs.iter_mut() {
            let cur = ((rem as u128) << 64) | *limb as u128;
            *limb = (cur / 10) as u64;
            rem = (cur % 10) as u64;
        }
        digits.push(b'0' + rem as u8);
    }

    digits.iter().rev().map(|&d| d as char).collect()
}

/// Parse a non-negative decimal string into `(hi, lo)` halves where the full
/// 256-bit value is `hi * 2^128 + lo`.
pub fn parse_u256_decimal(s: &str) -> Result<(u128, u128), String> {
    if s.is_empty() {
        return Err("empty string".to_string());
    }

    let mut hi: u128 = 0;
    let mut lo: u128 = 0;

    for ch in s.bytes() {
        if !ch.is_ascii_digit() {
            return Err(format!("invalid digit '{}'", ch as char));
        }
        let digit = (ch - b'0') as u128;

        // Multiply (hi, lo) by 10 with wide arithmetic, then add the digit.
        let (new_lo, carry) = wide_mul_add(lo, 10, digit);
        let new_hi = hi
            .checked_mul(10)
            .and_then(|h| h.checked_add(carry))
            .ok_or_else(|| "value out of u256 range".to_string())?;

        hi = new_hi;
        lo = new_lo;
    }

    Ok((hi, lo))
}

/// Compute `a * b + c` returning `(lo_128, carry_128)`.
/// The full result is `carry * 2^128 + lo`.
fn wide_mul_add(a: u128, b: u128, c: u128) -> (u128, u128) {
    // Split a into two 64-bit halves to avoid u128 overflow.
    let a_hi = a >> 64;
    let a_lo = a & 0xFFFF_FFFF_FFFF_FFFF;

    let prod_lo = a_lo * b;
    let prod_hi = a_hi * b;

    let (sum_lo, carry1) = prod_lo.overflowing_add(c);

    let sum_lo_hi = sum_lo >> 64;
    let sum_lo_lo = sum_lo & 0xFFFF_FFFF_FFFF_FFFF;

    let mid = prod_hi + sum_lo_hi + if carry1 { 1 } else { 0 };
    let result_lo = (mid << 64) | sum_lo_lo;
    let carry = mid >> 64;

    (result_lo, carry)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
