//! BF16 (Brain Float 16) codec for the multiply-accumulate test harness.
//!
//! BF16 keeps the upper half of an IEEE-754 single:
//! - 1 sign bit
//! - 8 exponent bits (same range as F32)
//! - 7 mantissa bits (reduced precision)
//!
//! **IMPORTANT:** the hardware under test truncates, so this codec truncates.
//! No round-to-nearest is performed on the way down.
//!
//! # Conversion Strategy
//!
//! - F32 → BF16: keep the top 16 bits, drop the low 16 mantissa bits
//! - BF16 → F32: zero-extend the mantissa (lossless bit operation)
//!
//! Every 32-bit pattern is accepted, NaN and infinities included.
//!
//! # Example
//!
//! ```rust
//! use lmul_harness::bf16::{decode, encode, Bf16};
//!
//! assert_eq!(encode(1.0), Bf16::from_bits(0x3F80));
//! assert_eq!(decode(encode(-1.0)), -1.0);
//!
//! // 1.0 + 2^-8 is not representable; the extra bits are dropped.
//! let x = f32::from_bits(0x3F80_8000);
//! assert_eq!(decode(encode(x)), 1.0);
//! ```

use std::fmt;

/// BF16 (Brain Float 16) value.
///
/// Always equal to `f32::to_bits(x) >> 16` for the float it was made from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct Bf16(u16);

impl Bf16 {
    /// Positive zero.
    pub const ZERO: Bf16 = Bf16(0x0000);
    /// One.
    pub const ONE: Bf16 = Bf16(0x3F80);

    /// Create a BF16 from raw bits.
    ///
    /// # Example
    ///
    /// ```rust
    /// use lmul_harness::bf16::Bf16;
    ///
    /// let bf16 = Bf16::from_bits(0x3F80); // 1.0 in BF16
    /// assert_eq!(f32::from(bf16), 1.0f32);
    /// ```
    pub const fn from_bits(bits: u16) -> Self {
        Bf16(bits)
    }

    /// Raw 16-bit pattern.
    pub const fn to_bits(self) -> u16 {
        self.0
    }

    /// Truncate an F32 to BF16. Same as [`encode`].
    pub fn from_f32(value: f32) -> Self {
        Bf16((value.to_bits() >> 16) as u16)
    }

    /// Widen back to F32 by padding the low 16 bits with zeros.
    pub fn to_f32(self) -> f32 {
        f32::from_bits((self.0 as u32) << 16)
    }

    /// Big-endian byte pair, as stored in tensor files.
    pub const fn to_be_bytes(self) -> [u8; 2] {
        self.0.to_be_bytes()
    }

    /// Rebuild from a big-endian byte pair.
    pub const fn from_be_bytes(bytes: [u8; 2]) -> Self {
        Bf16(u16::from_be_bytes(bytes))
    }

    /// Parse the 4-digit hex form printed by the harness (`"3F80"`, `"bf80"`).
    ///
    /// Exactly four hexadecimal digits are accepted, in either case. On
    /// failure the returned string says what was wrong with the field.
    pub fn from_hex(text: &str) -> std::result::Result<Self, String> {
        if text.len() != 4 {
            return Err(format!(
                "expected 4 hex digits, got {} characters",
                text.chars().count()
            ));
        }
        if !text.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(format!("'{}' is not a hexadecimal value", text));
        }
        u16::from_str_radix(text, 16)
            .map(Bf16)
            .map_err(|e| format!("'{}' is not a 16-bit hex value: {}", text, e))
    }

    /// Whether the pattern encodes a NaN.
    pub const fn is_nan(self) -> bool {
        (self.0 & 0x7F80) == 0x7F80 && (self.0 & 0x007F) != 0
    }

    /// Convert a slice of BF16 values to F32.
    ///
    /// # Example
    ///
    /// ```rust
    /// use lmul_harness::bf16::Bf16;
    ///
    /// let bits = vec![Bf16::from(1.0f32), Bf16::from(2.0f32)];
    /// assert_eq!(Bf16::to_f32_slice(&bits), vec![1.0f32, 2.0f32]);
    /// ```
    pub fn to_f32_slice(src: &[Bf16]) -> Vec<f32> {
        src.iter().map(|&bf16| f32::from(bf16)).collect()
    }

    /// Convert a slice of F32 values to BF16 by truncation.
    pub fn from_f32_slice(src: &[f32]) -> Vec<Bf16> {
        src.iter().map(|&f| Bf16::from(f)).collect()
    }
}

/// Truncate an F32 to BF16: reinterpret as `u32`, shift right by 16.
///
/// ```rust
/// use lmul_harness::bf16::encode;
///
/// assert_eq!(encode(f32::INFINITY).to_bits(), 0x7F80);
/// ```
#[inline]
pub fn encode(value: f32) -> Bf16 {
    Bf16::from_f32(value)
}

/// Widen a BF16 to F32: shift left by 16, reinterpret as IEEE-754.
///
/// `decode(encode(x)) == x` only when the low 16 bits of `x` are already zero.
#[inline]
pub fn decode(value: Bf16) -> f32 {
    value.to_f32()
}

/// Truncating conversion (no rounding).
///
/// # Special cases
///
/// - ±0.0 → ±0.0
/// - ±Infinity → ±Infinity
/// - NaN → NaN only while a payload bit survives in the top 7 mantissa bits;
///   a NaN whose payload lives entirely in the low 16 bits becomes infinity
impl From<f32> for Bf16 {
    fn from(val: f32) -> Self {
        Bf16::from_f32(val)
    }
}

impl From<Bf16> for f32 {
    fn from(val: Bf16) -> Self {
        val.to_f32()
    }
}

impl From<u16> for Bf16 {
    fn from(bits: u16) -> Self {
        Bf16(bits)
    }
}

impl From<Bf16> for u16 {
    fn from(val: Bf16) -> Self {
        val.0
    }
}

/// Display BF16 as its F32 representation.
impl fmt::Display for Bf16 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.to_f32(), f)
    }
}

impl fmt::LowerHex for Bf16 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04x}", self.0)
    }
}

impl fmt::UpperHex for Bf16 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04X}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_encodings() {
        assert_eq!(encode(0.0).to_bits(), 0x0000);
        assert_eq!(encode(1.0).to_bits(), 0x3F80);
        assert_eq!(encode(-1.0).to_bits(), 0xBF80);
        assert_eq!(encode(f32::INFINITY).to_bits(), 0x7F80);
        assert_eq!(encode(f32::NEG_INFINITY).to_bits(), 0xFF80);
        assert_eq!(encode(2.0).to_bits(), 0x4000);
    }

    #[test]
    fn test_negative_zero() {
        let bf16 = encode(-0.0);
        assert_eq!(bf16.to_bits(), 0x8000);
        let recovered = decode(bf16);
        assert_eq!(recovered, 0.0f32);
        // Sign bit survives
        assert_eq!(recovered.to_bits(), 0x8000_0000);
    }

    #[test]
    fn test_truncates_instead_of_rounding() {
        // Exactly halfway: round-to-nearest-even would stay, round-half-up would bump
        assert_eq!(encode(f32::from_bits(0x3F80_8000)).to_bits(), 0x3F80);
        // Just below the next bf16 value: rounding would give 0x3F81
        assert_eq!(encode(f32::from_bits(0x3F80_FFFF)).to_bits(), 0x3F80);
        // Negative values truncate toward zero in magnitude
        assert_eq!(encode(f32::from_bits(0xBF80_FFFF)).to_bits(), 0xBF80);
    }

    #[test]
    fn test_pi_loses_low_bits() {
        let pi = std::f32::consts::PI; // 0x40490FDB
        let bf16 = encode(pi);
        assert_eq!(bf16.to_bits(), 0x4049);
        assert_eq!(decode(bf16).to_bits(), 0x4049_0000);
        assert!(decode(bf16) < pi);
    }

    #[test]
    fn test_infinity() {
        assert_eq!(decode(encode(f32::INFINITY)), f32::INFINITY);
        assert_eq!(decode(encode(f32::NEG_INFINITY)), f32::NEG_INFINITY);
    }

    #[test]
    fn test_nan() {
        let bf16 = encode(f32::NAN);
        assert!(bf16.is_nan());
        assert!(decode(bf16).is_nan());
    }

    #[test]
    fn test_nan_with_low_payload_only() {
        // Payload entirely in the discarded half: the pattern becomes infinity
        let nan = f32::from_bits(0x7F80_0001);
        assert!(nan.is_nan());
        let bf16 = encode(nan);
        assert_eq!(bf16.to_bits(), 0x7F80);
        assert!(!bf16.is_nan());
        assert_eq!(decode(bf16), f32::INFINITY);
    }

    #[test]
    fn test_subnormal_passes_through_truncated() {
        let subnormal = f32::from_bits(0x0000_0001);
        assert_eq!(encode(subnormal).to_bits(), 0x0000);

        let larger_subnormal = f32::from_bits(0x0040_1234);
        assert_eq!(encode(larger_subnormal).to_bits(), 0x0040);
        assert_eq!(decode(encode(larger_subnormal)).to_bits(), 0x0040_0000);
    }

    #[test]
    fn test_round_trip_on_representable_values() {
        for bits in [0x3F80u16, 0x4000, 0xC2F6, 0x0001, 0x7F7F, 0x8080] {
            let x = f32::from_bits((bits as u32) << 16);
            assert_eq!(decode(encode(x)).to_bits(), x.to_bits());
        }
    }

    #[test]
    fn test_encode_is_idempotent_after_round_trip() {
        let samples = [0.1f32, -3.75e-3, 1234.5678, 1e-40, f32::MAX, f32::MIN_POSITIVE];
        for &x in &samples {
            let once = encode(x);
            assert_eq!(encode(decode(once)), once, "x = {}", x);
        }
    }

    #[test]
    fn test_typical_pixel_values() {
        // MNIST intensities are k/255
        for k in 0..=255u32 {
            let val = k as f32 / 255.0;
            let recovered = decode(encode(val));
            assert!(recovered <= val);
            assert!(val - recovered <= val * 2f32.powi(-7));
        }
    }

    #[test]
    fn test_from_hex() {
        assert_eq!(Bf16::from_hex("3F80").unwrap(), Bf16::ONE);
        assert_eq!(Bf16::from_hex("bf80").unwrap().to_bits(), 0xBF80);
        assert_eq!(Bf16::from_hex("0000").unwrap(), Bf16::ZERO);
    }

    #[test]
    fn test_from_hex_rejects_bad_fields() {
        assert!(Bf16::from_hex("ZZZZ").is_err());
        assert!(Bf16::from_hex("3F8").is_err());
        assert!(Bf16::from_hex("13F80").is_err());
        assert!(Bf16::from_hex("").is_err());
        assert!(Bf16::from_hex("+3F8").is_err());
        assert!(Bf16::from_hex("0x3F").is_err());
    }

    #[test]
    fn test_hex_formatting() {
        let bf16 = Bf16::from_bits(0x00ab);
        assert_eq!(format!("{:x}", bf16), "00ab");
        assert_eq!(format!("{:X}", bf16), "00AB");
    }

    #[test]
    fn test_be_bytes() {
        assert_eq!(Bf16::ONE.to_be_bytes(), [0x3F, 0x80]);
        assert_eq!(Bf16::from_be_bytes([0xBF, 0x80]).to_bits(), 0xBF80);
    }

    #[test]
    fn test_batch_conversion() {
        let f32_data = vec![1.0f32, 2.0, 0.5, -4.0];
        let bf16_data = Bf16::from_f32_slice(&f32_data);
        assert_eq!(bf16_data.len(), 4);
        assert_eq!(Bf16::to_f32_slice(&bf16_data), f32_data);
    }

    #[test]
    fn test_empty_slice() {
        assert!(Bf16::to_f32_slice(&[]).is_empty());
        assert!(Bf16::from_f32_slice(&[]).is_empty());
    }

    #[test]
    fn test_default() {
        assert_eq!(Bf16::default(), Bf16::ZERO);
        assert_eq!(f32::from(Bf16::default()), 0.0f32);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Bf16::from_bits(0x4000)), "2");
        assert_eq!(format!("{}", encode(-0.5)), "-0.5");
    }
}
