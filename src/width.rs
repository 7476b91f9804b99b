//! The two numeric regimes (spec §3, §4.H, §9).
//!
//! Widths `<= 64` bits are packed into a plain `u64` and every operation on
//! them is branchless machine arithmetic. Widths `> 64` bits are limbed
//! big integers (`num_bigint::BigUint`), the crate's stand-in for the
//! "arbitrary-precision bit-vector arithmetic primitives" spec §1 places
//! out of scope. The two paths are kept syntactically separate end to end
//! (never unified behind one big-integer type, even for small widths) so
//! that the common case never pays for an allocation, this mirrors the
//! teacher's own `Cursor` read path in `src/bits.rs`, which always reads
//! through a fixed-size `u64` accumulator rather than a generic big-int.

use num_bigint::{BigInt, BigUint};
use num_bigint::Sign;

/// The crossover point between the two regimes (spec §3).
pub const SMALL_WIDTH_MAX: u32 = 64;

/// A single bit-vector value, width-dispatched (spec §9: `Width ∈
/// {Small(u64), Wide(limbs)}`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Width {
    Small(u64),
    Wide(BigUint),
}

impl Width {
    /// Whether `bits` uses the limbed regime.
    pub fn is_wide(bits: u32) -> bool {
        bits > SMALL_WIDTH_MAX
    }

    pub fn zero(bits: u32) -> Self {
        if Self::is_wide(bits) {
            Width::Wide(BigUint::from(0u32))
        } else {
            Width::Small(0)
        }
    }

    pub fn all_ones(bits: u32) -> Self {
        if Self::is_wide(bits) {
            Width::Wide(full_mask(bits))
        } else {
            Width::Small(mask_small(u64::MAX, bits))
        }
    }

    pub fn from_u64(bits: u32, value: u64) -> Self {
        if Self::is_wide(bits) {
            Width::Wide(BigUint::from(value))
        } else {
            Width::Small(mask_small(value, bits))
        }
    }

    pub fn from_wide(bits: u32, value: BigUint) -> Self {
        debug_assert!(Self::is_wide(bits));
        Width::Wide(mask_wide(&value, bits))
    }

    /// Normalize to exactly `bits` bits, masking off anything above (spec
    /// §3 invariants: "Any `CONST64` value is normalized... Any `CONST`
    /// limbed value is normalized").
    pub fn normalize(self, bits: u32) -> Self {
        match self {
            Width::Small(v) => Width::Small(mask_small(v, bits)),
            Width::Wide(v) => Width::Wide(mask_wide(&v, bits)),
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Width::Small(v) => *v == 0,
            Width::Wide(v) => v == &BigUint::from(0u32),
        }
    }

    pub fn is_all_ones(&self, bits: u32) -> bool {
        *self == Self::all_ones(bits)
    }

    /// Interpret as an unsigned `u64`, panicking if the value does not fit
    /// (only ever called on shift amounts and similar small quantities).
    pub fn low_u64(&self) -> u64 {
        match self {
            Width::Small(v) => *v,
            Width::Wide(v) => {
                let mut digits = v.to_u64_digits();
                digits.truncate(1);
                digits.first().copied().unwrap_or(0)
            }
        }
    }

    /// The sign bit's boolean value, given this value is `bits` wide.
    pub fn sign_bit(&self, bits: u32) -> bool {
        match self {
            Width::Small(v) => (*v >> (bits - 1)) & 1 == 1,
            Width::Wide(v) => v.bit((bits - 1) as u64),
        }
    }

    /// The signed two's-complement interpretation as a `BigInt`, always
    /// computed via the wide path so small- and large-width code share one
    /// comparison routine in `bounds.rs`/`diseq.rs`.
    pub fn to_signed(&self, bits: u32) -> BigInt {
        match self {
            Width::Small(v) => {
                if bits == 64 {
                    BigInt::from(*v as i64)
                } else if (*v >> (bits - 1)) & 1 == 1 {
                    BigInt::from(*v) - (BigInt::from(1u32) << bits)
                } else {
                    BigInt::from(*v)
                }
            }
            Width::Wide(v) => {
                if v.bit((bits - 1) as u64) {
                    BigInt::from(v.clone()) - (BigInt::from(1u32) << bits)
                } else {
                    BigInt::from(v.clone())
                }
            }
        }
    }

    /// Unsigned comparison (both values assumed already normalized to the
    /// same `bits`).
    pub fn ult(&self, other: &Width) -> bool {
        match (self, other) {
            (Width::Small(a), Width::Small(b)) => a < b,
            (Width::Wide(a), Width::Wide(b)) => a < b,
            _ => unreachable!("mixed-width comparison"),
        }
    }

    pub fn ule(&self, other: &Width) -> bool {
        self == other || self.ult(other)
    }

    pub fn slt(&self, other: &Width, bits: u32) -> bool {
        self.to_signed(bits) < other.to_signed(bits)
    }

    pub fn sle(&self, other: &Width, bits: u32) -> bool {
        self == other || self.slt(other, bits)
    }

    /// Flip a single bit, masking the result back to `bits` (used by the
    /// bound reasoner to build up bit-array bounds bit by bit).
    pub fn set_bit(&mut self, bits: u32, index: u32, value: bool) {
        match self {
            Width::Small(v) => {
                let bit = 1u64 << index;
                *v = if value { *v | bit } else { *v & !bit };
                *v = mask_small(*v, bits);
            }
            Width::Wide(v) => {
                let bit_mask = BigUint::from(1u32) << index;
                let has_bit = (&*v & &bit_mask) != BigUint::from(0u32);
                *v = if value {
                    if has_bit { v.clone() } else { &*v + &bit_mask }
                } else if has_bit {
                    &*v - &bit_mask
                } else {
                    v.clone()
                };
                *v = mask_wide(v, bits);
            }
        }
    }

    /// `-2^(bits-1)`, the most negative `bits`-wide signed value (sign bit
    /// set, everything else clear).
    pub fn signed_min(bits: u32) -> Self {
        let mut w = Width::zero(bits);
        w.set_bit(bits, bits - 1, true);
        w
    }

    /// `2^(bits-1) - 1`, the largest `bits`-wide signed value (all bits
    /// set except the sign bit).
    pub fn signed_max(bits: u32) -> Self {
        let mut w = Width::all_ones(bits);
        w.set_bit(bits, bits - 1, false);
        w
    }

    /// Read a single bit.
    pub fn bit(&self, index: u32) -> bool {
        match self {
            Width::Small(v) => (v >> index) & 1 == 1,
            Width::Wide(v) => v.bit(index as u64),
        }
    }
}

fn mask_small(v: u64, bits: u32) -> u64 {
    if bits >= 64 {
        v
    } else {
        v & ((1u64 << bits) - 1)
    }
}

fn full_mask(bits: u32) -> BigUint {
    (BigUint::from(1u32) << bits) - BigUint::from(1u32)
}

fn mask_wide(v: &BigUint, bits: u32) -> BigUint {
    v & full_mask(bits)
}

/// Wrap a (possibly negative) `BigInt` back into the unsigned `bits`-wide
/// representation (two's complement).
fn wrap_signed(v: BigInt, bits: u32) -> BigUint {
    let m = BigInt::from(1u32) << bits;
    let mut r = v % &m;
    if r.sign() == Sign::Minus {
        r += m;
    }
    r.to_biguint().expect("non-negative after wrap")
}

/// Constant folding arithmetic, shared by `simplify.rs`. All functions
/// assume both operands are already normalized to `bits` bits and return a
/// result normalized to `bits` bits.
pub mod arith {
    use super::*;

    pub fn add(bits: u32, a: &Width, b: &Width) -> Width {
        match (a, b) {
            (Width::Small(x), Width::Small(y)) => Width::Small(mask_small(x.wrapping_add(*y), bits)),
            (Width::Wide(x), Width::Wide(y)) => Width::Wide(mask_wide(&(x + y), bits)),
            _ => unreachable!("mixed-width arithmetic"),
        }
    }

    pub fn sub(bits: u32, a: &Width, b: &Width) -> Width {
        match (a, b) {
            (Width::Small(x), Width::Small(y)) => Width::Small(mask_small(x.wrapping_sub(*y), bits)),
            (Width::Wide(x), Width::Wide(y)) => {
                let r = BigInt::from(x.clone()) - BigInt::from(y.clone());
                Width::Wide(wrap_signed(r, bits))
            }
            _ => unreachable!("mixed-width arithmetic"),
        }
    }

    pub fn mul(bits: u32, a: &Width, b: &Width) -> Width {
        match (a, b) {
            (Width::Small(x), Width::Small(y)) => Width::Small(mask_small(x.wrapping_mul(*y), bits)),
            (Width::Wide(x), Width::Wide(y)) => Width::Wide(mask_wide(&(x * y), bits)),
            _ => unreachable!("mixed-width arithmetic"),
        }
    }

    pub fn neg(bits: u32, a: &Width) -> Width {
        sub(bits, &Width::zero(bits), a)
    }

    /// `bvudiv`: division by zero rounds to all-ones (SMT-LIB convention,
    /// preserved from the arithmetic primitives per spec §4.H.2).
    pub fn udiv(bits: u32, a: &Width, b: &Width) -> Width {
        if b.is_zero() {
            return Width::all_ones(bits);
        }
        match (a, b) {
            (Width::Small(x), Width::Small(y)) => Width::Small(x / y),
            (Width::Wide(x), Width::Wide(y)) => Width::Wide(x / y),
            _ => unreachable!("mixed-width arithmetic"),
        }
    }

    /// `bvurem`: remainder by zero passes the dividend through unchanged.
    pub fn urem(bits: u32, a: &Width, b: &Width) -> Width {
        if b.is_zero() {
            return a.clone();
        }
        match (a, b) {
            (Width::Small(x), Width::Small(y)) => Width::Small(x % y),
            (Width::Wide(x), Width::Wide(y)) => Width::Wide(x % y),
            _ => unreachable!("mixed-width arithmetic"),
        }
        .normalize(bits)
    }

    /// `bvsdiv`: division by zero yields 1 if the dividend is (signed)
    /// negative, else all-ones.
    pub fn sdiv(bits: u32, a: &Width, b: &Width) -> Width {
        if b.is_zero() {
            return if a.sign_bit(bits) {
                Width::from_u64(bits, 1)
            } else {
                Width::all_ones(bits)
            };
        }
        let sa = a.to_signed(bits);
        let sb = b.to_signed(bits);
        let q = sa / sb;
        Width::Wide(wrap_signed(q, bits)).normalize(bits).shrink(bits)
    }

    /// `bvsrem`: remainder takes the sign of the dividend; by zero passes
    /// the dividend through unchanged.
    pub fn srem(bits: u32, a: &Width, b: &Width) -> Width {
        if b.is_zero() {
            return a.clone();
        }
        let sa = a.to_signed(bits);
        let sb = b.to_signed(bits);
        let r = sa.clone() - sb.clone() * (sa / sb);
        Width::Wide(wrap_signed(r, bits)).normalize(bits).shrink(bits)
    }

    /// `bvsmod`: remainder takes the sign of the divisor (Euclidean-ish
    /// modulo); by zero passes the dividend through unchanged.
    pub fn smod(bits: u32, a: &Width, b: &Width) -> Width {
        if b.is_zero() {
            return a.clone();
        }
        let sa = a.to_signed(bits);
        let sb = b.to_signed(bits);
        let mut r = sa.clone() - sb.clone() * (sa.clone() / sb.clone());
        if r != BigInt::from(0u32) && (r.sign() == Sign::Minus) != (sb.sign() == Sign::Minus) {
            r += sb;
        }
        Width::Wide(wrap_signed(r, bits)).normalize(bits).shrink(bits)
    }

    pub fn shl(bits: u32, a: &Width, shift: &Width) -> Width {
        let s = shift.low_u64();
        if s >= bits as u64 {
            return Width::zero(bits);
        }
        match a {
            Width::Small(x) => Width::Small(mask_small(x.wrapping_shl(s as u32), bits)),
            Width::Wide(x) => Width::Wide(mask_wide(&(x << s as u32), bits)),
        }
    }

    pub fn lshr(bits: u32, a: &Width, shift: &Width) -> Width {
        let s = shift.low_u64();
        if s >= bits as u64 {
            return Width::zero(bits);
        }
        match a {
            Width::Small(x) => Width::Small(x >> s as u32),
            Width::Wide(x) => Width::Wide(x >> s as u32),
        }
    }

    pub fn ashr(bits: u32, a: &Width, shift: &Width) -> Width {
        let s = shift.low_u64();
        let all_ones = a.sign_bit(bits);
        if s >= bits as u64 {
            return if all_ones { Width::all_ones(bits) } else { Width::zero(bits) };
        }
        let sa = a.to_signed(bits);
        let r = sa >> s as u32;
        Width::Wide(wrap_signed(r, bits)).normalize(bits).shrink(bits)
    }

    impl Width {
        /// Collapse a `Wide` result back to `Small` when `bits <= 64`; the
        /// signed helpers above always route through `BigInt` for a single
        /// shared implementation, so this undoes that for the common case.
        pub(super) fn shrink(self, bits: u32) -> Width {
            if Width::is_wide(bits) {
                self
            } else {
                match self {
                    Width::Small(v) => Width::Small(v),
                    Width::Wide(v) => Width::Small(mask_small(v.to_u64_digits().first().copied().unwrap_or(0), bits)),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_above_width() {
        assert_eq!(Width::from_u64(8, 0x1FF), Width::Small(0xFF));
    }

    #[test]
    fn udiv_by_zero_is_all_ones() {
        let x = Width::from_u64(8, 5);
        let z = Width::zero(8);
        assert_eq!(arith::udiv(8, &x, &z), Width::all_ones(8));
    }

    #[test]
    fn urem_by_zero_is_passthrough() {
        let x = Width::from_u64(8, 5);
        let z = Width::zero(8);
        assert_eq!(arith::urem(8, &x, &z), x);
    }

    #[test]
    fn ashr_all_ones_is_fixed_point() {
        let x = Width::all_ones(8);
        let y = Width::from_u64(8, 3);
        assert_eq!(arith::ashr(8, &x, &y), x);
    }

    #[test]
    fn wide_roundtrip() {
        let big = BigUint::from(1u32) << 100;
        let w = Width::from_wide(128, big.clone());
        assert_eq!(w, Width::Wide(big));
    }

    #[test]
    fn signed_interpretation_small() {
        // 8-bit 0xFF is -1 signed.
        let v = Width::from_u64(8, 0xFF);
        assert_eq!(v.to_signed(8), BigInt::from(-1));
    }
}
