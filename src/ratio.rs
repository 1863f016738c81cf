//! Exact ratios and the best fraction search
//!
//! Both synthesis stages program `a + b/c`. The search below picks `b/c`
//! by walking every modulus `c` and rounding `c * remainder` half up.
//! All arithmetic is done on exact rationals, so there is no floating
//! point rounding to second guess.

use core::cmp::Ordering;

use log::trace;

use crate::errors::*;


/// Widest numerator / denominator kept after reduction.
/// Keeps every product in the search below `u128::MAX`.
const WIDTH_LIMIT: u32 = 64;

/// Non-negative rational number `num / den`, `den > 0`, always reduced.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug,Copy,Clone,PartialEq,Eq)]
pub struct ExactRatio {
    num: u128,
    den: u128,
}

#[inline]
fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

#[inline]
fn width(x: u128) -> u32 {
    128 - x.leading_zeros()
}

impl ExactRatio {

    pub const ZERO: ExactRatio = ExactRatio { num: 0, den: 1 };

    /// Reduce by GCD, then drop low bits of both terms until they fit
    /// in 64 bits. The shift only ever happens for values far below
    /// `f64` resolution.
    fn reduced(num: u128, den: u128) -> Self {
        let g = gcd(num, den).max(1);
        let (mut num, mut den) = (num / g, den / g);

        let excess = width(num).max(width(den)).saturating_sub(WIDTH_LIMIT);
        if excess > 0 {
            num >>= excess;
            den = (den >> excess).max(1);
            let g = gcd(num, den).max(1);
            num /= g;
            den /= g;
        }
        ExactRatio { num, den }
    }

    #[inline]
    pub fn from_int(n: u64) -> Self {
        ExactRatio { num: n as u128, den: 1 }
    }

    /// `num / den`, `None` if `den` is 0
    pub fn from_integers(num: u64, den: u64) -> Option<Self> {
        if den == 0 {
            None
        } else {
            Some(Self::reduced(num as u128, den as u128))
        }
    }

    /// Exact value of a finite, non-negative `f64` below 2^64.
    pub fn from_f64(x: f64) -> Option<Self> {
        if !x.is_finite() || x < 0.0 {
            return None;
        }
        if x == 0.0 {
            return Some(Self::ZERO);
        }

        // x = mantissa * 2^exp
        let bits = x.to_bits();
        let biased = ((bits >> 52) & 0x7ff) as i32;
        let fraction = bits & ((1u64 << 52) - 1);
        let (mantissa, exp) = if biased == 0 {
            (fraction, -1074)
        } else {
            (fraction | (1u64 << 52), biased - 1075)
        };
        let tz = mantissa.trailing_zeros();
        let mantissa = (mantissa >> tz) as u128;
        let exp = exp + tz as i32;

        if exp >= 0 {
            if width(mantissa) as i32 + exp > WIDTH_LIMIT as i32 {
                None
            } else {
                Some(ExactRatio { num: mantissa << exp, den: 1 })
            }
        } else {
            let shift = (-exp) as u32;
            if shift > 127 {
                Some(Self::reduced(mantissa >> (shift - 127), 1 << 127))
            } else {
                Some(Self::reduced(mantissa, 1 << shift))
            }
        }
    }

    #[inline]
    pub fn numerator(self: &Self) -> u128 { self.num }

    #[inline]
    pub fn denominator(self: &Self) -> u128 { self.den }

    #[inline]
    pub fn is_zero(self: &Self) -> bool { self.num == 0 }

    /// `self / rhs`, `None` if `rhs` is zero
    pub fn checked_div(self: Self, rhs: Self) -> Option<Self> {
        if rhs.is_zero() {
            None
        } else {
            Some(Self::reduced(self.num * rhs.den, self.den * rhs.num))
        }
    }

    /// `self * k`
    pub fn mul_int(self: Self, k: u64) -> Self {
        Self::reduced(self.num * k as u128, self.den)
    }

    /// `self / 2`
    pub fn halve(self: Self) -> Self {
        Self::reduced(self.num, self.den * 2)
    }

    /// Integer part
    #[inline]
    pub fn floor(self: &Self) -> u64 {
        (self.num / self.den) as u64
    }

    /// Fractional part, in `[0, 1)`
    #[inline]
    pub fn fract(self: &Self) -> Self {
        ExactRatio { num: self.num % self.den, den: self.den }
    }

    /// `floor(self + 1/2)`
    #[inline]
    pub fn round_half_up(self: &Self) -> u64 {
        ((2 * self.num + self.den) / (2 * self.den)) as u64
    }

    #[inline]
    pub fn to_f64(self: &Self) -> f64 {
        self.num as f64 / self.den as f64
    }
}

impl PartialOrd for ExactRatio {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ExactRatio {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.num * other.den).cmp(&(other.num * self.den))
    }
}


/// Synthesis mode of a MultiSynth stage
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug,Copy,Clone,PartialEq,Eq)]
pub enum Mode {
    /// `a`
    Integer,
    /// `a + b/c`
    Fractional,
}

/// `integer + fraction / modulus` approximation of a target ratio.
/// `fraction` and `modulus` are 0 in integer mode.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug,Copy,Clone,PartialEq)]
pub struct RatioApproximation {
    pub integer: u32,
    pub fraction: u32,
    pub modulus: u32,
    /// `|target - approximation|`
    pub error: f64,
}

impl RatioApproximation {

    /// Pure integer ratio
    pub fn integer(integer: u32) -> Self {
        RatioApproximation { integer, fraction: 0, modulus: 0, error: 0.0 }
    }

    pub fn mode(self: &Self) -> Mode {
        if self.fraction > 0 && self.modulus > 0 {
            Mode::Fractional
        } else {
            Mode::Integer
        }
    }

    /// Programmed ratio, `a + b/c` or `a`
    pub fn value(self: &Self) -> f64 {
        match self.mode() {
            Mode::Fractional => self.integer as f64 + (self.fraction as f64 / self.modulus as f64),
            Mode::Integer => self.integer as f64,
        }
    }
}


/// Best `fraction / modulus` found for a remainder
#[derive(Debug,Copy,Clone,PartialEq,Eq)]
pub struct BestFraction {
    pub fraction: u32,
    pub modulus: u32,
    /// Exact error is `error_num / (modulus * remainder.denominator())`
    pub error_num: u128,
}

impl BestFraction {
    /// `|remainder - fraction / modulus|`
    pub fn error(self: &Self, remainder: &ExactRatio) -> f64 {
        self.error_num as f64 / (self.modulus as f64 * remainder.denominator() as f64)
    }
}

/// Walk every modulus in `2..=max_modulus` and keep the `n / m`
/// closest to `remainder`, with `n = floor(m * remainder + 1/2)`.
///
/// `n == 0` leaves only the integer part and is skipped. `n == m` is
/// kept, it encodes `a + 1` exactly. Only a strictly smaller error
/// replaces the current best, so the smallest modulus wins a tie.
/// Stops at the first exact match.
///
/// Returns `None` if no modulus yields a usable fraction.
pub fn best_fraction(remainder: &ExactRatio, max_modulus: u32) -> Option<BestFraction> {
    let p = remainder.num;
    let q = remainder.den;
    let mut best: Option<BestFraction> = None;

    for m in 2..=max_modulus {
        let m128 = m as u128;
        let n = (2 * m128 * p + q) / (2 * q);
        if n == 0 {
            continue;
        }

        let scaled = m128 * p;
        let target = n * q;
        let error_num = if scaled > target { scaled - target } else { target - scaled };

        // error_num / (m q) < best.error_num / (best.m q)
        let better = match best {
            None => true,
            Some(b) => error_num * (b.modulus as u128) < b.error_num * m128,
        };
        if better {
            trace!("best_fraction: {}/{} error_num={}", n, m, error_num);
            best = Some(BestFraction { fraction: n as u32, modulus: m, error_num });
            if error_num == 0 {
                break;
            }
        }
    }
    best
}

/// Approximate `target` as `a + b/c` with an `integer_bits` wide `a`
/// and `fractional_bits` wide `b` and `c`.
pub fn approximate(
    target: &ExactRatio,
    integer_bits: u8,
    fractional_bits: u8,
) -> Result<RatioApproximation, Error> {
    let integer = target.floor();
    if integer >> integer_bits != 0 {
        return Err(Error::IntegerOverflow { integer, bits: integer_bits });
    }
    let integer = integer as u32;

    let remainder = target.fract();
    if remainder.is_zero() {
        return Ok(RatioApproximation::integer(integer));
    }

    let max_modulus = ((1u64 << fractional_bits) - 1) as u32;
    match best_fraction(&remainder, max_modulus) {
        Some(best) => Ok(RatioApproximation {
            integer,
            fraction: best.fraction,
            modulus: best.modulus,
            error: best.error(&remainder),
        }),
        None => Ok(RatioApproximation {
            integer,
            fraction: 0,
            modulus: 0,
            error: remainder.to_f64(),
        }),
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn ratio(num: u64, den: u64) -> ExactRatio {
        ExactRatio::from_integers(num, den).unwrap()
    }

    #[test]
    fn from_f64_is_exact() {
        assert_eq!(ExactRatio::from_f64(900_000_000.0), Some(ratio(900_000_000, 1)));
        assert_eq!(ExactRatio::from_f64(0.375), Some(ratio(3, 8)));
        assert_eq!(ExactRatio::from_f64(0.0), Some(ExactRatio::ZERO));
        assert_eq!(ExactRatio::from_f64(-1.0), None);
        assert_eq!(ExactRatio::from_f64(f64::NAN), None);
        assert_eq!(ExactRatio::from_f64(f64::INFINITY), None);
        assert_eq!(ExactRatio::from_f64(1e30), None);
    }

    #[test]
    fn reduces_terms() {
        let r = ratio(875_000_000, 10_000_000);
        assert_eq!((r.numerator(), r.denominator()), (175, 2));
        assert_eq!(r.floor(), 87);
        assert_eq!(r.fract(), ratio(1, 2));
    }

    #[test]
    fn division_and_ordering() {
        let a = ExactRatio::from_f64(875e6).unwrap();
        let b = ExactRatio::from_f64(14e6).unwrap();
        assert_eq!(a.checked_div(b), Some(ratio(125, 2)));
        assert_eq!(a.checked_div(ExactRatio::ZERO), None);
        assert!(ratio(1, 3) < ratio(1, 2));
        assert_eq!(ratio(2, 4).cmp(&ratio(1, 2)), Ordering::Equal);
    }

    #[test]
    fn round_half_up() {
        assert_eq!(ratio(5, 2).round_half_up(), 3);
        assert_eq!(ratio(9, 4).round_half_up(), 2);
        assert_eq!(ratio(7, 2).round_half_up(), 4);
    }

    #[test]
    fn exact_fraction_stops_early() {
        let best = best_fraction(&ratio(3, 7), (1 << 20) - 1).unwrap();
        assert_eq!((best.fraction, best.modulus, best.error_num), (3, 7, 0));
    }

    #[test]
    fn tiny_remainder_falls_back_to_integer() {
        let a = approximate(&ratio((1 << 24) * 5 + 1, 1 << 24), 7, 4).unwrap();
        assert_eq!(a.mode(), Mode::Integer);
        assert_eq!(a.integer, 5);
        assert_eq!(a.error, 1.0 / (1u64 << 24) as f64);
    }

    #[test]
    fn remainder_close_to_one_rounds_up_to_full_modulus() {
        let a = approximate(&ratio(999_999, 1_000_000), 7, 4).unwrap();
        assert_eq!(a.mode(), Mode::Fractional);
        assert_eq!((a.integer, a.fraction, a.modulus), (0, 2, 2));
        assert!(a.error < 1.1e-6);
    }

    #[test]
    fn integer_overflow() {
        assert_eq!(
            approximate(&ratio(300, 1), 8, 20),
            Err(Error::IntegerOverflow { integer: 300, bits: 8 })
        );
    }
}
