//! Output MultiSynth stage
//!
//! f OUT = f PLL / (a + b/c) / R
//!
//! MultiSynth 0-5 take an 18 bit integer plus a 20 bit fraction.
//! MultiSynth 6 and 7 only divide by an even 8 bit integer.
//! R is a power of two from 1 to 128, used when the MultiSynth output
//! would otherwise be below 1 MHz.

use log::debug;

use crate::{ config::*, errors::*, ratio::*, validate::output_window };


/// Planned output MultiSynth and R divider
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug,Copy,Clone,PartialEq)]
pub struct MultisynthPlan {
    pub ratio: RatioApproximation,
    /// R = 2^r_div_exponent
    pub r_div_exponent: u8,
    /// Output frequency the programmed dividers produce, Hz
    pub achieved_hz: f64,
    /// achieved - requested, Hz
    pub error_hz: f64,
}

impl MultisynthPlan {
    #[inline]
    pub fn r_divider(self: &Self) -> u32 {
        1 << self.r_div_exponent
    }
}

/// f OUT produced by `ratio` and `R = 2^r_div_exponent` from `pll_hz`
#[inline]
pub fn achieved_out_hz(pll_hz: f64, ratio: &RatioApproximation, r_div_exponent: u8) -> f64 {
    match ratio.mode() {
        Mode::Fractional => pll_hz / ratio.value() / (1u32 << r_div_exponent) as f64,
        Mode::Integer => pll_hz / ratio.integer as f64 / (1u32 << r_div_exponent) as f64,
    }
}

/// Smallest R divider exponent that lifts `out_hz` to the MultiSynth
/// minimum output frequency, capped at `r_div_stages`.
pub fn select_r_divider(out_hz: f64, limits: &HardwareLimits) -> u8 {
    let mut exponent = 0;
    if out_hz < limits.ms_out_freq_min {
        while exponent < limits.r_div_stages
            && out_hz * ((1u32 << exponent) as f64) < limits.ms_out_freq_min
        {
            exponent += 1;
        }
    }
    exponent
}

/// Rounds to the nearest even integer.
/// An odd integer is equally far from both even neighbours, the lower
/// one is taken.
pub fn round_to_even(x: &ExactRatio) -> u64 {
    let nearest = x.round_half_up();
    if nearest % 2 == 0 {
        return nearest;
    }

    let low = nearest - 1;
    let high = nearest + 1;
    // x - low <= high - x  <=>  x <= nearest
    if *x <= ExactRatio::from_int(nearest) { low } else { high }
}

/// Output MultiSynth and R divider for `out_hz` on `channel` fed by the
/// achieved PLL frequency `pll_hz`.
/// Expects a request that passed [`validate`](crate::validate::validate).
pub fn plan_multisynth(
    pll_hz: f64,
    out_hz: f64,
    channel: usize,
    limits: &HardwareLimits,
) -> Result<MultisynthPlan, Error> {
    let too_low = Error::OutputFrequencyTooLow { min_hz: output_window(pll_hz, channel, limits).min_hz };

    let pll = ExactRatio::from_f64(pll_hz)
        .ok_or(Error::InvalidPllFrequency { min_hz: limits.pll_freq_min, max_hz: limits.pll_freq_max })?;
    let out = ExactRatio::from_f64(out_hz).ok_or(too_low)?;
    let target = pll.checked_div(out).ok_or(too_low)?;

    let (ratio, r_div_exponent) = if limits.is_integer_only(channel) {
        plan_integer_only(target, limits)?
    } else {
        plan_general(target, out_hz, limits)?
    };

    let achieved_hz = achieved_out_hz(pll_hz, &ratio, r_div_exponent);
    debug!(
        "MS{} {} + {}/{} ({:?}) R={} => {} Hz",
        channel, ratio.integer, ratio.fraction, ratio.modulus, ratio.mode(),
        1u32 << r_div_exponent, achieved_hz
    );

    Ok(MultisynthPlan {
        ratio,
        r_div_exponent,
        achieved_hz,
        error_hz: achieved_hz - out_hz,
    })
}

/// `pll / out / R` as `a + b/c`, R chosen from the requested frequency.
/// A fraction of `m/m` is carried into the integer, so a ratio just
/// below 4 is programmed as the integer 4 and not as `3 + m/m`.
fn plan_general(
    pll_to_out: ExactRatio,
    out_hz: f64,
    limits: &HardwareLimits,
) -> Result<(RatioApproximation, u8), Error> {
    let r_div_exponent = select_r_divider(out_hz, limits);
    let mut target = pll_to_out;
    for _ in 0..r_div_exponent {
        target = target.halve();
    }

    let bits = limits.ms_integer_bits;
    let mut ratio = approximate(&target, bits, limits.ms_fractional_bits)?;
    if ratio.mode() == Mode::Fractional && ratio.fraction == ratio.modulus {
        let integer = ratio.integer as u64 + 1;
        if integer >> bits != 0 {
            return Err(Error::IntegerOverflow { integer, bits });
        }
        ratio = RatioApproximation { integer: integer as u32, fraction: 0, modulus: 0, error: ratio.error };
    }
    Ok((ratio, r_div_exponent))
}

/// Halve the ratio (doubling R) while it is at or above `2^bits - 1.5`,
/// then round to an even divider. Fractional mode is not available.
fn plan_integer_only(
    pll_to_out: ExactRatio,
    limits: &HardwareLimits,
) -> Result<(RatioApproximation, u8), Error> {
    let bits = limits.ms_integer_only_bits;
    let mut target = pll_to_out;
    let limit = ExactRatio::from_int((1u64 << (bits + 1)) - 3).halve();

    let mut r_div_exponent = 0;
    while r_div_exponent < limits.r_div_stages && target >= limit {
        target = target.halve();
        r_div_exponent += 1;
    }

    let divider = round_to_even(&target);
    if divider >> bits != 0 {
        return Err(Error::IntegerOverflow { integer: divider, bits });
    }

    let ratio = RatioApproximation {
        integer: divider as u32,
        fraction: 0,
        modulus: 0,
        error: libm::fabs(target.to_f64() - divider as f64),
    };
    Ok((ratio, r_div_exponent))
}


#[cfg(test)]
mod tests {
    use super::*;

    fn ratio(num: u64, den: u64) -> ExactRatio {
        ExactRatio::from_integers(num, den).unwrap()
    }

    #[test]
    fn even_rounding() {
        assert_eq!(round_to_even(&ratio(8, 1)), 8);
        assert_eq!(round_to_even(&ratio(9, 1)), 8); // tie
        assert_eq!(round_to_even(&ratio(91, 10)), 10);
        assert_eq!(round_to_even(&ratio(89, 10)), 8);
        assert_eq!(round_to_even(&ratio(17, 2)), 8); // 8.5 -> 9 odd, 8 closer
        assert_eq!(round_to_even(&ratio(19, 2)), 10); // 9.5 -> 10
        assert_eq!(round_to_even(&ratio(1021, 4)), 256); // 255.25
    }

    #[test]
    fn r_divider_selection() {
        assert_eq!(select_r_divider(1_000_000.0, &SI5351), 0);
        assert_eq!(select_r_divider(999_999.0, &SI5351), 1);
        assert_eq!(select_r_divider(500_000.0, &SI5351), 1);
        assert_eq!(select_r_divider(100_000.0, &SI5351), 4);
        assert_eq!(select_r_divider(7_813.0, &SI5351), 7);
        assert_eq!(select_r_divider(1_000.0, &SI5351), 7);
    }

    #[test]
    fn integer_only_halves_above_limit() {
        // 900 MHz / 1 MHz = 900 -> 450 -> 225
        let (r, e) = plan_integer_only(ExactRatio::from_int(900), &SI5351).unwrap();
        assert_eq!((r.integer, e), (224, 2));
        assert_eq!(r.error, 1.0);
    }

    #[test]
    fn integer_only_keeps_ratio_just_below_limit() {
        // 254.4 stays, rounds to 254
        let (r, e) = plan_integer_only(ratio(1272, 5), &SI5351).unwrap();
        assert_eq!((r.integer, e), (254, 0));

        // 254.5 is halved to 127.25
        let (r, e) = plan_integer_only(ratio(509, 2), &SI5351).unwrap();
        assert_eq!((r.integer, e), (128, 1));
        assert_eq!(r.error, 0.75);
    }

    #[test]
    fn full_fraction_carries_into_integer() {
        // 4 - 2^-40 rounds to 3 + 2/2
        let target = ratio((1 << 42) - 1, 1 << 40);
        let (r, e) = plan_general(target, 150e6, &SI5351).unwrap();
        assert_eq!((r.integer, r.fraction, r.modulus, e), (4, 0, 0, 0));
        assert_eq!(r.mode(), Mode::Integer);
        assert!(r.error > 0.0);
    }

    #[test]
    fn zero_output_reports_channel_minimum() {
        assert_eq!(
            plan_multisynth(900e6, 0.0, 0, &SI5351),
            Err(Error::OutputFrequencyTooLow { min_hz: 7_813.0 })
        );
        assert_eq!(
            plan_multisynth(900e6, 0.0, 6, &SI5351),
            Err(Error::OutputFrequencyTooLow { min_hz: 27_683.0 })
        );
    }
}
