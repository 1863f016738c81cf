//! PLL (feedback MultiSynth) stage
//!
//! f PLL = f REF × (a + b/c)
//!
//! `a` is the 7 bit feedback integer, `b/c` uses 20 bit fraction and
//! modulus fields.

use log::debug;

use crate::{ config::*, errors::*, ratio::* };


/// Planned feedback MultiSynth
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug,Copy,Clone,PartialEq)]
pub struct PllPlan {
    pub ratio: RatioApproximation,
    /// PLL frequency the programmed ratio produces, Hz
    pub achieved_hz: f64,
    /// requested - achieved, Hz
    pub error_hz: f64,
}

/// f PLL produced by `ratio` from `ref_hz`
#[inline]
pub fn achieved_pll_hz(ref_hz: f64, ratio: &RatioApproximation) -> f64 {
    ref_hz * ratio.value()
}

/// Best feedback ratio for `pll_hz` from `ref_hz`.
/// Expects a request that passed [`validate`](crate::validate::validate).
pub fn plan_pll(pll_hz: f64, ref_hz: f64, limits: &HardwareLimits) -> Result<PllPlan, Error> {
    let pll_err = Error::InvalidPllFrequency { min_hz: limits.pll_freq_min, max_hz: limits.pll_freq_max };
    let ref_err = Error::InvalidReferenceFrequency { min_hz: limits.ref_freq_min, max_hz: limits.ref_freq_max };

    let target = ExactRatio::from_f64(pll_hz).ok_or(pll_err)?
        .checked_div(ExactRatio::from_f64(ref_hz).ok_or(ref_err)?)
        .ok_or(ref_err)?;

    let ratio = approximate(&target, limits.pll_integer_bits, limits.pll_fractional_bits)?;
    let achieved_hz = achieved_pll_hz(ref_hz, &ratio);

    debug!(
        "PLL {} + {}/{} ({:?}) => {} Hz",
        ratio.integer, ratio.fraction, ratio.modulus, ratio.mode(), achieved_hz
    );

    Ok(PllPlan {
        ratio,
        achieved_hz,
        error_hz: pll_hz - achieved_hz,
    })
}
