///! Request validation
///! Hardware limits / channel / reference / PLL / output window

use log::debug;

use crate::{ config::*, errors::*, ratio::* };


/// Output frequencies a channel can reach, Hz, inclusive
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug,Copy,Clone,PartialEq)]
pub struct OutputWindow {
    pub min_hz: f64,
    pub max_hz: f64,
}

impl OutputWindow {
    #[inline]
    pub fn contains(self: &Self, hz: f64) -> bool {
        self.min_hz <= hz && hz <= self.max_hz
    }
}


/// Self consistency of the hardware limits
pub fn check_limits(limits: &HardwareLimits) -> Result<(), Error> {
    if limits.ms_integer_only_min % 2 != 0 {
        return Err(Error::OddIntegerOnlyMinimum { min: limits.ms_integer_only_min });
    }
    if limits.integer_only_channels.len() != limits.channel_count {
        return Err(Error::ChannelFlagMismatch {
            flags: limits.integer_only_channels.len(),
            channels: limits.channel_count,
        });
    }
    Ok(())
}

/// Output frequency window of `channel` for a given PLL frequency.
///
/// General channels: `ceil(MS_OUT_MIN / 2^R)` to `PLL / MS_INT_MIN`.
/// Integer only channels only divide by even numbers from the
/// minimum up to `2^bits - 2`, so the window is
/// `ceil(PLL / (2^bits - 2) / 2^R)` to `PLL / MS_INT_ONLY_MIN`.
/// Both maxima are capped at the absolute output maximum.
pub fn output_window(pll_hz: f64, channel: usize, limits: &HardwareLimits) -> OutputWindow {
    let r_max = limits.max_r_divider() as f64;

    let (min_hz, max_hz) = if limits.is_integer_only(channel) {
        let largest_even = ((1u64 << limits.ms_integer_only_bits) - 2) as f64;
        (
            libm::ceil(pll_hz / largest_even / r_max),
            pll_hz / limits.ms_integer_only_min as f64,
        )
    } else {
        (
            libm::ceil(limits.ms_out_freq_min / r_max),
            pll_hz / limits.ms_integer_min as f64,
        )
    };

    OutputWindow { min_hz, max_hz: max_hz.min(limits.out_freq_max) }
}

/// Checks a request against the hardware limits, first failure wins.
/// Returns the channel's output window.
pub fn validate(request: &PlanRequest, limits: &HardwareLimits) -> Result<OutputWindow, Error> {
    let res = validate_request(request, limits);
    if let Err(e) = res {
        debug!("rejected {:?}: {}", request, e);
    }
    res
}

fn validate_request(request: &PlanRequest, limits: &HardwareLimits) -> Result<OutputWindow, Error> {
    check_limits(limits)?;

    (if request.channel >= limits.channel_count {
        Err(Error::InvalidChannel { channel: request.channel, channel_count: limits.channel_count })
    } else { Ok(()) })?;

    let ref_range = limits.ref_freq_min ..= limits.ref_freq_max;
    let ref_err = Error::InvalidReferenceFrequency { min_hz: limits.ref_freq_min, max_hz: limits.ref_freq_max };
    (if !ref_range.contains(&request.ref_hz) { Err(ref_err) } else { Ok(()) })?;

    let pll_range = limits.pll_freq_min ..= limits.pll_freq_max;
    let pll_err = Error::InvalidPllFrequency { min_hz: limits.pll_freq_min, max_hz: limits.pll_freq_max };
    (if !pll_range.contains(&request.pll_hz) { Err(pll_err) } else { Ok(()) })?;

    (if request.pll_hz < request.ref_hz { Err(Error::PllBelowReference) } else { Ok(()) })?;

    check_pll_ratio(request, limits)?;

    let window = output_window(request.pll_hz, request.channel, limits);
    // negated so NaN is rejected too
    if !(request.out_hz <= window.max_hz) {
        return Err(Error::OutputFrequencyTooHigh { max_hz: window.max_hz });
    }
    if !(request.out_hz >= window.min_hz) {
        return Err(Error::OutputFrequencyTooLow { min_hz: window.min_hz });
    }

    Ok(window)
}

/// `PLL_INT_MIN <= pll / ref <= PLL_INT_MAX + (2^F - 2) / (2^F - 1)`,
/// compared exactly.
fn check_pll_ratio(request: &PlanRequest, limits: &HardwareLimits) -> Result<(), Error> {
    let pll_err = Error::InvalidPllFrequency { min_hz: limits.pll_freq_min, max_hz: limits.pll_freq_max };
    let ref_err = Error::InvalidReferenceFrequency { min_hz: limits.ref_freq_min, max_hz: limits.ref_freq_max };

    let pll = ExactRatio::from_f64(request.pll_hz).ok_or(pll_err)?;
    let refin = ExactRatio::from_f64(request.ref_hz).ok_or(ref_err)?;
    let ratio = pll.checked_div(refin).ok_or(ref_err)?;

    let m = HardwareLimits::max_modulus(limits.pll_fractional_bits) as u64;
    let max_ratio = ExactRatio::from_integers(limits.pll_integer_max as u64 * m + m - 1, m)
        .ok_or(pll_err)?;

    if ratio > max_ratio {
        return Err(Error::PllRatioTooHigh { max_ratio: limits.max_pll_ratio() });
    }
    if ratio.floor() < limits.pll_integer_min as u64 {
        return Err(Error::PllRatioTooLow { min_ratio: limits.pll_integer_min });
    }
    Ok(())
}
