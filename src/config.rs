///! Hardware limits and plan request configuration

use crate::constants::*;


/// Device limits the planner has to observe.
///
/// The Si5351 values live in [`SI5351`]; sibling parts with different
/// frequency ranges or field widths only need another instance.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug,Copy,Clone,PartialEq)]
pub struct HardwareLimits {
    /// Reference frequency range, Hz
    pub ref_freq_min: f64,
    pub ref_freq_max: f64,

    /// Absolute output frequency maximum, Hz
    pub out_freq_max: f64,

    /// PLL (VCO) frequency range, Hz
    pub pll_freq_min: f64,
    pub pll_freq_max: f64,

    /// Feedback MultiSynth field widths
    pub pll_integer_bits: u8,
    pub pll_fractional_bits: u8,

    /// Feedback MultiSynth integer range
    pub pll_integer_min: u32,
    pub pll_integer_max: u32,

    /// Output MultiSynth field widths on general channels
    pub ms_integer_bits: u8,
    pub ms_fractional_bits: u8,

    /// Integer field width on integer only channels
    pub ms_integer_only_bits: u8,

    /// Smallest even divider on integer only channels
    pub ms_integer_only_min: u32,

    /// Output MultiSynth integer range on general channels
    pub ms_integer_min: u32,
    pub ms_integer_max: u32,

    /// Number of R divider doublings available
    pub r_div_stages: u8,

    /// Minimum MultiSynth output frequency before the R divider, Hz
    pub ms_out_freq_min: f64,

    /// Number of output channels
    pub channel_count: usize,

    /// Integer only flag for each channel, must hold `channel_count` entries
    pub integer_only_channels: &'static [bool],
}

/// Si5351 A/B/C limits
pub const SI5351: HardwareLimits = HardwareLimits {
    ref_freq_min: REF_FREQ_MIN,
    ref_freq_max: REF_FREQ_MAX,
    out_freq_max: OUT_FREQ_MAX,
    pll_freq_min: PLL_FREQ_MIN,
    pll_freq_max: PLL_FREQ_MAX,
    pll_integer_bits: PLL_INTEGER_BITS,
    pll_fractional_bits: PLL_FRACTIONAL_BITS,
    pll_integer_min: PLL_INTEGER_MIN,
    pll_integer_max: PLL_INTEGER_MAX,
    ms_integer_bits: MS_INTEGER_BITS,
    ms_fractional_bits: MS_FRACTIONAL_BITS,
    ms_integer_only_bits: MS_INTEGER_ONLY_BITS,
    ms_integer_only_min: MS_INTEGER_ONLY_MIN,
    ms_integer_min: MS_INTEGER_MIN,
    ms_integer_max: MS_INTEGER_MAX,
    r_div_stages: R_DIV_STAGES,
    ms_out_freq_min: MS_OUT_FREQ_MIN,
    channel_count: CHANNEL_COUNT,
    integer_only_channels: &INTEGER_ONLY_CHANNELS,
};

impl Default for HardwareLimits {
    fn default() -> Self { SI5351 }
}

impl HardwareLimits {

    /// Largest modulus (and fraction) a field of `bits` can hold
    #[inline]
    pub fn max_modulus(bits: u8) -> u32 {
        ((1u64 << bits) - 1) as u32
    }

    /// Largest PLL/reference ratio the feedback MultiSynth can produce:
    /// `INT_MAX + (2^F - 2) / (2^F - 1)`
    pub fn max_pll_ratio(self: &Self) -> f64 {
        let m = Self::max_modulus(self.pll_fractional_bits) as f64;
        self.pll_integer_max as f64 + (m - 1.0) / m
    }

    /// Largest R divider, `2^r_div_stages`
    #[inline]
    pub fn max_r_divider(self: &Self) -> u32 {
        1 << self.r_div_stages
    }

    /// True if the channel's MultiSynth only takes even integers.
    /// Out of range channels read as general channels.
    #[inline]
    pub fn is_integer_only(self: &Self, channel: usize) -> bool {
        self.integer_only_channels.get(channel).copied().unwrap_or(false)
    }
}


/// Single channel planning request, all frequencies in Hz
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug,Copy,Clone,PartialEq)]
pub struct PlanRequest {
    /// Desired CLKx output frequency
    pub out_hz: f64,
    /// Desired PLL (VCO) frequency
    pub pll_hz: f64,
    /// Reference (XTAL / CLKIN) frequency
    pub ref_hz: f64,
    /// Output channel, 0-7
    pub channel: usize,
}

impl PlanRequest {

    /// New request for `out_hz` on channel 0 with a 900 MHz PLL
    /// and a 10 MHz reference.
    pub fn new(out_hz: f64) -> Self {
        PlanRequest {
            out_hz,
            pll_hz: DEFAULT_PLL_FREQ,
            ref_hz: DEFAULT_REF_FREQ,
            channel: 0,
        }
    }

    #[inline]
    pub fn pll_hz(mut self: Self, pll_hz: f64) -> Self {
        self.pll_hz = pll_hz;
        self
    }

    #[inline]
    pub fn ref_hz(mut self: Self, ref_hz: f64) -> Self {
        self.ref_hz = ref_hz;
        self
    }

    #[inline]
    pub fn channel(mut self: Self, channel: usize) -> Self {
        self.channel = channel;
        self
    }
}
