///! Errors

use core::fmt;


/// Reasons a plan request is rejected.
///
/// Each variant carries the bound that was violated so the
/// [`Display`](fmt::Display) text can state it.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug,Copy,Clone,PartialEq)]
pub enum Error {
    /// Hardware limits list an odd minimum divider for integer only channels
    OddIntegerOnlyMinimum { min: u32 },

    /// Hardware limits have a per-channel flag list of the wrong size
    ChannelFlagMismatch { flags: usize, channels: usize },

    /// Channel index is not below the channel count
    InvalidChannel { channel: usize, channel_count: usize },

    InvalidReferenceFrequency { min_hz: f64, max_hz: f64 },

    InvalidPllFrequency { min_hz: f64, max_hz: f64 },

    /// PLL frequency is below the reference frequency
    PllBelowReference,

    /// PLL/reference ratio is above what the feedback MultiSynth can reach
    PllRatioTooHigh { max_ratio: f64 },

    /// PLL/reference ratio is below the smallest feedback integer
    PllRatioTooLow { min_ratio: u32 },

    /// Output frequency is above the channel maximum
    OutputFrequencyTooHigh { max_hz: f64 },

    /// Output frequency is below the channel minimum
    OutputFrequencyTooLow { min_hz: f64 },

    /// Integer part does not fit its register field
    IntegerOverflow { integer: u64, bits: u8 },
}

impl Error {

    /// True for errors caused by inconsistent [`HardwareLimits`](crate::config::HardwareLimits)
    /// rather than by the request.
    pub fn is_configuration_defect(self: &Self) -> bool {
        match self {
            Error::OddIntegerOnlyMinimum { .. } | Error::ChannelFlagMismatch { .. } => true,
            _ => false,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Error::OddIntegerOnlyMinimum { min } =>
                write!(f, "Integer only MultiSynth minimum divider {} is not even", min),
            Error::ChannelFlagMismatch { flags, channels } =>
                write!(f, "Channel count {} and integer only channel list size {} mismatch", channels, flags),
            Error::InvalidChannel { channel_count, .. } =>
                write!(f, "Channel is not within 0-{}", channel_count.saturating_sub(1)),
            Error::InvalidReferenceFrequency { min_hz, max_hz } =>
                write!(f, "Reference frequency is not within {}-{} MHz", min_hz / 1e6, max_hz / 1e6),
            Error::InvalidPllFrequency { min_hz, max_hz } =>
                write!(f, "PLL frequency is not within {}-{} MHz", min_hz / 1e6, max_hz / 1e6),
            Error::PllBelowReference =>
                write!(f, "PLL frequency is lower than reference frequency"),
            Error::PllRatioTooHigh { max_ratio } =>
                write!(f, "PLL/Reference frequency ratio is greater than {}", max_ratio),
            Error::PllRatioTooLow { min_ratio } =>
                write!(f, "PLL/Reference frequency ratio is less than {}", min_ratio),
            Error::OutputFrequencyTooHigh { max_hz } =>
                write!(f, "Output frequency exceeds {} MHz for this channel and PLL frequency", max_hz / 1e6),
            Error::OutputFrequencyTooLow { min_hz } =>
                write!(f, "Output frequency is less than {} Hz for this channel and PLL frequency", min_hz),
            Error::IntegerOverflow { integer, bits } =>
                write!(f, "Integer divider {} does not fit in {} bits", integer, bits),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}
