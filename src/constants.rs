//! Constants
//!
//! Datasheet values for the Si5351 A/B/C family. Values marked "Adafruit"
//! follow the Adafruit CircuitPython driver rather than the datasheet.

/// Minimum allowed reference (XTAL / CLKIN) frequency
pub const REF_FREQ_MIN: f64 = 10_000_000.0;

/// Maximum allowed reference (XTAL / CLKIN) frequency
pub const REF_FREQ_MAX: f64 = 100_000_000.0;

/// Maximum frequency on any CLKx output
pub const OUT_FREQ_MAX: f64 = 160_000_000.0;

/// PLL (VCO) minimum frequency, Adafruit
pub const PLL_FREQ_MIN: f64 = 600_000_000.0;

/// PLL (VCO) maximum frequency, Adafruit
pub const PLL_FREQ_MAX: f64 = 900_000_000.0;

/// Width of the feedback MultiSynth fraction / modulus fields, Adafruit
pub const PLL_FRACTIONAL_BITS: u8 = 20;

/// Width of the feedback MultiSynth integer field, Adafruit
pub const PLL_INTEGER_BITS: u8 = 7;

/// Smallest feedback MultiSynth integer, Adafruit
pub const PLL_INTEGER_MIN: u32 = 15;

/// Largest feedback MultiSynth integer, Adafruit
pub const PLL_INTEGER_MAX: u32 = 90;

/// Integer field width of MultiSynth 0-5
pub const MS_INTEGER_BITS: u8 = 18;

/// Fraction / modulus field width of MultiSynth 0-5
pub const MS_FRACTIONAL_BITS: u8 = 20;

/// MultiSynth 6 and 7 only take an 8 bit even integer divider
pub const MS_INTEGER_ONLY_BITS: u8 = 8;

/// Smallest even divider on MultiSynth 6 and 7
pub const MS_INTEGER_ONLY_MIN: u32 = 6;

/// Smallest output MultiSynth divider, Adafruit
pub const MS_INTEGER_MIN: u32 = 4;

/// Largest output MultiSynth divider, Adafruit
pub const MS_INTEGER_MAX: u32 = 2048;

/// R divider is a power of two, 1 to 128
pub const R_DIV_STAGES: u8 = 7;

/// MultiSynth output must stay at or above this before the R divider
pub const MS_OUT_FREQ_MIN: f64 = 1_000_000.0;

/// Output channels on the B/C parts.
/// "A" parts expose three of them, the limits are the same.
pub const CHANNEL_COUNT: usize = 8;

/// Per-channel "integer only" MultiSynth flag
pub const INTEGER_ONLY_CHANNELS: [bool; CHANNEL_COUNT] =
    [false, false, false, false, false, false, true, true];

/// Default PLL frequency of a plan request
pub const DEFAULT_PLL_FREQ: f64 = 900_000_000.0;

/// Default reference frequency of a plan request
pub const DEFAULT_REF_FREQ: f64 = 10_000_000.0;
