//! Si5351 MultiSynth registers
//!
//! Feedback (MSNA/MSNB) and output (MS0-MS5) MultiSynths share one
//! 8 register parameter block:
//!
//! | reg | bits                                        |
//! |-----|---------------------------------------------|
//! | +0  | P3[15:8]                                    |
//! | +1  | P3[7:0]                                     |
//! | +2  | 0, R_DIV[2:0], DIVBY4[1:0], P1[17:16]       |
//! | +3  | P1[15:8]                                    |
//! | +4  | P1[7:0]                                     |
//! | +5  | P3[19:16], P2[19:16]                        |
//! | +6  | P2[15:8]                                    |
//! | +7  | P2[7:0]                                     |
//!
//! The block is kept as one 64 bit word, register +0 in the most
//! significant byte. R_DIV and DIVBY4 only exist on output MultiSynths.

use core::marker::PhantomData;

/// Parameter block marker types
macro_rules! gen_block_marker {
    ($(#[$meta:meta])* $r:ident) => {
        $(#[$meta])*
        #[derive(Debug,Copy,Clone,PartialEq)]
        pub struct $r {}
    }
}

gen_block_marker!(
    /// Feedback MultiSynth, PLL A registers 26-33, PLL B registers 34-41
    Msn
);
gen_block_marker!(
    /// Output MultiSynth 0-5, registers 42 + 8 * n
    Ms
);


/// Single MultiSynth parameter block
#[derive(Debug,Copy,Clone,PartialEq)]
pub struct Reg<R> {
    /// Parameter block word
    pub w: u64,
    phantom: PhantomData<R>,
}

impl<R> Default for Reg<R> {
    #[inline]
    fn default() -> Self { Reg { w: 0, phantom: PhantomData } }
}

/// Bit operations on 64bit words
impl<R> Reg<R> {
    #[inline]
    pub fn get<F>(self: &Self) -> F
    where F: Sized + BitField<R> + From<u64>
    {
        F::from(
            (self.w >> F::offset()) & F::mask()
        )
    }

    #[inline]
    pub fn set<F>(mut self: Self, f: F) -> Self
    where F: Sized + BitField<R> + Into<u64>
    {
        let fbits = (f.into() & F::mask()) << F::offset();
        let rbits = self.w & (! ( F::mask() << F::offset() ));
        self.w = rbits | fbits;
        self
    }

    /// Register values in device order
    #[inline]
    pub fn to_bytes(self: &Self) -> [u8; 8] {
        self.w.to_be_bytes()
    }
}


/// Bit operations on 64bit words
pub trait BitField<R> {
    /// Number of bits in the bit field
    fn num_bits() -> u8;

    /// Offset from 0
    fn offset() -> u8;

    #[inline]
    fn mask() -> u64 {
        !(u64::MAX << Self::num_bits())
    }
}

/// Generate BitField implementation
macro_rules! gen_bitfield_impl {
	($r:ty, $n:ident, $nb:tt, $off:tt) => {
        impl BitField<$r> for $n {
            #[inline] fn num_bits() -> u8 { $nb }
            #[inline] fn offset() -> u8 { $off }
        }
    }
}

/// Small bitfield-encoded numbes boilerplate
macro_rules! gen_bitfield_struct {
	($(#[$meta:meta])*, [$($r:ty),+], $n:ident, $v:ty, $nb:tt, $off:tt) => {
        $(#[$meta])*
        #[derive(Debug,Copy,Clone,PartialEq)]
        pub struct $n(pub $v);

        $( gen_bitfield_impl!($r, $n, $nb, $off); )+

        impl From<u64> for $n { #[inline] fn from(x: u64) -> Self { $n(x as $v) } }
        impl From<$n> for u64 { #[inline] fn from(x: $n) -> u64 { x.0 as u64 } }
	};
}


gen_bitfield_struct!(
    /// P1[15:0], registers +3 and +4
    , [Msn, Ms], P1Lo, u16, 16, 24
);

gen_bitfield_struct!(
    /// P1[17:16], register +2 bits 1:0
    , [Msn, Ms], P1Hi, u8, 2, 40
);

gen_bitfield_struct!(
    /// P2[15:0], registers +6 and +7
    , [Msn, Ms], P2Lo, u16, 16, 0
);

gen_bitfield_struct!(
    /// P2[19:16], register +5 bits 3:0
    , [Msn, Ms], P2Hi, u8, 4, 16
);

gen_bitfield_struct!(
    /// P3[15:0], registers +0 and +1
    , [Msn, Ms], P3Lo, u16, 16, 48
);

gen_bitfield_struct!(
    /// P3[19:16], register +5 bits 7:4
    , [Msn, Ms], P3Hi, u8, 4, 20
);

gen_bitfield_struct!(
    /// R_DIV, output divider is 2^R_DIV, register +2 bits 6:4
    , [Ms], RDiv, u8, 3, 44
);


/// MSx_DIVBY4, register +2 bits 3:2.
/// Must be set when the output MultiSynth divides by exactly 4.
#[derive(Debug,Copy,Clone,PartialEq)]
pub enum DivBy4 {
    Off = 0b00,
    On = 0b11,
}
gen_bitfield_impl!(Ms, DivBy4, 2, 42);

impl From<u64> for DivBy4 {
    #[inline]
    fn from(x: u64) -> Self {
        if x == DivBy4::On as u64 { DivBy4::On } else { DivBy4::Off }
    }
}

impl From<DivBy4> for u64 {
    #[inline]
    fn from(x: DivBy4) -> u64 { x as u64 }
}


/// MultiSynth parameters as the device expects them.
///
/// For `a + b/c`:
/// P1 = 128 × a + floor(128 × b / c) − 512
/// P2 = 128 × b − c × floor(128 × b / c)
/// P3 = c
///
/// Integer mode is `b = 0, c = 1`.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug,Copy,Clone,PartialEq,Eq)]
pub struct MultisynthParams {
    /// 18 bits
    pub p1: u32,
    /// 20 bits
    pub p2: u32,
    /// 20 bits
    pub p3: u32,
}

impl MultisynthParams {

    /// Parameters for `integer + fraction / modulus`.
    /// A zero fraction or modulus selects integer mode.
    pub fn new(integer: u32, fraction: u32, modulus: u32) -> Self {
        let a = integer as u64;
        if fraction == 0 || modulus == 0 {
            return MultisynthParams {
                p1: (128 * a).saturating_sub(512) as u32,
                p2: 0,
                p3: 1,
            };
        }

        let b = fraction as u64;
        let c = modulus as u64;
        let floor = 128 * b / c;
        MultisynthParams {
            p1: (128 * a + floor).saturating_sub(512) as u32,
            p2: (128 * b - c * floor) as u32,
            p3: c as u32,
        }
    }

    /// Fill the P1 / P2 / P3 fields of a parameter block
    pub fn write<R>(self: &Self, reg: Reg<R>) -> Reg<R>
    where P1Lo: BitField<R>, P1Hi: BitField<R>,
          P2Lo: BitField<R>, P2Hi: BitField<R>,
          P3Lo: BitField<R>, P3Hi: BitField<R>,
    {
        reg.set(P1Lo(self.p1 as u16))
           .set(P1Hi((self.p1 >> 16) as u8))
           .set(P2Lo(self.p2 as u16))
           .set(P2Hi((self.p2 >> 16) as u8))
           .set(P3Lo(self.p3 as u16))
           .set(P3Hi((self.p3 >> 16) as u8))
    }

    /// Read the P1 / P2 / P3 fields back from a parameter block
    pub fn read<R>(reg: &Reg<R>) -> Self
    where P1Lo: BitField<R>, P1Hi: BitField<R>,
          P2Lo: BitField<R>, P2Hi: BitField<R>,
          P3Lo: BitField<R>, P3Hi: BitField<R>,
    {
        let p1lo: P1Lo = reg.get();
        let p1hi: P1Hi = reg.get();
        let p2lo: P2Lo = reg.get();
        let p2hi: P2Hi = reg.get();
        let p3lo: P3Lo = reg.get();
        let p3hi: P3Hi = reg.get();
        MultisynthParams {
            p1: (p1hi.0 as u32) << 16 | p1lo.0 as u32,
            p2: (p2hi.0 as u32) << 16 | p2lo.0 as u32,
            p3: (p3hi.0 as u32) << 16 | p3lo.0 as u32,
        }
    }
}


/// MultiSynth 6 / 7 settings.
///
/// `ms_p1` goes to register 90 (MS6) or 91 (MS7) as is, it is the even
/// divider itself. `r_div` is R6_DIV (register 92 bits 2:0) or R7_DIV
/// (register 92 bits 6:4).
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug,Copy,Clone,PartialEq,Eq)]
pub struct IntegerOnlyRegisters {
    pub ms_p1: u8,
    pub r_div: u8,
}

impl IntegerOnlyRegisters {

    /// Register 92 contribution of this channel
    #[inline]
    pub fn r_div_bits(self: &Self, channel: usize) -> u8 {
        let shift = if channel % 2 == 0 { 0 } else { 4 };
        (self.r_div & 0b111) << shift
    }
}


/// Output stage registers of one channel
#[derive(Debug,Copy,Clone,PartialEq)]
pub enum OutputRegisters {
    /// MS0-MS5 parameter block
    Multisynth(Reg<Ms>),
    /// MS6 / MS7
    IntegerOnly(IntegerOnlyRegisters),
}
