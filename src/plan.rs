///! Single channel plan: validation, PLL stage, MultiSynth stage

use log::debug;

use crate::{
    config::*, errors::*, multisynth::*, pll::*, ratio::*, register::*, validate::*,
};


/// Register settings and resulting frequencies for one channel
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug,Copy,Clone,PartialEq)]
pub struct PlanResult {
    /// Output channel
    pub channel: usize,
    /// True if the channel only takes even integer dividers
    pub integer_only: bool,

    /// Feedback MultiSynth ratio
    pub pll: RatioApproximation,
    /// Achieved PLL frequency, Hz
    pub pll_hz: f64,
    /// requested - achieved PLL frequency, Hz
    pub pll_error_hz: f64,

    /// Output MultiSynth ratio
    pub multisynth: RatioApproximation,
    /// R = 2^r_div_exponent
    pub r_div_exponent: u8,
    /// Achieved output frequency, Hz
    pub out_hz: f64,
    /// achieved - requested output frequency, Hz
    pub out_error_hz: f64,
}

impl PlanResult {

    /// R divider
    #[inline]
    pub fn r_divider(self: &Self) -> u32 {
        1 << self.r_div_exponent
    }

    /// MSx_INT clock control bit, set for an integer output divider
    #[inline]
    pub fn multisynth_integer_mode(self: &Self) -> bool {
        self.multisynth.mode() == Mode::Integer
    }

    /// Output frequency recomputed from the register values
    #[inline]
    pub fn output_hz(self: &Self) -> f64 {
        achieved_out_hz(self.pll_hz, &self.multisynth, self.r_div_exponent)
    }

    /// Feedback MultiSynth parameter block
    pub fn pll_registers(self: &Self) -> Reg<Msn> {
        MultisynthParams::new(self.pll.integer, self.pll.fraction, self.pll.modulus)
            .write(Reg::default())
    }

    /// Output stage registers
    pub fn output_registers(self: &Self) -> OutputRegisters {
        if self.integer_only {
            OutputRegisters::IntegerOnly(IntegerOnlyRegisters {
                ms_p1: self.multisynth.integer as u8,
                r_div: self.r_div_exponent,
            })
        } else {
            let div_by_4 = if self.multisynth_integer_mode() && self.multisynth.integer == 4 {
                DivBy4::On
            } else {
                DivBy4::Off
            };
            let ms = &self.multisynth;
            let reg = MultisynthParams::new(ms.integer, ms.fraction, ms.modulus)
                .write(Reg::<Ms>::default())
                .set(RDiv(self.r_div_exponent))
                .set(div_by_4);
            OutputRegisters::Multisynth(reg)
        }
    }
}


/// Validate `request` and plan both stages.
pub fn plan(request: &PlanRequest, limits: &HardwareLimits) -> Result<PlanResult, Error> {
    validate(request, limits)?;

    let pll = plan_pll(request.pll_hz, request.ref_hz, limits)?;
    let ms = plan_multisynth(pll.achieved_hz, request.out_hz, request.channel, limits)?;

    let res = PlanResult {
        channel: request.channel,
        integer_only: limits.is_integer_only(request.channel),
        pll: pll.ratio,
        pll_hz: pll.achieved_hz,
        pll_error_hz: pll.error_hz,
        multisynth: ms.ratio,
        r_div_exponent: ms.r_div_exponent,
        out_hz: ms.achieved_hz,
        out_error_hz: ms.error_hz,
    };
    debug!("{:?} => {:?}", request, res);
    Ok(res)
}

impl PlanRequest {

    /// Plan against the Si5351 limits
    #[inline]
    pub fn plan(self: &Self) -> Result<PlanResult, Error> {
        plan(self, &SI5351)
    }
}
