use env_logger::{Builder, Env};
use log::{error, info, LevelFilter};

use si5351_calc::{ register::*, Mode, PlanRequest, PlanResult };


fn report(res: &PlanResult) {
    info!("PLL Integer: {}", res.pll.integer);
    match res.pll.mode() {
        Mode::Fractional => info!(
            "PLL fractional mode, fraction {} modulus {}",
            res.pll.fraction, res.pll.modulus
        ),
        Mode::Integer => info!("PLL integer mode"),
    }
    info!("PLL frequency error {} Hz", res.pll_error_hz);

    info!("MultiSynth Integer: {}", res.multisynth.integer);
    match res.multisynth.mode() {
        Mode::Fractional => info!(
            "MultiSynth fractional mode, fraction {} modulus {}",
            res.multisynth.fraction, res.multisynth.modulus
        ),
        Mode::Integer => info!("MultiSynth integer mode"),
    }
    info!("MultiSynth R divider: {}", res.r_divider());
    info!("Output frequency {} Hz, error {} Hz", res.out_hz, res.out_error_hz);

    info!("MSNA {:02x?}", res.pll_registers().to_bytes());
    match res.output_registers() {
        OutputRegisters::Multisynth(reg) => info!("MS{} {:02x?}", res.channel, reg.to_bytes()),
        OutputRegisters::IntegerOnly(regs) => info!(
            "MS{}_P1 {:#04x} R{}_DIV {:#05b}",
            res.channel, regs.ms_p1, res.channel, regs.r_div
        ),
    }
}

fn main() {
    Builder::from_env(Env::default().default_filter_or(LevelFilter::Info.to_string())).init();

    let requests = [
        PlanRequest::new(14_000_000.0).pll_hz(875_000_000.0),
        PlanRequest::new(10_000_000.0).ref_hz(25_000_000.0),
        PlanRequest::new(7_074_000.0).ref_hz(25_000_000.0).pll_hz(800_000_000.0),
        PlanRequest::new(32_768.0).channel(2),
        PlanRequest::new(100_000_000.0).channel(6),
        PlanRequest::new(1_000.0),
    ];

    for req in requests.iter() {
        info!("{:?}", req);
        match req.plan() {
            Ok(res) => report(&res),
            Err(e) => error!("{}", e),
        }
    }
}
