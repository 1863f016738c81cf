use rand::Rng;
use si5351_calc::{register::*, PlanRequest};

#[test]
fn integer_mode_params() {
    let p = MultisynthParams::new(90, 0, 0);
    assert_eq!(p, MultisynthParams { p1: 11008, p2: 0, p3: 1 });

    // the smallest output divider encodes as zero
    let p = MultisynthParams::new(4, 0, 0);
    assert_eq!(p, MultisynthParams { p1: 0, p2: 0, p3: 1 });
}

#[test]
fn fractional_mode_params() {
    assert_eq!(MultisynthParams::new(87, 1, 2), MultisynthParams { p1: 10688, p2: 0, p3: 2 });
    assert_eq!(MultisynthParams::new(62, 1, 2), MultisynthParams { p1: 7488, p2: 0, p3: 2 });

    // 128 * 319 = 40832 = 11 * 3537 + 1925
    assert_eq!(
        MultisynthParams::new(113, 319, 3537),
        MultisynthParams { p1: 128 * 113 + 11 - 512, p2: 1925, p3: 3537 }
    );
}

#[test]
fn params_match_combined_formula() {
    let mut rng = rand::thread_rng();
    for _ in 0..1000 {
        let a = rng.gen_range(4..=2048u64);
        let c = rng.gen_range(1..(1u64 << 20));
        let b = rng.gen_range(1..=c);

        let p = MultisynthParams::new(a as u32, b as u32, c as u32);

        // P1 = floor(128 (a c + b) / c) - 512, P2 = 128 b mod c
        assert_eq!(p.p1 as u64, 128 * (a * c + b) / c - 512, "{} {}/{}", a, b, c);
        assert_eq!(p.p2 as u64, (128 * b) % c, "{} {}/{}", a, b, c);
        assert_eq!(p.p3 as u64, c);
    }
}

#[test]
fn parameter_block_layout() {
    let params = MultisynthParams { p1: 0x2ABCD, p2: 0xF1234, p3: 0xE5678 };
    let reg = params.write(Reg::<Ms>::default()).set(RDiv(5));

    assert_eq!(reg.to_bytes(), [0x56, 0x78, 0x52, 0xAB, 0xCD, 0xEF, 0x12, 0x34]);
    assert_eq!(MultisynthParams::read(&reg), params);

    let rdiv: RDiv = reg.get();
    assert_eq!(rdiv, RDiv(5));
    let div_by_4: DivBy4 = reg.get();
    assert_eq!(div_by_4, DivBy4::Off);

    let reg = reg.set(DivBy4::On);
    assert_eq!(reg.to_bytes()[2], 0x5E);
    assert_eq!(MultisynthParams::read(&reg), params);

    let msn = params.write(Reg::<Msn>::default());
    assert_eq!(msn.to_bytes(), [0x56, 0x78, 0x02, 0xAB, 0xCD, 0xEF, 0x12, 0x34]);
}

#[test]
fn set_replaces_field() {
    let reg = Reg::<Ms>::default().set(P2Lo(0xFFFF)).set(P2Lo(0x0102));
    assert_eq!(reg.w, 0x0102);

    // out of range values are masked to the field width
    let reg = Reg::<Ms>::default().set(RDiv(0xFF));
    assert_eq!(reg.to_bytes()[2], 0x70);
}

#[test]
fn plan_registers() {
    let res = PlanRequest::new(14_000_000.0).pll_hz(875_000_000.0).plan().unwrap();

    assert_eq!(MultisynthParams::read(&res.pll_registers()), MultisynthParams::new(87, 1, 2));
    match res.output_registers() {
        OutputRegisters::Multisynth(reg) => {
            assert_eq!(MultisynthParams::read(&reg), MultisynthParams::new(62, 1, 2));
            let rdiv: RDiv = reg.get();
            assert_eq!(rdiv, RDiv(0));
        }
        OutputRegisters::IntegerOnly(_) => panic!("MS0 is a full MultiSynth"),
    }
}

#[test]
fn divide_by_four() {
    let res = PlanRequest::new(150_000_000.0).pll_hz(600_000_000.0).plan().unwrap();
    assert_eq!(res.multisynth.integer, 4);

    match res.output_registers() {
        OutputRegisters::Multisynth(reg) => {
            assert_eq!(MultisynthParams::read(&reg).p1, 0);
            assert_eq!(reg.to_bytes()[2], 0x0C);
        }
        OutputRegisters::IntegerOnly(_) => panic!("MS0 is a full MultiSynth"),
    }
}

#[test]
fn low_frequency_r_divider_bits() {
    let res = PlanRequest::new(32_768.0).channel(2).plan().unwrap();

    match res.output_registers() {
        OutputRegisters::Multisynth(reg) => {
            let rdiv: RDiv = reg.get();
            assert_eq!(rdiv, RDiv(5));
            assert_eq!(reg.to_bytes()[2] & 0x70, 0x50);
        }
        OutputRegisters::IntegerOnly(_) => panic!("MS2 is a full MultiSynth"),
    }
}

#[test]
fn integer_only_registers() {
    let res = PlanRequest::new(100_000_000.0).channel(6).plan().unwrap();
    assert_eq!(
        res.output_registers(),
        OutputRegisters::IntegerOnly(IntegerOnlyRegisters { ms_p1: 8, r_div: 0 })
    );

    // 900 MHz / 30 kHz = 30000 = 234.375 * 2^7
    let res = PlanRequest::new(30_000.0).channel(7).plan().unwrap();
    let regs = match res.output_registers() {
        OutputRegisters::IntegerOnly(regs) => regs,
        OutputRegisters::Multisynth(_) => panic!("MS7 is integer only"),
    };
    assert_eq!(regs, IntegerOnlyRegisters { ms_p1: 234, r_div: 7 });
    assert_eq!(regs.r_div_bits(7), 0x70);
    assert_eq!(regs.r_div_bits(6), 0x07);
}
