#![no_std]

//! [Si5351](https://www.silabs.com/documents/public/data-sheets/Si5351-B.pdf) PLL / MultiSynth planner.
//!
//! Finds the feedback and output MultiSynth settings, integer or
//! fractional, for one output channel and reports the frequency error.
//!
//! ```
//! use si5351_calc::{Mode, PlanRequest};
//!
//! let res = PlanRequest::new(14_000_000.0).pll_hz(875_000_000.0).plan().unwrap();
//! assert_eq!(res.pll.integer, 87);
//! assert_eq!(res.multisynth.mode(), Mode::Fractional);
//! assert_eq!(res.out_error_hz, 0.0);
//! ```

#[cfg(feature = "std")]
extern crate std;

pub mod constants;
pub mod errors;
pub mod config;
pub mod ratio;
pub mod validate;
pub mod pll;
pub mod multisynth;
pub mod register;
pub mod plan;

pub use config::{HardwareLimits, PlanRequest, SI5351};
pub use errors::Error;
pub use plan::{plan, PlanResult};
pub use ratio::{Mode, RatioApproximation};
pub use validate::{validate, OutputWindow};
