//! Brushed DC motor driver for TB6612FNG-class H-bridges.
//!
//! A motor is driven by one PWM output-compare channel (speed) and two digital
//! outputs (direction or brake). The timer is shared: a [`MotorDriver`] only
//! stores the channel it was bound to and borrows the timer for every call, so
//! several motors can run off the same peripheral.
//!
//! ```ignore
//! let mut motor = MotorDriver::new(MotorParams::new(pwm_pin, a, b), &mut pwm)?;
//! motor.limit(50, &pwm);
//! motor.set(50, &mut pwm); // forward, 25% duty
//! motor.ebreak(10, &mut pwm);
//! ```
#![cfg_attr(not(test), no_std)]

use core::fmt::Display;

pub mod driver;
pub mod state;

pub use driver::{Binding, MotorDriver, MotorParams};
pub use state::MotorState;

/// Logical speed range used when none is given.
pub const DEFAULT_RESOLUTION: u16 = 100;

/// Limit applied by `init`: the whole timer range.
pub const FULL_LIMIT: u8 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-log", derive(defmt::Format))]
pub enum MotorError {
    /// The PWM pin is not routed to any channel of the timer.
    NoPwmChannel,
    /// A resolution of zero leaves nothing to scale against.
    InvalidResolution,
}

impl Display for MotorError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            MotorError::NoPwmChannel => core::write!(f, "PWM pin has no timer channel"),
            MotorError::InvalidResolution => core::write!(f, "Resolution must be greater than zero"),
        }
    }
}
