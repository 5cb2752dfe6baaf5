//! Layout of `config/config.toml`.
//!
//! Empty strings mean "not set", the same as a missing key.

use std::ops::Not;

use serde_derive::{Deserialize, Serialize};

fn get_string_value(s: String) -> Option<String> {
    s.is_empty().not().then_some(s)
}

#[derive(Default, Debug, Serialize, Deserialize, Clone)]
pub struct PinConfig {
    pub(crate) pin: String,
}

impl PinConfig {
    pub fn get_pin(&self) -> Option<String> {
        get_string_value(self.pin.clone())
    }
}

#[derive(Default, Debug, Serialize, Deserialize, Clone)]
pub struct PwmConfig {
    pub(crate) timer: String,
    /// kHz
    pub(crate) frequency: u32,
}

impl PwmConfig {
    pub fn get_timer(&self) -> Option<String> {
        get_string_value(self.timer.clone())
    }
    pub fn get_frequency(&self) -> u32 {
        self.frequency
    }
}

#[derive(Default, Debug, Serialize, Deserialize, Clone)]
pub struct MotorConfig {
    pub(crate) pwm: PinConfig,
    /// Timer channel driven by `pwm`, 1 to 4.
    pub(crate) channel: u8,
    pub(crate) a: PinConfig,
    pub(crate) b: PinConfig,
    pub(crate) resolution: u16,
    pub(crate) limit: u8,
}

impl MotorConfig {
    pub fn get_pwm(&self) -> PinConfig {
        self.pwm.clone()
    }
    pub fn get_channel(&self) -> u8 {
        self.channel
    }
    pub fn get_a(&self) -> PinConfig {
        self.a.clone()
    }
    pub fn get_b(&self) -> PinConfig {
        self.b.clone()
    }
    pub fn get_resolution(&self) -> u16 {
        self.resolution
    }
    pub fn get_limit(&self) -> u8 {
        self.limit
    }
}

#[derive(Default, Debug, Serialize, Deserialize, Clone)]
pub struct MotorConfigs {
    pub(crate) left: MotorConfig,
    pub(crate) right: MotorConfig,
}

impl MotorConfigs {
    pub fn get_left(&self) -> MotorConfig {
        self.left.clone()
    }
    pub fn get_right(&self) -> MotorConfig {
        self.right.clone()
    }
}

#[derive(Default, Debug, Serialize, Deserialize, Clone)]
pub struct MyConfig {
    pub pwm: PwmConfig,
    pub motors: MotorConfigs,
}
