//! Simulated timer and GPIO backend.
//!
//! Records every access so tests can check what a driver did to the hardware
//! without a board attached. Pins hand out shared handles: keep a clone before
//! moving a pin into a driver to observe it afterwards.

use std::cell::RefCell;
use std::rc::Rc;

use crate::{fit_compare, OutputPinBase, PwmBase, RouteTable};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Channel {
    Ch1,
    Ch2,
    Ch3,
    Ch4,
}

impl Channel {
    fn index(self) -> usize {
        match self {
            Channel::Ch1 => 0,
            Channel::Ch2 => 1,
            Channel::Ch3 => 2,
            Channel::Ch4 => 3,
        }
    }

    fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Channel::Ch1),
            1 => Some(Channel::Ch2),
            2 => Some(Channel::Ch3),
            3 => Some(Channel::Ch4),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SimChannel {
    /// Pin the channel was configured to drive, `None` until `configure`.
    pub pin: Option<u8>,
    pub enabled: bool,
    pub compare: u64,
}

pub struct SimPwm {
    overflow: u64,
    routes: RouteTable<u8>,
    channels: [SimChannel; 4],
    writes: usize,
}

impl SimPwm {
    pub fn new(overflow: u64) -> Self {
        Self {
            overflow,
            routes: RouteTable::new(),
            channels: [SimChannel::default(); 4],
            writes: 0,
        }
    }

    /// Route `pin` to `channel`, like an alternate function entry in a pin map.
    pub fn with_route(mut self, pin: u8, channel: Channel) -> Self {
        self.routes.bind(channel.index(), pin);
        self
    }

    pub fn set_overflow(&mut self, overflow: u64) {
        self.overflow = overflow;
    }

    pub fn channel(&self, channel: Channel) -> SimChannel {
        self.channels[channel.index()]
    }

    pub fn compare(&self, channel: Channel) -> u64 {
        self.channels[channel.index()].compare
    }

    /// Number of mutating calls received so far.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl PwmBase for SimPwm {
    type Channel = Channel;
    type Pin = u8;

    fn channel_of(&self, pin: Self::Pin) -> Option<Self::Channel> {
        self.routes.slot_of(pin).and_then(Channel::from_index)
    }

    fn configure(&mut self, channel: Self::Channel, pin: Self::Pin) {
        self.writes += 1;
        self.routes.bind(channel.index(), pin);
        self.channels[channel.index()].pin = Some(pin);
    }

    fn enable(&mut self, channel: Self::Channel) {
        self.writes += 1;
        self.channels[channel.index()].enabled = true;
    }

    fn disable(&mut self, channel: Self::Channel) {
        self.writes += 1;
        self.channels[channel.index()].enabled = false;
    }

    fn set_compare(&mut self, channel: Self::Channel, value: u64) {
        self.writes += 1;
        // the timer saturates at full duty
        self.channels[channel.index()].compare = fit_compare(value, self.overflow);
    }

    fn get_overflow(&self) -> u64 {
        self.overflow
    }
}

#[derive(Debug, Default)]
struct PinRecord {
    output: bool,
    high: bool,
    writes: usize,
}

#[derive(Clone, Debug, Default)]
pub struct SimPin {
    record: Rc<RefCell<PinRecord>>,
}

impl SimPin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_output(&self) -> bool {
        self.record.borrow().output
    }

    pub fn writes(&self) -> usize {
        self.record.borrow().writes
    }
}

impl OutputPinBase for SimPin {
    fn set_as_output(&mut self) {
        let mut record = self.record.borrow_mut();
        record.output = true;
        record.writes += 1;
    }

    fn set_high(&mut self) {
        let mut record = self.record.borrow_mut();
        record.high = true;
        record.writes += 1;
    }

    fn set_low(&mut self) {
        let mut record = self.record.borrow_mut();
        record.high = false;
        record.writes += 1;
    }

    fn is_high(&self) -> bool {
        self.record.borrow().high
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_of_routed_pin() {
        let pwm = SimPwm::new(999).with_route(8, Channel::Ch1).with_route(9, Channel::Ch2);
        assert_eq!(Some(Channel::Ch1), pwm.channel_of(8));
        assert_eq!(Some(Channel::Ch2), pwm.channel_of(9));
        assert_eq!(None, pwm.channel_of(10));
    }

    #[test]
    fn test_pwm_records_writes() {
        let mut pwm = SimPwm::new(999);
        assert_eq!(0, pwm.writes());
        pwm.configure(Channel::Ch3, 4);
        pwm.set_compare(Channel::Ch3, 250);
        pwm.enable(Channel::Ch3);
        let ch = pwm.channel(Channel::Ch3);
        assert_eq!(Some(4), ch.pin);
        assert!(ch.enabled);
        assert_eq!(250, ch.compare);
        assert_eq!(3, pwm.writes());
        pwm.disable(Channel::Ch3);
        assert!(!pwm.channel(Channel::Ch3).enabled);
    }

    #[test]
    fn test_configure_moves_route() {
        let mut pwm = SimPwm::new(999).with_route(8, Channel::Ch1);
        pwm.configure(Channel::Ch3, 8);
        assert_eq!(Some(Channel::Ch3), pwm.channel_of(8));
    }

    #[test]
    fn test_compare_saturates_at_full_duty() {
        let mut pwm = SimPwm::new(999);
        pwm.set_compare(Channel::Ch1, 5000);
        assert_eq!(1000, pwm.compare(Channel::Ch1));
        pwm.set_overflow(499);
        pwm.set_compare(Channel::Ch1, 1000);
        assert_eq!(500, pwm.compare(Channel::Ch1));
    }

    #[test]
    fn test_pin_handles_share_state() {
        let observer = SimPin::new();
        let mut pin = observer.clone();
        pin.set_as_output();
        pin.set_high();
        assert!(observer.is_output());
        assert!(observer.is_high());
        pin.set_low();
        assert!(!observer.is_high());
        assert_eq!(3, observer.writes());
    }
}
