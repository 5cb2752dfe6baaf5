#![no_std]

use common::{OutputPinBase, PwmBase, RouteTable};
use embassy_stm32::{
    gpio::{Flex, Pin, Speed as PinSpeed},
    timer::{
        low_level::OutputPolarity, simple_pwm::SimplePwm, Channel, GeneralInstance4Channel,
    },
};

pub mod config;
pub mod ext;

/// GPIO identity of a pin, `port` 0 being port A.
#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub struct PinName {
    pub port: u8,
    pub pin: u8,
}

impl PinName {
    pub fn of<P: Pin>(pin: &P) -> Self {
        Self {
            port: pin.port(),
            pin: pin.pin(),
        }
    }
}

pub struct OutputPinWrapper<'a> {
    pin: Flex<'a>,
}

impl<'a> OutputPinWrapper<'a> {
    pub fn new(pin: Flex<'a>) -> Self {
        Self { pin }
    }
}

impl OutputPinBase for OutputPinWrapper<'_> {
    fn set_as_output(&mut self) {
        self.pin.set_as_output(PinSpeed::Low);
    }

    fn set_high(&mut self) {
        self.pin.set_high();
    }

    fn set_low(&mut self) {
        self.pin.set_low();
    }

    fn is_high(&self) -> bool {
        self.pin.is_set_high()
    }
}

#[macro_export]
macro_rules! init_output_pin {
    ($pin: expr) => {
        app::OutputPinWrapper::new(embassy_stm32::gpio::Flex::new($pin))
    };
}

#[macro_export]
macro_rules! timer_channel {
    ($channel: expr) => {{
        match $channel {
            1 => Some(embassy_stm32::timer::Channel::Ch1),
            2 => Some(embassy_stm32::timer::Channel::Ch2),
            3 => Some(embassy_stm32::timer::Channel::Ch3),
            4 => Some(embassy_stm32::timer::Channel::Ch4),
            _ => None,
        }
    }};
}

fn slot(channel: Channel) -> usize {
    match channel {
        Channel::Ch1 => 0,
        Channel::Ch2 => 1,
        Channel::Ch3 => 2,
        Channel::Ch4 => 3,
    }
}

/// Timer with up to four PWM channels, and the pins routed to them.
///
/// `SimplePwm` takes the pins by value when it is built, so the routing has to
/// be recorded here with [`SimplePwmWrapper::with_route`] for `channel_of` to
/// find them.
pub struct SimplePwmWrapper<'a, T: GeneralInstance4Channel> {
    inner: SimplePwm<'a, T>,
    routes: RouteTable<PinName>,
}

impl<'a, T: GeneralInstance4Channel> SimplePwmWrapper<'a, T> {
    pub fn new(p: SimplePwm<'a, T>) -> Self {
        Self {
            inner: p,
            routes: RouteTable::new(),
        }
    }

    pub fn with_route(mut self, pin: PinName, channel: Channel) -> Self {
        self.routes.bind(slot(channel), pin);
        self
    }
}

impl<T: GeneralInstance4Channel> PwmBase for SimplePwmWrapper<'_, T> {
    type Channel = Channel;
    type Pin = PinName;

    fn channel_of(&self, pin: Self::Pin) -> Option<Self::Channel> {
        let index = self.routes.slot_of(pin)?;
        timer_channel!(index + 1)
    }

    fn configure(&mut self, channel: Self::Channel, pin: Self::Pin) {
        // SimplePwm already runs every channel in PWM mode 1
        self.routes.bind(slot(channel), pin);
        self.inner.set_polarity(channel, OutputPolarity::ActiveHigh);
    }

    fn enable(&mut self, channel: Self::Channel) {
        self.inner.enable(channel);
    }

    fn disable(&mut self, channel: Self::Channel) {
        self.inner.disable(channel);
    }

    fn set_compare(&mut self, channel: Self::Channel, value: u64) {
        // set_duty asserts duty <= max duty
        let max_duty = self.inner.get_max_duty();
        let duty = u32::try_from(value).map_or(max_duty, |v| v.min(max_duty));
        self.inner.set_duty(channel, duty);
    }

    fn get_overflow(&self) -> u64 {
        // max duty is reported as ARR + 1
        u64::from(self.inner.get_max_duty()).saturating_sub(1)
    }
}
