#![cfg_attr(not(any(test, feature = "mock")), no_std)]

#[cfg(any(test, feature = "mock"))]
pub mod mock;

/// Logic level of a digital output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-log", derive(defmt::Format))]
pub enum Level {
    Low,
    High,
}

impl From<bool> for Level {
    fn from(value: bool) -> Self {
        if value {
            Level::High
        } else {
            Level::Low
        }
    }
}

impl From<Level> for bool {
    fn from(value: Level) -> Self {
        value == Level::High
    }
}

/// Timer peripheral driving one or more PWM output-compare channels.
///
/// The timer itself (clock, prescaler, period) is set up by whoever owns the
/// peripheral. Implementors only expose what a channel user needs, so a single
/// timer can be shared by several drivers, each one addressing its own channel.
pub trait PwmBase {
    type Channel: Copy;
    type Pin: Copy;

    /// Channel the given pin is routed to on this timer, if any.
    fn channel_of(&self, pin: Self::Pin) -> Option<Self::Channel>;

    /// Put the channel in PWM mode 1 output compare, driving `pin`.
    fn configure(&mut self, channel: Self::Channel, pin: Self::Pin);

    fn enable(&mut self, channel: Self::Channel);
    fn disable(&mut self, channel: Self::Channel);

    fn set_compare(&mut self, channel: Self::Channel, value: u64);

    /// Auto-reload value of the timer. A compare value of `overflow + 1`
    /// keeps the output active for the whole period.
    fn get_overflow(&self) -> u64;
}

/// Largest compare value a timer reloading at `overflow` accepts.
pub fn fit_compare(value: u64, overflow: u64) -> u64 {
    value.min(overflow.saturating_add(1))
}

/// Pins routed to the channels of a four channel timer, indexed by channel
/// slot. A pin sits in one slot at most.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RouteTable<P> {
    slots: [Option<P>; 4],
}

impl<P: Copy + PartialEq> Default for RouteTable<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Copy + PartialEq> RouteTable<P> {
    pub const fn new() -> Self {
        Self { slots: [None; 4] }
    }

    /// Route `pin` to `slot`, dropping any route it had to another slot.
    /// Out of range slots are ignored.
    pub fn bind(&mut self, slot: usize, pin: P) {
        if slot >= self.slots.len() {
            return;
        }
        for route in self.slots.iter_mut() {
            if *route == Some(pin) {
                *route = None;
            }
        }
        self.slots[slot] = Some(pin);
    }

    pub fn slot_of(&self, pin: P) -> Option<usize> {
        self.slots.iter().position(|r| *r == Some(pin))
    }

    pub fn pin_at(&self, slot: usize) -> Option<P> {
        self.slots.get(slot).copied().flatten()
    }
}

pub trait OutputPinBase {
    fn set_as_output(&mut self);
    fn set_high(&mut self);
    fn set_low(&mut self);
    fn is_high(&self) -> bool;

    fn set_level(&mut self, level: Level) {
        match level {
            Level::High => self.set_high(),
            Level::Low => self.set_low(),
        }
    }
}
