use common::{OutputPinBase, PwmBase};

use crate::{MotorError, MotorState, DEFAULT_RESOLUTION, FULL_LIMIT};

/// Wiring of one motor: the pin carrying the PWM signal and the two H-bridge
/// direction inputs.
pub struct MotorParams<X, P> {
    pub pwm_pin: X,
    pub a: P,
    pub b: P,
    /// Logical speed range, `set` takes values in `-resolution..=resolution`.
    pub resolution: u16,
}

impl<X, P> MotorParams<X, P> {
    pub fn new(pwm_pin: X, a: P, b: P) -> Self {
        Self {
            pwm_pin,
            a,
            b,
            resolution: DEFAULT_RESOLUTION,
        }
    }

    pub fn with_resolution(mut self, resolution: u16) -> Self {
        self.resolution = resolution;
        self
    }
}

/// Hardware a bound driver holds on to.
pub struct Binding<C, P> {
    a: P,
    b: P,
    channel: C,
    resolution: u16,
    limit: u8,
    // highest compare value `set` and `ebreak` may write
    ceiling: u64,
    // None until the first command after init
    state: Option<MotorState>,
}

impl<C: Copy, P: OutputPinBase> Binding<C, P> {
    fn apply<T: PwmBase<Channel = C>>(&mut self, state: MotorState, pwm: &mut T) {
        let (a, b) = state.levels();
        self.a.set_level(a);
        self.b.set_level(b);
        pwm.set_compare(self.channel, state.duty());
        self.state = Some(state);
    }
}

/// Compare value for `magnitude` out of `resolution`, truncated.
pub fn scale(ceiling: u64, magnitude: u64, resolution: u16) -> u64 {
    if resolution == 0 {
        return 0;
    }
    let scaled = u128::from(ceiling) * u128::from(magnitude) / u128::from(resolution);
    u64::try_from(scaled).unwrap_or(u64::MAX)
}

/// Ceiling allowed by a `percent` limit on a timer reloading at `overflow`.
pub fn ceiling_for(overflow: u64, percent: u8) -> u64 {
    let percent = percent.min(FULL_LIMIT);
    let range = u128::from(overflow) + 1;
    let ceiling = range * u128::from(percent) / u128::from(FULL_LIMIT);
    u64::try_from(ceiling).unwrap_or(u64::MAX)
}

/// A single DC motor on an H-bridge.
///
/// Starts out [`MotorDriver::Unbound`]: every command is then silently
/// ignored. [`MotorDriver::init`] binds it to a timer channel and two pins.
/// The timer is not owned, it is passed to each call.
pub enum MotorDriver<C, P> {
    Unbound,
    Bound(Binding<C, P>),
}

impl<C, P> Default for MotorDriver<C, P> {
    fn default() -> Self {
        Self::Unbound
    }
}

impl<C: Copy, P: OutputPinBase> MotorDriver<C, P> {
    pub const fn unbound() -> Self {
        Self::Unbound
    }

    /// Builds a driver and binds it right away.
    pub fn new<T>(params: MotorParams<T::Pin, P>, pwm: &mut T) -> Result<Self, MotorError>
    where
        T: PwmBase<Channel = C>,
    {
        let mut driver = Self::Unbound;
        driver.init(params, pwm)?;
        Ok(driver)
    }

    /// Binds the driver to the channel behind `params.pwm_pin`.
    ///
    /// The channel is put in PWM mode with a zero compare value and enabled,
    /// both direction pins become outputs and the limit is reset to 100%.
    /// A previous binding is dropped. On error the driver is left unbound and
    /// no hardware has been touched.
    pub fn init<T>(&mut self, params: MotorParams<T::Pin, P>, pwm: &mut T) -> Result<(), MotorError>
    where
        T: PwmBase<Channel = C>,
    {
        *self = Self::Unbound;

        let MotorParams {
            pwm_pin,
            mut a,
            mut b,
            resolution,
        } = params;

        if resolution == 0 {
            #[cfg(feature = "defmt-log")]
            defmt::warn!("[DCMOT] resolution must be greater than zero");
            return Err(MotorError::InvalidResolution);
        }

        let channel = match pwm.channel_of(pwm_pin) {
            Some(channel) => channel,
            None => {
                #[cfg(feature = "defmt-log")]
                defmt::warn!("[DCMOT] PWM pin is not routed to the timer");
                return Err(MotorError::NoPwmChannel);
            }
        };

        pwm.configure(channel, pwm_pin);
        pwm.set_compare(channel, 0);
        pwm.enable(channel);

        a.set_as_output();
        b.set_as_output();

        *self = Self::Bound(Binding {
            a,
            b,
            channel,
            resolution,
            limit: 0,
            ceiling: 0,
            state: None,
        });
        self.limit(FULL_LIMIT, &*pwm);

        #[cfg(feature = "defmt-log")]
        defmt::debug!("[DCMOT] bound, resolution {}", resolution);

        Ok(())
    }

    /// Drives the motor at `value` out of `resolution`.
    ///
    /// Positive values spin forward, negative ones in reverse, zero lets the
    /// motor coast. Values outside the resolution are clamped.
    pub fn set<T: PwmBase<Channel = C>>(&mut self, value: i32, pwm: &mut T) {
        let Self::Bound(binding) = self else {
            return;
        };

        let resolution = i32::from(binding.resolution);
        let value = value.clamp(-resolution, resolution);
        let duty = scale(
            binding.ceiling,
            u64::from(value.unsigned_abs()),
            binding.resolution,
        );
        let state = match value {
            0 => MotorState::Idle,
            v if v < 0 => MotorState::Reverse(duty),
            _ => MotorState::Forward(duty),
        };

        #[cfg(feature = "defmt-log")]
        defmt::trace!("[DCMOT] set {} -> {}", value, state);

        binding.apply(state, pwm);
    }

    /// Same as `set(0)`.
    pub fn stop<T: PwmBase<Channel = C>>(&mut self, pwm: &mut T) {
        self.set(0, pwm);
    }

    /// Short brake with both inputs high, the PWM duty being `value` out of
    /// `resolution`.
    ///
    /// `value` is clamped to the resolution like the magnitude given to `set`,
    /// so the compare value never goes past the ceiling.
    pub fn ebreak<T: PwmBase<Channel = C>>(&mut self, value: u32, pwm: &mut T) {
        let Self::Bound(binding) = self else {
            return;
        };

        let value = value.min(u32::from(binding.resolution));
        let duty = scale(binding.ceiling, u64::from(value), binding.resolution);

        #[cfg(feature = "defmt-log")]
        defmt::trace!("[DCMOT] brake {} -> {}", value, duty);

        binding.apply(MotorState::Braking(duty), pwm);
    }

    /// Caps the output at `percent` of the timer range, 100 at most.
    ///
    /// The overflow is read from the timer on each call. The new ceiling is
    /// used by the next `set` or `ebreak`, the current output is left alone.
    pub fn limit<T: PwmBase<Channel = C>>(&mut self, percent: u8, pwm: &T) {
        let Self::Bound(binding) = self else {
            return;
        };

        binding.limit = percent.min(FULL_LIMIT);
        binding.ceiling = ceiling_for(pwm.get_overflow(), binding.limit);

        #[cfg(feature = "defmt-log")]
        defmt::debug!("[DCMOT] limit {}% -> ceiling {}", binding.limit, binding.ceiling);
    }

    /// Lets the motor coast, disables the channel and hands back the direction
    /// pins. The driver is unbound afterwards.
    pub fn release<T: PwmBase<Channel = C>>(&mut self, pwm: &mut T) -> Option<(P, P)> {
        let Self::Bound(mut binding) = core::mem::take(self) else {
            return None;
        };

        binding.apply(MotorState::Idle, pwm);
        pwm.disable(binding.channel);

        #[cfg(feature = "defmt-log")]
        defmt::debug!("[DCMOT] released");

        Some((binding.a, binding.b))
    }

    pub fn is_bound(&self) -> bool {
        matches!(self, Self::Bound(_))
    }

    /// Last state commanded, `None` if unbound or nothing was commanded since
    /// `init`.
    pub fn state(&self) -> Option<MotorState> {
        match self {
            Self::Bound(binding) => binding.state,
            Self::Unbound => None,
        }
    }

    pub fn ceiling(&self) -> Option<u64> {
        match self {
            Self::Bound(binding) => Some(binding.ceiling),
            Self::Unbound => None,
        }
    }

    pub fn limit_percent(&self) -> Option<u8> {
        match self {
            Self::Bound(binding) => Some(binding.limit),
            Self::Unbound => None,
        }
    }

    pub fn resolution(&self) -> Option<u16> {
        match self {
            Self::Bound(binding) => Some(binding.resolution),
            Self::Unbound => None,
        }
    }

    pub fn channel(&self) -> Option<C> {
        match self {
            Self::Bound(binding) => Some(binding.channel),
            Self::Unbound => None,
        }
    }
}
