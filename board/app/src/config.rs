use embassy_stm32::timer::Channel;

pub struct PwmConfig<T> {
    /// kHz
    pub frequency: u32,
    pub timer: T,
}

pub struct MotorConfig<P, A, B> {
    pub pwm: P,
    /// Timer channel `pwm` is routed to.
    pub channel: Channel,
    pub a: A,
    pub b: B,
    pub resolution: u16,
    /// Percentage of the timer range applied at start-up.
    pub limit: u8,
}

pub struct BoardConfig<T, LP, LA, LB, RP, RA, RB> {
    pub pwm: PwmConfig<T>,
    pub left: MotorConfig<LP, LA, LB>,
    pub right: MotorConfig<RP, RA, RB>,
}
