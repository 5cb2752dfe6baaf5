//! Board wiring for the motor firmware.
//!
//! The firmware build script loads `config/config.toml` with [`load`], and
//! [`generate`] checks it and turns it into the `ext` module: peripheral type
//! aliases, `peripherals_init` handing out the configured peripherals, and
//! `pwm_init` building the shared timer with each motor on its channel.

use std::fmt::Display;
use std::path::Path;

pub mod external;

use external::{MotorConfig, MyConfig};

pub const CHANNEL_COUNT: u8 = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    MissingTimer,
    ZeroFrequency,
    MissingPin(&'static str, &'static str),
    InvalidChannel(&'static str, u8),
    SharedChannel(u8),
    ZeroResolution(&'static str),
    InvalidLimit(&'static str, u8),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::MissingTimer => write!(f, "PWM timer is missing"),
            ConfigError::ZeroFrequency => write!(f, "PWM frequency must be greater than zero"),
            ConfigError::MissingPin(motor, pin) => {
                write!(f, "Motor {} {} pin is missing", motor, pin)
            }
            ConfigError::InvalidChannel(motor, _) => write!(
                f,
                "Motor {} PWM channel must be between 1 and {}",
                motor, CHANNEL_COUNT
            ),
            ConfigError::SharedChannel(channel) => {
                write!(f, "Both motors are on PWM channel {}", channel)
            }
            ConfigError::ZeroResolution(motor) => {
                write!(f, "Motor {} resolution must be greater than zero", motor)
            }
            ConfigError::InvalidLimit(motor, _) => {
                write!(f, "Motor {} limit must be between 0 and 100", motor)
            }
        }
    }
}

/// Checked wiring of one motor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MotorPins {
    pub pwm: String,
    pub channel: u8,
    pub a: String,
    pub b: String,
    pub resolution: u16,
    pub limit: u8,
}

pub fn load(path: &Path) -> Result<MyConfig, confy::ConfyError> {
    confy::load_path::<MyConfig>(path)
}

fn required_pin(
    motor: &'static str,
    name: &'static str,
    pin: Option<String>,
) -> Result<String, ConfigError> {
    pin.ok_or(ConfigError::MissingPin(motor, name))
}

pub fn motor_pins(label: &'static str, conf: &MotorConfig) -> Result<MotorPins, ConfigError> {
    let pwm = required_pin(label, "PWM", conf.get_pwm().get_pin())?;
    let a = required_pin(label, "A", conf.get_a().get_pin())?;
    let b = required_pin(label, "B", conf.get_b().get_pin())?;
    let channel = conf.get_channel();
    if channel < 1 || channel > CHANNEL_COUNT {
        return Err(ConfigError::InvalidChannel(label, channel));
    }
    if conf.get_resolution() == 0 {
        return Err(ConfigError::ZeroResolution(label));
    }
    if conf.get_limit() > 100 {
        return Err(ConfigError::InvalidLimit(label, conf.get_limit()));
    }
    Ok(MotorPins {
        pwm,
        channel,
        a,
        b,
        resolution: conf.get_resolution(),
        limit: conf.get_limit(),
    })
}

/// `SimplePwm::new` argument for timer channel `channel`.
fn pwm_slot(channel: u8, left: &MotorPins, right: &MotorPins) -> String {
    if left.channel == channel {
        format!("Some(PwmPin::new_ch{}(left, OutputType::PushPull))", channel)
    } else if right.channel == channel {
        format!("Some(PwmPin::new_ch{}(right, OutputType::PushPull))", channel)
    } else {
        String::from("None")
    }
}

fn motor_init(m: &MotorPins) -> String {
    format!(
        "MotorConfig{{
            pwm: p.{},
            channel: Channel::Ch{},
            a: p.{},
            b: p.{},
            resolution: {},
            limit: {},
        }}",
        m.pwm, m.channel, m.a, m.b, m.resolution, m.limit
    )
}

/// Source of the firmware `ext` module.
pub fn generate(conf: &MyConfig) -> Result<String, ConfigError> {
    let pwm_timer = conf.pwm.get_timer().ok_or(ConfigError::MissingTimer)?;
    let pwm_frequency = conf.pwm.get_frequency();
    if pwm_frequency == 0 {
        return Err(ConfigError::ZeroFrequency);
    }

    let left = motor_pins("left", &conf.motors.get_left())?;
    let right = motor_pins("right", &conf.motors.get_right())?;
    if left.channel == right.channel {
        return Err(ConfigError::SharedChannel(left.channel));
    }

    let slots: Vec<String> = (1..=CHANNEL_COUNT)
        .map(|ch| pwm_slot(ch, &left, &right))
        .collect();

    Ok(format!(
        "

use embassy_stm32::Peripherals;
use embassy_stm32::peripherals::*;
use embassy_stm32::gpio::OutputType;
use embassy_stm32::time::khz;
use embassy_stm32::timer::low_level::CountingMode;
use embassy_stm32::timer::simple_pwm::{{PwmPin, SimplePwm}};
use embassy_stm32::timer::Channel;
use crate::config::*;

pub type PwmTimer = {timer};
pub type LeftPwmPin = {lp};
pub type LeftAPin = {la};
pub type LeftBPin = {lb};
pub type RightPwmPin = {rp};
pub type RightAPin = {ra};
pub type RightBPin = {rb};

pub fn peripherals_init(p: Peripherals) -> BoardConfig<
    PwmTimer,
    LeftPwmPin,
    LeftAPin,
    LeftBPin,
    RightPwmPin,
    RightAPin,
    RightBPin,
>{{
    BoardConfig{{
        pwm: PwmConfig{{
            frequency: {frequency},
            timer: p.{timer},
        }},
        left: {left},
        right: {right},
    }}
}}

pub fn pwm_init(
    timer: PwmTimer,
    left: LeftPwmPin,
    right: RightPwmPin,
    frequency: u32,
) -> SimplePwm<'static, PwmTimer> {{
    SimplePwm::new(
        timer,
        {s1},
        {s2},
        {s3},
        {s4},
        khz(frequency),
        CountingMode::EdgeAlignedUp,
    )
}}

",
        timer = pwm_timer,
        lp = left.pwm,
        la = left.a,
        lb = left.b,
        rp = right.pwm,
        ra = right.a,
        rb = right.b,
        frequency = pwm_frequency,
        left = motor_init(&left),
        right = motor_init(&right),
        s1 = slots[0],
        s2 = slots[1],
        s3 = slots[2],
        s4 = slots[3],
    ))
}

#[cfg(test)]
mod tests {
    use super::external::{MotorConfigs, PinConfig, PwmConfig};
    use super::*;

    fn pin(name: &str) -> PinConfig {
        PinConfig {
            pin: name.to_string(),
        }
    }

    fn motor(pwm: &str, channel: u8, a: &str, b: &str) -> MotorConfig {
        MotorConfig {
            pwm: pin(pwm),
            channel,
            a: pin(a),
            b: pin(b),
            resolution: 100,
            limit: 100,
        }
    }

    fn board(left_channel: u8, right_channel: u8) -> MyConfig {
        MyConfig {
            pwm: PwmConfig {
                timer: "TIM1".to_string(),
                frequency: 20,
            },
            motors: MotorConfigs {
                left: motor("PE9", left_channel, "PE0", "PE1"),
                right: motor("PE11", right_channel, "PE2", "PE3"),
            },
        }
    }

    #[test]
    fn test_motor_pins() {
        let pins = motor_pins("left", &motor("PE9", 1, "PE0", "PE1")).unwrap();
        assert_eq!("PE9", pins.pwm);
        assert_eq!(1, pins.channel);
        assert_eq!("PE0", pins.a);
        assert_eq!("PE1", pins.b);
        assert_eq!(100, pins.resolution);
        assert_eq!(100, pins.limit);
    }

    #[test]
    fn test_motor_pins_channel_range() {
        for channel in 1..=4 {
            assert!(motor_pins("left", &motor("PE9", channel, "PE0", "PE1")).is_ok());
        }
        for channel in [0, 5, u8::MAX] {
            assert_eq!(
                Err(ConfigError::InvalidChannel("left", channel)),
                motor_pins("left", &motor("PE9", channel, "PE0", "PE1"))
            );
        }
    }

    #[test]
    fn test_motor_pins_missing_pin() {
        assert_eq!(
            Err(ConfigError::MissingPin("left", "PWM")),
            motor_pins("left", &motor("", 1, "PE0", "PE1"))
        );
        assert_eq!(
            Err(ConfigError::MissingPin("left", "B")),
            motor_pins("left", &motor("PE9", 1, "PE0", ""))
        );
    }

    #[test]
    fn test_motor_pins_resolution_and_limit() {
        let mut conf = motor("PE9", 1, "PE0", "PE1");
        conf.resolution = 0;
        assert_eq!(
            Err(ConfigError::ZeroResolution("left")),
            motor_pins("left", &conf)
        );
        conf.resolution = 1;
        conf.limit = 101;
        assert_eq!(
            Err(ConfigError::InvalidLimit("left", 101)),
            motor_pins("left", &conf)
        );
    }

    #[test]
    fn test_generate_routes_configured_channels() {
        let code = generate(&board(3, 1)).unwrap();
        assert!(code.contains("channel: Channel::Ch3"));
        assert!(code.contains("channel: Channel::Ch1"));
        assert!(code.contains("Some(PwmPin::new_ch3(left, OutputType::PushPull))"));
        assert!(code.contains("Some(PwmPin::new_ch1(right, OutputType::PushPull))"));
        assert!(!code.contains("new_ch2"));
        assert!(!code.contains("new_ch4"));
        assert!(code.contains("pub type PwmTimer = TIM1;"));
        assert!(code.contains("pub type LeftPwmPin = PE9;"));
        assert!(code.contains("pub type RightPwmPin = PE11;"));
    }

    #[test]
    fn test_generate_slot_order() {
        let code = generate(&board(2, 4)).unwrap();
        let ch2 = code.find("new_ch2(left").unwrap();
        let ch4 = code.find("new_ch4(right").unwrap();
        assert!(ch2 < ch4);
        let tail = &code[code.find("SimplePwm::new(").unwrap()..];
        assert_eq!(2, tail.matches("None").count());
    }

    #[test]
    fn test_generate_shared_channel() {
        assert_eq!(Err(ConfigError::SharedChannel(2)), generate(&board(2, 2)));
    }

    #[test]
    fn test_generate_invalid_channel() {
        assert_eq!(
            Err(ConfigError::InvalidChannel("right", 5)),
            generate(&board(1, 5))
        );
    }

    #[test]
    fn test_generate_timer_and_frequency() {
        let mut conf = board(1, 2);
        conf.pwm.frequency = 0;
        assert_eq!(Err(ConfigError::ZeroFrequency), generate(&conf));
        conf.pwm.timer = String::new();
        assert_eq!(Err(ConfigError::MissingTimer), generate(&conf));
    }

    #[test]
    fn test_board_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../board/app/config/config.toml");
        assert!(path.exists());
        let conf = load(&path).unwrap();
        assert_eq!(1, conf.motors.get_left().get_channel());
        assert_eq!(2, conf.motors.get_right().get_channel());
        let code = generate(&conf).unwrap();
        assert!(code.contains("Some(PwmPin::new_ch1(left, OutputType::PushPull))"));
        assert!(code.contains("Some(PwmPin::new_ch2(right, OutputType::PushPull))"));
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            "Motor left PWM channel must be between 1 and 4",
            ConfigError::InvalidChannel("left", 0).to_string()
        );
        assert_eq!(
            "Both motors are on PWM channel 2",
            ConfigError::SharedChannel(2).to_string()
        );
    }
}
