#![no_std]
#![no_main]

use app::ext::{peripherals_init, pwm_init, PwmTimer};
use app::{init_output_pin, OutputPinWrapper, PinName, SimplePwmWrapper};
use dcmot::{MotorDriver, MotorParams};
use defmt::{error, info};
use embassy_executor::Spawner;
use embassy_stm32::gpio::Pin;
use embassy_stm32::timer::Channel as TimerChannel;
use embassy_stm32::Peripheral;
use embassy_sync::blocking_mutex::raw::ThreadModeRawMutex;
use embassy_sync::mutex::Mutex;
use embassy_time::{Duration, Timer};

use {defmt_rtt as _, panic_probe as _};

type Pwm = SimplePwmWrapper<'static, PwmTimer>;
type Motor = MotorDriver<TimerChannel, OutputPinWrapper<'static>>;

const LEFT_LABEL: &str = "LEFT";
const RIGHT_LABEL: &str = "RIGHT";

const RAMP_STEPS: i32 = 10;
const RAMP_STEP_DELAY: Duration = Duration::from_millis(200);
const BRAKE_DURATION: Duration = Duration::from_millis(500);
const PAUSE: Duration = Duration::from_secs(1);

// both motors run off the same timer
static PWM: Mutex<ThreadModeRawMutex, Option<Pwm>> = Mutex::new(None);

async fn with_pwm<F: FnOnce(&mut Pwm)>(f: F) {
    let mut pwm = PWM.lock().await;
    if let Some(pwm) = pwm.as_mut() {
        f(pwm);
    }
}

async fn ramp(label: &str, motor: &mut Motor, from: i32, to: i32) {
    let resolution = i32::from(motor.resolution().unwrap_or(dcmot::DEFAULT_RESOLUTION));
    let step = (resolution / RAMP_STEPS).max(1);
    let step = if to < from { -step } else { step };
    let mut speed = from;
    loop {
        with_pwm(|pwm| motor.set(speed, pwm)).await;
        info!("[{}] speed {} -> {}", label, speed, motor.state());
        if speed == to {
            break;
        }
        speed = if step > 0 { (speed + step).min(to) } else { (speed + step).max(to) };
        Timer::after(RAMP_STEP_DELAY).await;
    }
}

#[embassy_executor::task(pool_size = 2)]
async fn motor_task(label: &'static str, mut motor: Motor, limit: u8) {
    info!("Starting {} motor loop", label);
    with_pwm(|pwm| motor.limit(limit, &*pwm)).await;
    info!("[{}] limit {}% ceiling {}", label, limit, motor.ceiling());

    let resolution = i32::from(motor.resolution().unwrap_or(dcmot::DEFAULT_RESOLUTION));
    loop {
        ramp(label, &mut motor, 0, resolution).await;
        with_pwm(|pwm| motor.ebreak((resolution / 2).unsigned_abs(), pwm)).await;
        info!("[{}] braking {}", label, motor.state());
        Timer::after(BRAKE_DURATION).await;

        ramp(label, &mut motor, 0, -resolution).await;
        with_pwm(|pwm| motor.stop(pwm)).await;
        info!("[{}] coasting", label);
        Timer::after(PAUSE).await;
    }
}

fn init_motor<A, B>(
    label: &str,
    pwm_pin: PinName,
    a: A,
    b: B,
    resolution: u16,
    pwm: &mut Pwm,
) -> Option<Motor>
where
    A: Peripheral<P = A> + Pin,
    B: Peripheral<P = B> + Pin,
{
    let params = MotorParams::new(pwm_pin, init_output_pin!(a), init_output_pin!(b))
        .with_resolution(resolution);

    match Motor::new(params, pwm) {
        Ok(motor) => {
            info!("[{}] bound to {}", label, pwm_pin);
            Some(motor)
        }
        Err(e) => {
            error!("[{}] cannot bind motor: {}", label, e);
            None
        }
    }
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_stm32::init(Default::default());
    let config = peripherals_init(p);

    let left_pwm_pin = PinName::of(&config.left.pwm);
    let right_pwm_pin = PinName::of(&config.right.pwm);

    // each PWM pin goes on the channel set in config.toml
    let pwm = pwm_init(
        config.pwm.timer,
        config.left.pwm,
        config.right.pwm,
        config.pwm.frequency,
    );
    let mut pwm = SimplePwmWrapper::new(pwm)
        .with_route(left_pwm_pin, config.left.channel)
        .with_route(right_pwm_pin, config.right.channel);

    let left = init_motor(
        LEFT_LABEL,
        left_pwm_pin,
        config.left.a,
        config.left.b,
        config.left.resolution,
        &mut pwm,
    );
    let right = init_motor(
        RIGHT_LABEL,
        right_pwm_pin,
        config.right.a,
        config.right.b,
        config.right.resolution,
        &mut pwm,
    );

    {
        let mut pwm_global = PWM.lock().await;
        pwm_global.replace(pwm);
    }

    if let Some(motor) = left {
        spawner
            .spawn(motor_task(LEFT_LABEL, motor, config.left.limit))
            .unwrap();
    }
    if let Some(motor) = right {
        spawner
            .spawn(motor_task(RIGHT_LABEL, motor, config.right.limit))
            .unwrap();
    }
}
