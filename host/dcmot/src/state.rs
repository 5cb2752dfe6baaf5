use common::Level;

/// What the H-bridge is doing, as selected by the two direction inputs.
///
/// The payload is the compare value written to the PWM channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-log", derive(defmt::Format))]
pub enum MotorState {
    /// Both inputs low, the motor coasts.
    Idle,
    Forward(u64),
    Reverse(u64),
    /// Both inputs high, short brake.
    Braking(u64),
}

impl MotorState {
    /// Levels of the A and B direction pins.
    pub fn levels(&self) -> (Level, Level) {
        match self {
            MotorState::Idle => (Level::Low, Level::Low),
            MotorState::Forward(_) => (Level::Low, Level::High),
            MotorState::Reverse(_) => (Level::High, Level::Low),
            MotorState::Braking(_) => (Level::High, Level::High),
        }
    }

    pub fn duty(&self) -> u64 {
        match self {
            MotorState::Idle => 0,
            MotorState::Forward(duty) | MotorState::Reverse(duty) | MotorState::Braking(duty) => {
                *duty
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels() {
        assert_eq!((Level::Low, Level::Low), MotorState::Idle.levels());
        assert_eq!((Level::Low, Level::High), MotorState::Forward(10).levels());
        assert_eq!((Level::High, Level::Low), MotorState::Reverse(10).levels());
        assert_eq!((Level::High, Level::High), MotorState::Braking(10).levels());
    }

    #[test]
    fn test_forward_reverse_levels_are_swapped() {
        let (fa, fb) = MotorState::Forward(1).levels();
        let (ra, rb) = MotorState::Reverse(1).levels();
        assert_eq!(fa, rb);
        assert_eq!(fb, ra);
    }

    #[test]
    fn test_duty() {
        assert_eq!(0, MotorState::Idle.duty());
        assert_eq!(250, MotorState::Forward(250).duty());
        assert_eq!(125, MotorState::Reverse(125).duty());
        assert_eq!(50, MotorState::Braking(50).duty());
    }
}
