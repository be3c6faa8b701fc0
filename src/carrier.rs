use anyhow::Context;
use rppal::pwm::{Channel, Polarity, Pwm};

pub const CARRIER_HZ: f64 = 38_000.0;

/// The PWM pin sinks the LED cathode, so the LED conducts while the pin is
/// low: one third of each carrier cycle.
pub const CARRIER_DUTY: f64 = 2.0 / 3.0;

/// 38 kHz square wave on the LED cathode. Runs from startup until dropped.
pub struct Carrier {
    pwm: Pwm,
}

pub fn channel(n: u8) -> anyhow::Result<Channel> {
    match n {
        0 => Ok(Channel::Pwm0),
        1 => Ok(Channel::Pwm1),
        _ => anyhow::bail!("No PWM channel {}", n),
    }
}

impl Carrier {
    pub fn start(channel_num: u8) -> anyhow::Result<Self> {
        let pwm = Pwm::with_frequency(
            channel(channel_num)?,
            CARRIER_HZ,
            CARRIER_DUTY,
            Polarity::Normal,
            true,
        )
        .with_context(|| format!("Failed to configure PWM channel {}", channel_num))?;

        let carrier = Carrier { pwm };
        log::info!(
            "Carrier on PWM{}: {} Hz, duty {:.2}",
            channel_num,
            carrier.frequency(),
            CARRIER_DUTY
        );
        Ok(carrier)
    }

    pub fn frequency(&self) -> f64 {
        self.pwm.frequency().unwrap_or(CARRIER_HZ)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channels() {
        assert_eq!(channel(0).unwrap(), Channel::Pwm0);
        assert_eq!(channel(1).unwrap(), Channel::Pwm1);
        assert!(channel(2).is_err());
    }

    #[test]
    fn led_lit_a_third_of_the_cycle() {
        assert!(((1.0 - CARRIER_DUTY) - 1.0 / 3.0).abs() < 1e-9);
    }
}
