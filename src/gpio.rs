use std::io;
use std::time::{Duration, Instant};

use rppal::gpio::{Gpio, OutputPin};

use irstrip_shared::transmit::{wait_until, IrLine};

/// LED anode pin, driven with the frame bits
pub struct GpioLine {
    pin: OutputPin,
    edge: Instant,
}

impl GpioLine {
    pub fn open(gpio: &Gpio, bcm: u8) -> Result<Self, rppal::gpio::Error> {
        let pin = gpio.get(bcm)?.into_output_low();

        Ok(GpioLine {
            pin,
            edge: Instant::now(),
        })
    }
}

impl IrLine for GpioLine {
    fn set_level(&mut self, high: bool) -> io::Result<()> {
        if high {
            self.pin.set_high();
        } else {
            self.pin.set_low();
        }
        Ok(())
    }

    fn hold(&mut self, duration: Duration) {
        // Deadlines chain off each other so late wakeups do not accumulate
        let deadline = self.edge + duration;
        wait_until(deadline);
        self.edge = deadline;
    }

    fn start(&mut self) {
        self.edge = Instant::now();
    }
}
