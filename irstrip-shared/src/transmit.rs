use std::io;
use std::thread;
use std::time::{Duration, Instant};

use crate::nec;
use crate::pulse::PulseFrame;

/// Every frame is sent this many times
pub const REPEATS: usize = 3;

// Below this much remaining time the wait spins instead of sleeping
const SPIN_MARGIN: Duration = Duration::from_micros(200);

/// The output the transmitter drives.
///
/// `hold` measures from the previous interval boundary, not from the call,
/// so time spent setting the level does not stretch the interval.
pub trait IrLine {
    /// Drive the output high or low
    fn set_level(&mut self, high: bool) -> io::Result<()>;

    /// Block until `duration` has passed since the last boundary
    fn hold(&mut self, duration: Duration);

    /// Called before the first interval of every pass
    fn start(&mut self) {}
}

impl<L: IrLine + ?Sized> IrLine for &mut L {
    fn set_level(&mut self, high: bool) -> io::Result<()> {
        (**self).set_level(high)
    }

    fn hold(&mut self, duration: Duration) {
        (**self).hold(duration)
    }

    fn start(&mut self) {
        (**self).start()
    }
}

impl<L: IrLine + ?Sized> IrLine for Box<L> {
    fn set_level(&mut self, high: bool) -> io::Result<()> {
        (**self).set_level(high)
    }

    fn hold(&mut self, duration: Duration) {
        (**self).hold(duration)
    }

    fn start(&mut self) {
        (**self).start()
    }
}

/// Sleep for the bulk of the wait, then spin up to `deadline`
pub fn wait_until(deadline: Instant) {
    loop {
        let now = Instant::now();
        if now >= deadline {
            return;
        }
        let left = deadline - now;
        if left > SPIN_MARGIN {
            thread::sleep(left - SPIN_MARGIN);
        } else {
            std::hint::spin_loop();
        }
    }
}

pub struct Transmitter<L> {
    line: L,
    repeats: usize,
    period: Duration,
}

impl<L: IrLine> Transmitter<L> {
    pub fn new(line: L) -> Self {
        Transmitter {
            line,
            repeats: REPEATS,
            period: nec::FRAME_PERIOD,
        }
    }

    pub fn with_repeats(mut self, repeats: usize) -> Self {
        self.repeats = repeats;
        self
    }

    pub fn line(&self) -> &L {
        &self.line
    }

    pub fn into_inner(self) -> L {
        self.line
    }

    pub fn transmit(&mut self, frame: &PulseFrame) -> io::Result<()> {
        self.transmit_times(frame, self.repeats)
    }

    /// Send `frame` `times` times. An output error aborts the current pass
    /// and is returned as is.
    pub fn transmit_times(&mut self, frame: &PulseFrame, times: usize) -> io::Result<()> {
        let gap = self.period.checked_sub(frame.duration()).unwrap_or_default();

        for pass in 0..times {
            log::trace!("Pass {} of {}", pass + 1, times);

            self.line.start();
            for pulse in frame {
                self.line.set_level(pulse.high)?;
                self.line.hold(pulse.duration);
            }

            // Keep the line quiet until the next frame period
            self.line.set_level(false)?;
            self.line.hold(gap);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nec::{self, Address};
    use crate::pulse::Pulse;

    #[derive(Default)]
    struct Recorder {
        level: bool,
        pulses: Vec<Pulse>,
        starts: usize,
        fail_after: Option<usize>,
        writes: usize,
    }

    impl IrLine for Recorder {
        fn set_level(&mut self, high: bool) -> io::Result<()> {
            self.writes += 1;
            if let Some(limit) = self.fail_after {
                if self.writes > limit {
                    return Err(io::Error::new(io::ErrorKind::Other, "pin gone"));
                }
            }
            self.level = high;
            Ok(())
        }

        fn hold(&mut self, duration: Duration) {
            self.pulses.push(Pulse {
                high: self.level,
                duration,
            });
        }

        fn start(&mut self) {
            self.starts += 1;
        }
    }

    #[test]
    fn three_identical_passes() {
        let frame = nec::encode(Address::from(61184u16), 7);
        let mut tx = Transmitter::new(Recorder::default());
        tx.transmit(&frame).unwrap();

        let rec = tx.into_inner();
        assert_eq!(rec.starts, REPEATS);
        assert_eq!(rec.pulses.len(), REPEATS * (nec::FRAME_LEN + 1));

        for pass in rec.pulses.chunks(nec::FRAME_LEN + 1) {
            assert_eq!(&pass[..nec::FRAME_LEN], frame.pulses());
            let gap = pass[nec::FRAME_LEN];
            assert!(!gap.high);
            assert_eq!(frame.duration() + gap.duration, nec::FRAME_PERIOD);
        }
    }

    #[test]
    fn line_ends_low() {
        let frame = nec::encode(Address::Standard(1), 2);
        let mut tx = Transmitter::new(Recorder::default()).with_repeats(1);
        tx.transmit(&frame).unwrap();
        assert!(!tx.line().level);
        assert_eq!(tx.line().pulses.len(), nec::FRAME_LEN + 1);
    }

    #[test]
    fn output_error_aborts() {
        let frame = nec::encode(Address::Standard(1), 2);
        let rec = Recorder {
            fail_after: Some(10),
            ..Default::default()
        };
        let mut tx = Transmitter::new(rec);

        let err = tx.transmit(&frame).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::Other);

        // Nothing after the failing write, no second pass
        let rec = tx.into_inner();
        assert_eq!(rec.pulses.len(), 10);
        assert_eq!(rec.starts, 1);
    }

    #[test]
    fn wait_until_reaches_deadline() {
        let start = Instant::now();
        let deadline = start + Duration::from_millis(3);
        wait_until(deadline);
        assert!(Instant::now() >= deadline);

        // A deadline in the past returns at once
        wait_until(start);
    }
}
