use std::io::{self, BufRead, Write};
use std::io::ErrorKind::{InvalidData, InvalidInput};
use std::time::Duration;

use vcd::{self, SimulationCommand, TimescaleUnit, Value};

use irstrip_shared::pulse::{coalesce, Pulse};
use irstrip_shared::transmit::IrLine;

/// Output line that records to a VCD file instead of a pin.
///
/// Time is virtual: `hold` advances the timestamp without sleeping.
pub struct VcdLine<W: Write> {
    vcd: vcd::Writer<W>,
    wire_id: vcd::IdCode,
    timestamp: u64,
    level: bool,
}

impl<W: Write> VcdLine<W> {
    pub fn new(w: W) -> io::Result<Self> {
        let mut writer = vcd::Writer::new(w);

        // Write the header
        writer.timescale(1, TimescaleUnit::NS)?;
        writer.add_module("top")?;
        let wire_id = writer.add_wire(1, "ir")?;
        writer.upscope()?;
        writer.enddefinitions()?;

        // Write the initial values
        writer.begin(SimulationCommand::Dumpvars)?;
        writer.change_scalar(wire_id, Value::V0)?;
        writer.end()?;

        Ok(VcdLine {
            vcd: writer,
            wire_id,
            timestamp: 0,
            level: false,
        })
    }
}

impl<W: Write> IrLine for VcdLine<W> {
    fn set_level(&mut self, high: bool) -> io::Result<()> {
        if high == self.level {
            return Ok(());
        }

        self.vcd.timestamp(self.timestamp)?;
        let value = if high { Value::V1 } else { Value::V0 };
        self.vcd.change_scalar(self.wire_id, value)?;
        self.level = high;

        Ok(())
    }

    fn hold(&mut self, duration: Duration) {
        self.timestamp += duration.as_nanos() as u64;
    }
}

fn ns_per_tick(timescale: Option<(u32, TimescaleUnit)>) -> io::Result<u64> {
    let (ticks, unit) = match timescale {
        Some(ts) => ts,
        None => return Ok(1),
    };

    let unit_ns = match unit {
        TimescaleUnit::S => 1_000_000_000,
        TimescaleUnit::MS => 1_000_000,
        TimescaleUnit::US => 1_000,
        TimescaleUnit::NS => 1,
        _ => {
            return Err(io::Error::new(
                InvalidInput,
                format!("unsupported timescale {:?}", unit),
            ))
        }
    };

    Ok(u64::from(ticks) * unit_ns)
}

/// Read the `top.ir` wire of a VCD file as (level, duration) intervals.
///
/// The level after the last change has no known length and is dropped.
pub fn read_pulses<R: BufRead>(reader: R) -> io::Result<Vec<Pulse>> {
    let mut parser = vcd::Parser::new(reader);

    // Parse the header and find the wire
    let header = parser.parse_header()?;
    let data = header
        .find_var(&["top", "ir"])
        .ok_or_else(|| io::Error::new(InvalidInput, "no wire top.ir"))?
        .code;

    let scale = ns_per_tick(header.timescale)?;
    log::debug!("VCD timescale: {} ns per tick", scale);

    let mut current_ts = 0;
    let mut changes: Vec<(u64, bool)> = Vec::new();

    for command_result in parser {
        use vcd::Command::*;
        let command = command_result?;
        match command {
            ChangeScalar(i, v) if i == data => changes.push((current_ts, v == Value::V1)),
            Timestamp(ts) => current_ts = ts,
            _ => (),
        }
    }

    let mut pulses = Vec::with_capacity(changes.len());
    for w in changes.windows(2) {
        let ticks = w[1].0.checked_sub(w[0].0).ok_or_else(|| {
            io::Error::new(
                InvalidData,
                format!("timestamp {} goes back from {}", w[1].0, w[0].0),
            )
        })?;
        let ns = ticks
            .checked_mul(scale)
            .ok_or_else(|| io::Error::new(InvalidData, "interval too long"))?;

        pulses.push(Pulse {
            high: w[0].1,
            duration: Duration::from_nanos(ns),
        });
    }

    Ok(coalesce(pulses))
}

#[cfg(test)]
mod tests {
    use super::*;
    use irstrip_shared::nec::{self, Address};
    use irstrip_shared::transmit::Transmitter;

    use crate::playback::play_pulses;

    #[test]
    fn dump_decodes_back() {
        let mut buf = Vec::new();
        {
            let line = VcdLine::new(&mut buf).unwrap();
            let mut tx = Transmitter::new(line);
            let addr = Address::from(61184u16);
            tx.transmit(&nec::encode(addr, 7)).unwrap();
            tx.transmit(&nec::encode(addr, 3)).unwrap();

            // Two commands, three full frame periods each
            assert_eq!(
                tx.line().timestamp,
                6 * nec::FRAME_PERIOD.as_nanos() as u64
            );
        }

        let pulses = read_pulses(&buf[..]).unwrap();
        let cmds: Vec<u8> = play_pulses(&pulses).iter().map(|c| c.cmd).collect();
        assert_eq!(cmds, vec![7, 7, 7, 3, 3, 3]);
    }

    #[test]
    fn first_frame_timing() {
        let mut buf = Vec::new();
        {
            let line = VcdLine::new(&mut buf).unwrap();
            let frame = nec::encode(Address::Standard(0x10), 0x42);
            Transmitter::new(line).with_repeats(1).transmit(&frame).unwrap();
        }

        let pulses = read_pulses(&buf[..]).unwrap();
        assert_eq!(pulses[0], Pulse::mark(nec::LEADER_MARK));
        assert_eq!(pulses[1], Pulse::space(nec::LEADER_SPACE));
        assert_eq!(pulses.len(), nec::FRAME_LEN);
    }

    #[test]
    fn missing_wire() {
        let text = "$timescale 1 us $end\n$scope module top $end\n$var wire 1 ! data $end\n$upscope $end\n$enddefinitions $end\n";
        let err = read_pulses(text.as_bytes()).unwrap_err();
        assert_eq!(err.kind(), InvalidInput);
    }

    #[test]
    fn timescales() {
        assert_eq!(ns_per_tick(None).unwrap(), 1);
        assert_eq!(ns_per_tick(Some((25, TimescaleUnit::US))).unwrap(), 25_000);
        assert!(ns_per_tick(Some((1, TimescaleUnit::PS))).is_err());
    }

    #[test]
    fn timestamps_going_back() {
        let text = "$timescale 1 us $end\n$scope module top $end\n$var wire 1 ! ir $end\n$upscope $end\n$enddefinitions $end\n#0\n0!\n#9000\n1!\n#100\n0!\n";
        let err = read_pulses(text.as_bytes()).unwrap_err();
        assert_eq!(err.kind(), InvalidData);
    }
}
