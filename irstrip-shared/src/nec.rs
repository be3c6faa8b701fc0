//! NEC remote control protocol
//!
//! A frame is a leader, 32 data bits sent least significant bit first and a
//! stop mark. The data bits are the address (two bytes), the command and the
//! complement of the command. Every bit is a fixed mark followed by a short
//! (zero) or long (one) space.

use std::time::Duration;

use crate::pulse::{Pulse, PulseFrame};

pub const LEADER_MARK: Duration = Duration::from_micros(9_000);
pub const LEADER_SPACE: Duration = Duration::from_micros(4_500);
pub const BIT_MARK: Duration = Duration::from_nanos(562_500);
pub const ZERO_SPACE: Duration = Duration::from_nanos(562_500);
pub const ONE_SPACE: Duration = Duration::from_nanos(1_687_500);
pub const STOP_MARK: Duration = BIT_MARK;

/// Time from one leader to the next when a frame is repeated
pub const FRAME_PERIOD: Duration = Duration::from_millis(108);

/// Pulses in a frame: leader mark and space, 32 bits, stop mark
pub const FRAME_LEN: usize = 2 + 32 * 2 + 1;

/// Address of the emulated remote
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Address {
    /// Sent as the address byte followed by its complement
    Standard(u8),
    /// Sent verbatim, low byte first
    Extended(u16),
}

impl Address {
    pub fn bytes(self) -> [u8; 2] {
        match self {
            Address::Standard(addr) => [addr, !addr],
            Address::Extended(addr) => addr.to_le_bytes(),
        }
    }

    /// The 16 bits as they appear on the wire
    pub fn as_u16(self) -> u16 {
        u16::from_le_bytes(self.bytes())
    }
}

impl From<u8> for Address {
    fn from(addr: u8) -> Self {
        Address::Standard(addr)
    }
}

impl From<u16> for Address {
    /// A value whose high byte complements its low byte is a standard address
    fn from(addr: u16) -> Self {
        let [lo, hi] = addr.to_le_bytes();
        if hi == !lo {
            Address::Standard(lo)
        } else {
            Address::Extended(addr)
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct NecCommand {
    pub addr: Address,
    pub cmd: u8,
}

impl NecCommand {
    /// Wider command values must be truncated by the caller (`value as u8`)
    pub fn new<A: Into<Address>>(addr: A, cmd: u8) -> Self {
        NecCommand {
            addr: addr.into(),
            cmd,
        }
    }

    /// The four data bytes; both complements are computed here
    pub fn to_bytes(&self) -> [u8; 4] {
        let [a0, a1] = self.addr.bytes();
        [a0, a1, self.cmd, !self.cmd]
    }

    pub fn bits(&self) -> u32 {
        u32::from_le_bytes(self.to_bytes())
    }

    pub fn encode(&self) -> PulseFrame {
        let bits = self.bits();
        let mut pulses = Vec::with_capacity(FRAME_LEN);

        pulses.push(Pulse::mark(LEADER_MARK));
        pulses.push(Pulse::space(LEADER_SPACE));

        for i in 0..32 {
            let space = if bits & (1 << i) != 0 {
                ONE_SPACE
            } else {
                ZERO_SPACE
            };
            pulses.push(Pulse::mark(BIT_MARK));
            pulses.push(Pulse::space(space));
        }

        pulses.push(Pulse::mark(STOP_MARK));

        PulseFrame::new(pulses)
    }
}

/// Encode `cmd` as sent by the remote at `addr`
pub fn encode(addr: Address, cmd: u8) -> PulseFrame {
    NecCommand { addr, cmd }.encode()
}
