use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::Context;
use infrared::protocol::{nec::Nec16Command, Nec16};
use infrared::receiver::{DecoderFactory, ProtocolDecoder};

use irstrip_shared::pulse::{edge_deltas, Pulse};

use crate::vcdutils::read_pulses;

/// Edge deltas are in microseconds
const RESOLUTION: u32 = 1_000_000;

pub fn command_decode(path: &Path) -> anyhow::Result<()> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let pulses = read_pulses(BufReader::new(file))
        .with_context(|| format!("Failed to read {}", path.display()))?;

    log::debug!("{} intervals in {}", pulses.len(), path.display());

    let cmds = play_pulses(&pulses);
    if cmds.is_empty() {
        println!("No command decoded");
    }

    for cmd in cmds {
        println!("Addr: {:#06x}\tCmd: {}", cmd.addr, cmd.cmd);
    }

    Ok(())
}

/// Run a pulse train through an NEC receiver and collect the commands found.
/// Repeat codes and frames the receiver rejects are skipped.
pub fn play_pulses(pulses: &[Pulse]) -> Vec<Nec16Command> {
    let mut decoder = <Nec16 as DecoderFactory<u32>>::decoder(RESOLUTION);
    let mut res = Vec::new();

    for (i, dt) in edge_deltas(pulses).into_iter().enumerate() {
        let rising = i % 2 == 0;
        match decoder.event_total(rising, dt) {
            Ok(Some(cmd)) if !cmd.repeat => res.push(cmd),
            Ok(_) => (),
            Err(err) => log::debug!("Edge {}: {:?}", i, err),
        }
    }

    res
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use irstrip_shared::nec::{self, Address};

    #[test]
    fn frames_between_noise() {
        let addr = Address::from(61184u16);
        let us = Duration::from_micros;

        let mut train = vec![
            Pulse::space(us(3_000)),
            Pulse::mark(us(700)),
            Pulse::space(us(2_000)),
        ];
        train.extend_from_slice(nec::encode(addr, 7).pulses());
        // A leader followed by garbage
        train.push(Pulse::space(us(30_000)));
        train.extend_from_slice(&nec::encode(addr, 9).pulses()[..6]);
        train.push(Pulse::space(us(7_000)));
        train.push(Pulse::mark(us(560)));
        train.push(Pulse::space(us(40_000)));
        train.extend_from_slice(nec::encode(addr, 3).pulses());

        let cmds: Vec<(u16, u8)> = play_pulses(&train).iter().map(|c| (c.addr, c.cmd)).collect();
        assert_eq!(cmds, vec![(0xEF00, 7), (0xEF00, 3)]);
    }

    #[test]
    fn nothing_in_silence() {
        assert!(play_pulses(&[Pulse::space(Duration::from_secs(1))]).is_empty());
        assert!(play_pulses(&[]).is_empty());
    }
}
