use std::convert::TryFrom;
use std::time::Duration;

/// One interval of a frame: the output level and how long it is held
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Pulse {
    pub high: bool,
    pub duration: Duration,
}

impl Pulse {
    pub const fn mark(duration: Duration) -> Self {
        Pulse { high: true, duration }
    }

    pub const fn space(duration: Duration) -> Self {
        Pulse { high: false, duration }
    }
}

/// An encoded transmission, built once per command and never modified
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PulseFrame {
    pulses: Vec<Pulse>,
}

impl PulseFrame {
    pub(crate) fn new(pulses: Vec<Pulse>) -> Self {
        PulseFrame { pulses }
    }

    pub fn pulses(&self) -> &[Pulse] {
        &self.pulses
    }

    pub fn len(&self) -> usize {
        self.pulses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pulses.is_empty()
    }

    /// Total time from the first edge to the end of the last interval
    pub fn duration(&self) -> Duration {
        self.pulses.iter().map(|p| p.duration).sum()
    }
}

impl<'a> IntoIterator for &'a PulseFrame {
    type Item = &'a Pulse;
    type IntoIter = std::slice::Iter<'a, Pulse>;

    fn into_iter(self) -> Self::IntoIter {
        self.pulses.iter()
    }
}

/// Merge neighbouring intervals at the same level and drop empty ones
pub fn coalesce<I: IntoIterator<Item = Pulse>>(pulses: I) -> Vec<Pulse> {
    let mut res: Vec<Pulse> = Vec::new();

    for pulse in pulses {
        if pulse.duration.as_nanos() == 0 {
            continue;
        }
        match res.last_mut() {
            Some(last) if last.high == pulse.high => last.duration += pulse.duration,
            _ => res.push(pulse),
        }
    }

    res
}

/// Time between edges in microseconds, starting with a rising edge.
///
/// Even positions are rising edges and odd positions falling ones, the layout
/// infrared receivers read from a capture buffer. A train that starts with a
/// mark gets an empty leading space.
pub fn edge_deltas(pulses: &[Pulse]) -> Vec<u32> {
    let pulses = coalesce(pulses.iter().cloned());
    let mut res = Vec::with_capacity(pulses.len() + 1);

    if pulses.first().map_or(false, |p| p.high) {
        res.push(0);
    }

    for pulse in pulses {
        let us = (pulse.duration.as_nanos() + 500) / 1_000;
        res.push(u32::try_from(us).unwrap_or(u32::MAX));
    }

    res
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coalesce_merges_levels() {
        let us = Duration::from_micros;
        let merged = coalesce(vec![
            Pulse::mark(us(10)),
            Pulse::mark(us(5)),
            Pulse::space(us(0)),
            Pulse::space(us(20)),
            Pulse::space(us(1)),
            Pulse::mark(us(3)),
        ]);

        assert_eq!(
            merged,
            vec![Pulse::mark(us(15)), Pulse::space(us(21)), Pulse::mark(us(3))]
        );
    }

    #[test]
    fn frame_duration() {
        let frame = PulseFrame::new(vec![
            Pulse::mark(Duration::from_millis(9)),
            Pulse::space(Duration::from_micros(4_500)),
        ]);
        assert_eq!(frame.duration(), Duration::from_micros(13_500));
        assert_eq!(frame.len(), 2);
        assert!(!frame.is_empty());
    }

    #[test]
    fn deltas_start_on_a_rising_edge() {
        let us = Duration::from_micros;
        let deltas = edge_deltas(&[
            Pulse::mark(us(9_000)),
            Pulse::space(us(4_000)),
            Pulse::space(us(500)),
            Pulse::mark(Duration::from_nanos(562_500)),
        ]);
        assert_eq!(deltas, vec![0, 9_000, 4_500, 563]);

        let deltas = edge_deltas(&[Pulse::space(us(40)), Pulse::mark(us(10))]);
        assert_eq!(deltas, vec![40, 10]);

        assert!(edge_deltas(&[]).is_empty());
        assert_eq!(edge_deltas(&[Pulse::space(Duration::from_secs(5_000))]), vec![u32::MAX]);
    }
}
