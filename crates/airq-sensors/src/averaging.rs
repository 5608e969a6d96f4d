//! Multi-sample averaging for the particulate sensor.

use airq_core::ParticulateMeasurement;
use airq_core::constants::PM_CHANNEL_COUNT;

/// Per-channel running sum over N particulate samples.
///
/// ```
/// use airq_core::ParticulateMeasurement;
/// use airq_sensors::averaging::ParticulateAccumulator;
///
/// let mut acc = ParticulateAccumulator::new();
/// acc.push(&ParticulateMeasurement { mc_2p5: 10.0, ..Default::default() });
/// acc.push(&ParticulateMeasurement { mc_2p5: 20.0, ..Default::default() });
///
/// assert_eq!(acc.mean().unwrap().mc_2p5, 15.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ParticulateAccumulator {
    sums: [f64; PM_CHANNEL_COUNT],
    count: u32,
}

impl ParticulateAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sample: &ParticulateMeasurement) {
        for (sum, value) in self.sums.iter_mut().zip(sample.channels()) {
            *sum += value;
        }
        self.count += 1;
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    /// Arithmetic mean of every channel, or `None` before the first sample.
    pub fn mean(&self) -> Option<ParticulateMeasurement> {
        if self.count == 0 {
            return None;
        }
        let n = f64::from(self.count);
        Some(ParticulateMeasurement::from_channels(self.sums.map(|sum| sum / n)))
    }
}
