//! Per-millisecond packet delivery schedules
//!
//! Each bandwidth sample covers one period. The bytes the link may carry in
//! that period are rounded up to whole packets, and the packets are spread
//! over the milliseconds of the period: every slot gets the integer share,
//! and the leftover packets are handed out by a stride walk that favours
//! earlier slots.

use crate::config::PrepareConfig;
use crate::error::{Result, TraceError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScheduleParams {
    /// Milliseconds covered by one bandwidth sample
    pub period_ms: u32,
    /// Bytes per emulated packet
    pub packet_size_bytes: u32,
}

impl Default for ScheduleParams {
    fn default() -> Self {
        Self {
            period_ms: 30,
            packet_size_bytes: 1500,
        }
    }
}

impl From<&PrepareConfig> for ScheduleParams {
    fn from(config: &PrepareConfig) -> Self {
        Self {
            period_ms: config.period_ms,
            packet_size_bytes: config.packet_size_bytes,
        }
    }
}

impl ScheduleParams {
    /// Bytes a link of `bandwidth_mbps` transmits in one period
    pub fn transmit_bytes(&self, bandwidth_mbps: f64) -> f64 {
        bandwidth_mbps * 1000.0 * self.period_ms as f64 / 8.0
    }

    /// Whole packets needed to carry one period's bytes, rounded up
    pub fn total_packets(&self, bandwidth_mbps: f64) -> u64 {
        (self.transmit_bytes(bandwidth_mbps) / self.packet_size_bytes as f64).ceil() as u64
    }
}

/// Spread `total` packets over `period_ms` slots
pub fn spread_packets(total: u64, period_ms: u32) -> Vec<u64> {
    let period = period_ms as u64;
    let base = total / period;
    let mut slots = vec![base; period_ms as usize];
    let mut remainder = total - base * period;

    // remainder < period here, so the stride is at least 1
    while remainder > 0 {
        let stride = (period / remainder) as usize;
        for slot in slots.iter_mut().step_by(stride) {
            if remainder == 0 {
                break;
            }
            *slot += 1;
            remainder -= 1;
        }
    }

    slots
}

/// Packet counts for every millisecond of one period
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PeriodSchedule {
    /// Absolute time of the period start in milliseconds
    pub start_ms: u64,
    pub slots: Vec<u64>,
}

impl PeriodSchedule {
    pub fn total_packets(&self) -> u64 {
        self.slots.iter().sum()
    }

    /// Delivery timestamps, one per packet; slot `i` maps to `start_ms + i + 1`
    pub fn timestamps(&self) -> impl Iterator<Item = u64> + '_ {
        self.slots.iter().enumerate().flat_map(move |(i, &count)| {
            std::iter::repeat(self.start_ms + i as u64 + 1).take(count as usize)
        })
    }
}

/// Build the schedule for every bandwidth sample, back to back from time 0
pub fn build_schedules(bandwidth: &[f64], params: ScheduleParams) -> Result<Vec<PeriodSchedule>> {
    let mut time_base = 0u64;
    let mut schedules = Vec::with_capacity(bandwidth.len());

    for (period, &sample) in bandwidth.iter().enumerate() {
        if !sample.is_finite() || sample < 0.0 {
            return Err(TraceError::InvalidBandwidth {
                period,
                value: sample,
            });
        }

        let total = params.total_packets(sample);
        schedules.push(PeriodSchedule {
            start_ms: time_base,
            slots: spread_packets(total, params.period_ms),
        });
        time_base += params.period_ms as u64;
    }

    Ok(schedules)
}
