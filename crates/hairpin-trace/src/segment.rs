//! Fixed-length trace windows for split mode
//!
//! A long trace is cut into non-overlapping windows. Each window is rescaled
//! so its mean bandwidth hits a fixed target, windows with too few loss events
//! are dropped, and the remaining ones are thinned at random until exactly the
//! target number of lossy samples is left.

use crate::config::PrepareConfig;
use crate::error::{Result, TraceError};
use crate::Trace;
use rand::Rng;
use std::ops::Range;
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SegmentParams {
    /// Samples per window
    pub target_len: usize,
    /// Mean bandwidth of every emitted window
    pub target_mean: f64,
    /// Exact number of lossy samples per emitted window
    pub target_loss_events: usize,
}

impl Default for SegmentParams {
    fn default() -> Self {
        Self {
            target_len: 600,
            target_mean: 30.0,
            target_loss_events: 10,
        }
    }
}

impl From<&PrepareConfig> for SegmentParams {
    fn from(config: &PrepareConfig) -> Self {
        Self {
            target_len: config.target_trace_len,
            target_mean: config.target_mean_bandwidth,
            target_loss_events: config.target_loss_events,
        }
    }
}

/// One emitted window
#[derive(Clone, Debug, PartialEq)]
pub struct Window {
    /// Output number; counts emitted windows only
    pub split: usize,
    /// Position of the window among all candidate windows
    pub candidate: usize,
    /// Rescaled bandwidth
    pub bandwidth: Vec<f64>,
    /// Thinned loss rates
    pub loss_rate: Vec<f64>,
}

impl Window {
    pub fn loss_events(&self) -> usize {
        count_loss_events(&self.loss_rate)
    }
}

/// Candidate window ranges; a trailing partial window is left out
pub fn window_ranges(trace_len: usize, target_len: usize) -> Vec<Range<usize>> {
    if target_len == 0 {
        return Vec::new();
    }
    (0..trace_len / target_len)
        .map(|i| i * target_len..(i + 1) * target_len)
        .collect()
}

pub fn count_loss_events(loss_rate: &[f64]) -> usize {
    loss_rate.iter().filter(|&&l| l > 0.0).count()
}

/// Scale `bandwidth` so that its mean becomes `target_mean`
///
/// Returns `None` when the mean is zero.
pub fn rescale_bandwidth(bandwidth: &[f64], target_mean: f64) -> Option<Vec<f64>> {
    if bandwidth.is_empty() {
        return Some(Vec::new());
    }
    let mean = bandwidth.iter().sum::<f64>() / bandwidth.len() as f64;
    if mean == 0.0 {
        return None;
    }
    Some(bandwidth.iter().map(|b| b * target_mean / mean).collect())
}

/// Zero out lossy samples until exactly `target` remain
///
/// The walk cycles through the indices in order, flipping one coin per step;
/// a lossy sample is cleared when its coin comes up 0. Does nothing when
/// `target` or fewer lossy samples are present.
pub fn thin_loss_events<R: Rng>(loss_rate: &mut [f64], target: usize, rng: &mut R) {
    let mut remaining = count_loss_events(loss_rate);
    let mut index = 0;

    while remaining > target {
        let coin: u8 = rng.gen_range(0..2);
        if coin == 0 && loss_rate[index] > 0.0 {
            loss_rate[index] = 0.0;
            remaining -= 1;
        }
        index = (index + 1) % loss_rate.len();
    }
}

/// Splits traces into windows using a caller supplied random source
pub struct Segmenter<R> {
    params: SegmentParams,
    rng: R,
}

impl<R: Rng> Segmenter<R> {
    pub fn new(params: SegmentParams, rng: R) -> Self {
        Self { params, rng }
    }

    pub fn params(&self) -> &SegmentParams {
        &self.params
    }

    /// Produce every window that passes the loss filter, numbered from 0
    pub fn segment(&mut self, trace: &Trace) -> Result<Vec<Window>> {
        let bandwidth = trace.bandwidth();
        let loss_rate = trace.loss_rate();
        let mut windows = Vec::new();

        for (candidate, range) in window_ranges(trace.len(), self.params.target_len)
            .into_iter()
            .enumerate()
        {
            let events = count_loss_events(&loss_rate[range.clone()]);
            if events < self.params.target_loss_events {
                debug!(
                    "Window {} dropped: {} loss events, need {}",
                    candidate, events, self.params.target_loss_events
                );
                continue;
            }

            let adjusted = rescale_bandwidth(&bandwidth[range.clone()], self.params.target_mean)
                .ok_or(TraceError::ZeroMeanWindow { window: candidate })?;

            let mut thinned = loss_rate[range].to_vec();
            thin_loss_events(&mut thinned, self.params.target_loss_events, &mut self.rng);

            debug!(
                "Window {} kept as split {}: {} loss events thinned to {}",
                candidate,
                windows.len(),
                events,
                self.params.target_loss_events
            );
            windows.push(Window {
                split: windows.len(),
                candidate,
                bandwidth: adjusted,
                loss_rate: thinned,
            });
        }

        Ok(windows)
    }
}
