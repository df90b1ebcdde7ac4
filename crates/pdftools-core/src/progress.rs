//! Staged progress reporting
//!
//! Every pipeline writes `(stage, percent)` events into a [`Progress`]. The
//! reporter guarantees that percentages never go backwards and that the last
//! event of a finished operation is exactly 100. Stage labels are meant for
//! display only.

use crossbeam_channel::{Receiver, Sender};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressEvent {
    pub stage: String,
    pub percent: u8,
}

enum Sink<'a> {
    Silent,
    Callback(Box<dyn FnMut(&ProgressEvent) + 'a>),
    Channel(Sender<ProgressEvent>),
}

/// Progress reporter for a single operation
pub struct Progress<'a> {
    sink: Sink<'a>,
    last: u8,
}

impl<'a> Progress<'a> {
    /// Reporter that drops every event
    pub fn none() -> Self {
        Self {
            sink: Sink::Silent,
            last: 0,
        }
    }

    /// Reporter that invokes `callback` for each event
    pub fn from_fn<F>(callback: F) -> Self
    where
        F: FnMut(&ProgressEvent) + 'a,
    {
        Self {
            sink: Sink::Callback(Box::new(callback)),
            last: 0,
        }
    }

    /// Reporter that sends each event down a channel. A disconnected
    /// receiver is ignored; the operation still runs to completion.
    pub fn channel(sender: Sender<ProgressEvent>) -> Self {
        Self {
            sink: Sink::Channel(sender),
            last: 0,
        }
    }

    /// Emit a stage. Values below the last reported percent are raised to it
    /// and values above 100 are capped.
    pub fn report(&mut self, stage: impl Into<String>, percent: u8) {
        let percent = percent.min(100).max(self.last);
        self.last = percent;
        let event = ProgressEvent {
            stage: stage.into(),
            percent,
        };
        tracing::trace!(stage = %event.stage, percent = event.percent, "progress");

        match &mut self.sink {
            Sink::Silent => {}
            Sink::Callback(callback) => callback(&event),
            Sink::Channel(sender) => {
                let _ = sender.send(event);
            }
        }
    }

    /// Emit step `index` of `total` linearly mapped into `[start, end]`.
    pub fn report_step(
        &mut self,
        stage: impl Into<String>,
        index: usize,
        total: usize,
        start: u8,
        end: u8,
    ) {
        self.report(stage, interpolate(index, total, start, end));
    }

    pub fn finish(&mut self) {
        self.report("Complete", 100);
    }

    pub fn last_percent(&self) -> u8 {
        self.last
    }
}

impl Default for Progress<'_> {
    fn default() -> Self {
        Self::none()
    }
}

/// Unbounded channel for [`Progress::channel`]
pub fn channel() -> (Sender<ProgressEvent>, Receiver<ProgressEvent>) {
    crossbeam_channel::unbounded()
}

/// Map `index / total` into the band `[start, end]`.
pub fn interpolate(index: usize, total: usize, start: u8, end: u8) -> u8 {
    if total == 0 || end <= start {
        return end.max(start);
    }
    let span = (end - start) as usize;
    let offset = span * index.min(total) / total;
    start + offset as u8
}
