//! Stream dispatcher: the per-session state machine.
//!
//! A `Session` owns the station aggregate and the as-of cursor. Sessions never
//! share state; build a fresh one per stream.

use crate::event::{self, Command, ControlEvent, InputEvent, SampleEvent, ValidationError};
use crate::output::{self, Output};
use crate::station::Stations;
use serde_json::Value;
use tracing::{debug, error, info};

#[derive(Debug, Clone)]
pub struct Session {
    stations: Stations,
    /// Timestamp of the most recently accepted sample; None before the first
    /// sample and after a reset.
    cursor: Option<i64>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            stations: Stations::new(),
            cursor: None,
        }
    }

    pub fn stations(&self) -> &Stations {
        &self.stations
    }

    pub fn cursor(&self) -> Option<i64> {
        self.cursor
    }

    /// Validate a raw record and apply it.
    pub fn ingest(&mut self, raw: &Value) -> Result<Option<Output>, ValidationError> {
        match event::validate(raw) {
            Ok(event) => Ok(self.handle(event)),
            Err(err) => {
                error!(
                    kind = err.kind,
                    fields = ?err.fields(),
                    issues = err.issues().len(),
                    "validation error: {}",
                    err
                );
                Err(err)
            }
        }
    }

    /// Apply one validated event. Returns at most one output.
    pub fn handle(&mut self, event: InputEvent) -> Option<Output> {
        match event {
            InputEvent::Sample(sample) => Some(self.on_sample(sample)),
            InputEvent::Control(ControlEvent { command }) => self.on_command(&command),
        }
    }

    /// Pull-based adapter over a record source.
    pub fn process<I>(self, records: I) -> Dispatcher<I::IntoIter>
    where
        I: IntoIterator<Item = Value>,
    {
        Dispatcher {
            records: records.into_iter(),
            session: self,
            consumed: 0,
        }
    }

    fn on_sample(&mut self, sample: SampleEvent) -> Output {
        info!(
            station = %sample.station_name,
            timestamp = sample.timestamp,
            temperature = sample.temperature,
            "sample"
        );

        let bounds = self.stations.merge(&sample.station_name, sample.temperature);
        debug!(high = bounds.high, low = bounds.low, "station bounds");
        // Timestamps are trusted as given, even when they go backwards.
        self.cursor = Some(sample.timestamp);
        Output::Sample(sample)
    }

    fn on_command(&mut self, command: &Command) -> Option<Output> {
        info!(command = %command, "control");

        match command {
            Command::Snapshot => match self.live_cursor() {
                Some(as_of) => Some(Output::Snapshot(output::build_snapshot(
                    &self.stations,
                    as_of,
                ))),
                None => {
                    debug!("snapshot requested with no samples; nothing to emit");
                    None
                }
            },
            Command::Reset => match self.live_cursor() {
                Some(as_of) => {
                    self.stations.clear();
                    self.cursor = None;
                    Some(Output::Reset(output::build_reset(as_of)))
                }
                None => {
                    debug!("reset requested on empty state; nothing to emit");
                    None
                }
            },
            Command::Other(raw) => {
                debug!(command = %raw, "command not implemented; ignoring");
                None
            }
        }
    }

    /// Cursor value, only when there is aggregated data behind it.
    fn live_cursor(&self) -> Option<i64> {
        if self.stations.is_empty() {
            return None;
        }
        self.cursor
    }
}

/// Lazily maps input records to outputs, one `next()` per emitted item.
///
/// Validation failures are yielded as `Err`; pulling again continues with the
/// following record, stopping is up to the caller.
#[derive(Debug)]
pub struct Dispatcher<I> {
    records: I,
    session: Session,
    consumed: usize,
}

impl<I> Dispatcher<I> {
    /// Number of input records pulled so far.
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// The record source, e.g. to ask it where the last record came from.
    pub fn records(&self) -> &I {
        &self.records
    }

    pub fn into_parts(self) -> (I, Session) {
        (self.records, self.session)
    }
}

impl<I> Iterator for Dispatcher<I>
where
    I: Iterator<Item = Value>,
{
    type Item = Result<Output, ValidationError>;

    fn next(&mut self) -> Option<Self::Item> {
        for raw in self.records.by_ref() {
            self.consumed += 1;
            match self.session.ingest(&raw) {
                Ok(Some(out)) => return Some(Ok(out)),
                Ok(None) => continue,
                Err(err) => return Some(Err(err)),
            }
        }
        None
    }
}
