//! Routing of annotated read pairs to their pre-opened output destinations.

use std::io::{self, Write};

use log::{debug, warn};

use crate::classify::{Assignment, Classification};
use crate::error::{DemuxError, Result};
use crate::index::IndexSet;
use crate::reader::{FastqRecord, Stream};

/// A write-only output that must be closed explicitly to be complete.
pub trait Sink: Write {
    /// Flushes and finalizes the output.
    fn close(self) -> io::Result<()>;
}

/// Opens the sink for one side (`Stream::Read1` or `Stream::Read2`) of a destination.
pub trait SinkFactory {
    type Sink: Sink;

    fn open(&mut self, read: Stream, label: &str) -> io::Result<Self::Sink>;

    /// Name used in logs and errors for this sink, e.g. a file name.
    fn describe(&self, read: Stream, label: &str) -> String {
        format!("{read}_{label}")
    }
}

pub const HOPPED_LABEL: &str = "hopped";
pub const UNKNOWN_LABEL: &str = "unknown";

/// Destination label for reads matched to `index`.
pub fn matched_label(index: &str) -> String {
    format!("{index}-{index}")
}

struct Destination<S> {
    read1: S,
    read2: S,
    read1_name: String,
    read2_name: String,
}

impl<S: Sink> Destination<S> {
    fn write(&mut self, read1: &FastqRecord, read2: &FastqRecord, record: u64) -> Result<()> {
        read1.write_to(&mut self.read1).map_err(|source| DemuxError::Write {
            destination: self.read1_name.clone(),
            record,
            source,
        })?;
        read2.write_to(&mut self.read2).map_err(|source| DemuxError::Write {
            destination: self.read2_name.clone(),
            record,
            source,
        })
    }

    /// Closes both sides, reporting the first failure.
    fn close(self) -> Result<()> {
        let first = self.read1.close().map_err(|source| DemuxError::Close {
            destination: self.read1_name,
            source,
        });
        let second = self.read2.close().map_err(|source| DemuxError::Close {
            destination: self.read2_name,
            source,
        });
        first.and(second)
    }
}

/// Owns all `2 * (N + 2)` output sinks for a run.
///
/// Slots `0..N` are the matched destinations in index set order, followed by the hopped
/// and unknown destinations. Every sink is closed exactly once, either by [`close`] or,
/// on an early exit, when the router is dropped.
///
/// [`close`]: OutputRouter::close
pub struct OutputRouter<S: Sink> {
    destinations: Vec<Destination<S>>,
    matched_count: usize,
}

impl<S: Sink> OutputRouter<S> {
    /// Opens every destination up front. If any open fails, the sinks already opened are
    /// closed before the error is returned.
    pub fn open<F>(factory: &mut F, indexes: &IndexSet) -> Result<Self>
    where
        F: SinkFactory<Sink = S>,
    {
        let mut router =
            OutputRouter { destinations: Vec::with_capacity(indexes.len() + 2), matched_count: 0 };

        let labels = indexes
            .iter()
            .map(|(_, index)| matched_label(index))
            .chain([HOPPED_LABEL.to_owned(), UNKNOWN_LABEL.to_owned()]);
        for label in labels {
            let read1_name = factory.describe(Stream::Read1, &label);
            let read1 = factory.open(Stream::Read1, &label).map_err(|source| {
                DemuxError::OpenDestination { destination: read1_name.clone(), source }
            })?;
            let read2_name = factory.describe(Stream::Read2, &label);
            let read2 = match factory.open(Stream::Read2, &label) {
                Ok(sink) => sink,
                Err(source) => {
                    if let Err(e) = read1.close() {
                        warn!("Error closing {read1_name}: {e}");
                    }
                    return Err(DemuxError::OpenDestination { destination: read2_name, source });
                }
            };
            debug!("Opened {read1_name} and {read2_name}");
            router.destinations.push(Destination { read1, read2, read1_name, read2_name });
        }
        router.matched_count = indexes.len();
        Ok(router)
    }

    /// Number of open sinks.
    pub fn sink_count(&self) -> usize {
        self.destinations.len() * 2
    }

    /// Writes both annotated reads to the destination chosen by `assignment`, whose ids must
    /// come from the [`IndexSet`] the router was opened with.
    pub fn route(
        &mut self,
        assignment: &Assignment,
        read1: &FastqRecord,
        read2: &FastqRecord,
        record: u64,
    ) -> Result<()> {
        let slot = match *assignment {
            Assignment::Matched(id) => {
                debug_assert!(id.get() < self.matched_count, "{id:?} is not in the index set");
                id.get()
            }
            Assignment::Hopped { .. } => self.matched_count,
            Assignment::Unknown => self.matched_count + 1,
        };
        self.destinations[slot].write(read1, read2, record)
    }

    /// Appends the [`Classification`] tag to both read headers, then routes the pair.
    pub fn route_tagged(
        &mut self,
        classification: &Classification,
        read1: &mut FastqRecord,
        read2: &mut FastqRecord,
        record: u64,
    ) -> Result<()> {
        let tag = classification.tag();
        read1.annotate(&tag);
        read2.annotate(&tag);
        self.route(&classification.assignment, read1, read2, record)
    }

    /// Closes every sink, continuing past failures; returns the first one.
    pub fn close(mut self) -> Result<()> {
        let mut first_err = None;
        for destination in self.destinations.drain(..) {
            if let Err(e) = destination.close() {
                warn!("{e}");
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}

impl<S: Sink> Drop for OutputRouter<S> {
    fn drop(&mut self) {
        for destination in self.destinations.drain(..) {
            if let Err(e) = destination.close() {
                warn!("{e}");
            }
        }
    }
}
