use std::io;

use thiserror::Error;

use crate::reader::Stream;

pub type Result<T> = std::result::Result<T, DemuxError>;

#[derive(Error, Debug)]
pub enum DemuxError {
    #[error("Could not open {stream} input \"{path}\": {source}")]
    OpenInput {
        stream: Stream,
        path: String,
        source: io::Error,
    },

    #[error("Error reading {stream} at record {record}: {source}")]
    Read {
        stream: Stream,
        record: u64,
        source: io::Error,
    },

    #[error("{stream} ended before R1 at record {record}")]
    StreamEndedEarly { stream: Stream, record: u64 },

    #[error("{stream} has more records than R1 (R1 ended after {records} records)")]
    StreamHasExtraRecords { stream: Stream, records: u64 },

    #[error("Unexpected end of {stream} inside record {record}")]
    TruncatedRecord { stream: Stream, record: u64 },

    #[error("Malformed record {record} in {stream} (line {line}): {reason}")]
    MalformedRecord {
        stream: Stream,
        record: u64,
        line: u64,
        reason: &'static str,
    },

    #[error("Could not open output \"{destination}\": {source}")]
    OpenDestination {
        destination: String,
        source: io::Error,
    },

    #[error("Error writing record {record} to \"{destination}\": {source}")]
    Write {
        destination: String,
        record: u64,
        source: io::Error,
    },

    #[error("Error closing \"{destination}\": {source}")]
    Close {
        destination: String,
        source: io::Error,
    },

    #[error("Invalid index set: {0}")]
    InvalidIndexSet(String),
}
