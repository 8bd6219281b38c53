//! FASTQ records and the four-stream lockstep reader.

use std::fmt;
use std::io::{self, BufRead, Write};

use crate::error::{DemuxError, Result};

/// One of the four synchronized input streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stream {
    Read1,
    Read2,
    Index1,
    Index2,
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Stream::Read1 => "R1",
            Stream::Read2 => "R2",
            Stream::Index1 => "I1",
            Stream::Index2 => "I2",
        };
        f.write_str(name)
    }
}

/// A FASTQ record as four raw lines without their trailing `\n`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FastqRecord {
    pub header: Vec<u8>,
    pub sequence: Vec<u8>,
    pub separator: Vec<u8>,
    pub quality: Vec<u8>,
}

impl FastqRecord {
    pub fn new(header: &[u8], sequence: &[u8], separator: &[u8], quality: &[u8]) -> Self {
        FastqRecord {
            header: header.to_vec(),
            sequence: sequence.to_vec(),
            separator: separator.to_vec(),
            quality: quality.to_vec(),
        }
    }

    /// Appends `" <tag>"` to the header line.
    pub fn annotate(&mut self, tag: &[u8]) {
        self.header.reserve(tag.len() + 1);
        self.header.push(b' ');
        self.header.extend_from_slice(tag);
    }

    // 直接写入, every line newline-terminated
    pub fn write_to<W: Write + ?Sized>(&self, out: &mut W) -> io::Result<()> {
        out.write_all(&self.header)?;
        out.write_all(b"\n")?;
        out.write_all(&self.sequence)?;
        out.write_all(b"\n")?;
        out.write_all(&self.separator)?;
        out.write_all(b"\n")?;
        out.write_all(&self.quality)?;
        out.write_all(b"\n")
    }
}

/// Line cursor over one input stream, reusing its record buffers.
struct StreamCursor<R> {
    stream: Stream,
    reader: R,
}

impl<R: BufRead> StreamCursor<R> {
    /// Reads one line into `buf` without its `\n`. Returns false at end of input.
    fn read_line(&mut self, buf: &mut Vec<u8>, record: u64) -> Result<bool> {
        buf.clear();
        let n = self.reader.read_until(b'\n', buf).map_err(|source| DemuxError::Read {
            stream: self.stream,
            record,
            source,
        })?;
        if n == 0 {
            return Ok(false);
        }
        if buf.last() == Some(&b'\n') {
            buf.pop();
        }
        Ok(true)
    }

    /// Reads the four lines of record number `record` (1-based) into `rec`.
    /// Returns false when the stream is exhausted before the header line.
    fn read_record(&mut self, rec: &mut FastqRecord, record: u64) -> Result<bool> {
        if !self.read_line(&mut rec.header, record)? {
            return Ok(false);
        }
        let complete = self.read_line(&mut rec.sequence, record)?
            && self.read_line(&mut rec.separator, record)?
            && self.read_line(&mut rec.quality, record)?;
        if !complete {
            return Err(DemuxError::TruncatedRecord { stream: self.stream, record });
        }
        self.validate(rec, record)?;
        Ok(true)
    }

    fn validate(&self, rec: &FastqRecord, record: u64) -> Result<()> {
        let first_line = (record - 1) * 4 + 1;
        let malformed = |line: u64, reason: &'static str| DemuxError::MalformedRecord {
            stream: self.stream,
            record,
            line,
            reason,
        };
        if rec.header.first() != Some(&b'@') {
            return Err(malformed(first_line, "header does not start with '@'"));
        }
        if rec.separator.first() != Some(&b'+') {
            return Err(malformed(first_line + 2, "separator does not start with '+'"));
        }
        if rec.sequence.len() != rec.quality.len() {
            return Err(malformed(first_line + 3, "sequence and quality lengths differ"));
        }
        Ok(())
    }

    /// Peeks for any remaining input; `record` is the record a read would start.
    fn is_exhausted(&mut self, record: u64) -> Result<bool> {
        let buf = self.reader.fill_buf().map_err(|source| DemuxError::Read {
            stream: self.stream,
            record,
            source,
        })?;
        Ok(buf.is_empty())
    }
}

/// One record from each of the four streams at the same position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadQuad {
    pub read1: FastqRecord,
    pub read2: FastqRecord,
    pub index1: FastqRecord,
    pub index2: FastqRecord,
}

/// Reads R1, R2, I1 and I2 in lockstep, one record per stream per call.
///
/// R1 decides when input ends. The other three streams must end at exactly the same
/// record, otherwise reading fails with [`DemuxError::StreamEndedEarly`] or
/// [`DemuxError::StreamHasExtraRecords`].
pub struct QuadReader<R> {
    read1: StreamCursor<R>,
    read2: StreamCursor<R>,
    index1: StreamCursor<R>,
    index2: StreamCursor<R>,
    records: u64,
    finished: bool,
}

impl<R: BufRead> QuadReader<R> {
    pub fn new(read1: R, read2: R, index1: R, index2: R) -> Self {
        QuadReader {
            read1: StreamCursor { stream: Stream::Read1, reader: read1 },
            read2: StreamCursor { stream: Stream::Read2, reader: read2 },
            index1: StreamCursor { stream: Stream::Index1, reader: index1 },
            index2: StreamCursor { stream: Stream::Index2, reader: index2 },
            records: 0,
            finished: false,
        }
    }

    /// Number of complete record quads read so far.
    pub fn records_read(&self) -> u64 {
        self.records
    }

    /// Fills `quad` with the next record from every stream.
    ///
    /// Returns `Ok(false)` once R1 is exhausted and the other streams are confirmed to be
    /// exhausted too. The buffers in `quad` are reused between calls.
    pub fn next_into(&mut self, quad: &mut ReadQuad) -> Result<bool> {
        if self.finished {
            return Ok(false);
        }
        let record = self.records + 1;

        if !self.read1.read_record(&mut quad.read1, record)? {
            self.finished = true;
            self.check_all_exhausted()?;
            return Ok(false);
        }
        for (cursor, rec) in [
            (&mut self.read2, &mut quad.read2),
            (&mut self.index1, &mut quad.index1),
            (&mut self.index2, &mut quad.index2),
        ] {
            if !cursor.read_record(rec, record)? {
                return Err(DemuxError::StreamEndedEarly { stream: cursor.stream, record });
            }
        }

        self.records = record;
        Ok(true)
    }

    /// Returns the next quad, or `None` at end of input.
    pub fn next_quad(&mut self) -> Result<Option<ReadQuad>> {
        let mut quad = ReadQuad::default();
        Ok(self.next_into(&mut quad)?.then_some(quad))
    }

    fn check_all_exhausted(&mut self) -> Result<()> {
        for cursor in [&mut self.read2, &mut self.index1, &mut self.index2] {
            if !cursor.is_exhausted(self.records + 1)? {
                return Err(DemuxError::StreamHasExtraRecords {
                    stream: cursor.stream,
                    records: self.records,
                });
            }
        }
        Ok(())
    }
}
