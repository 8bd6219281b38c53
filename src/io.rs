//! File-backed readers and output sinks, gzip chosen by file extension.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, IntoInnerError, Write};
use std::path::{Path, PathBuf};

use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::reader::Stream;
use crate::router::{Sink, SinkFactory};

const READ_BUFFER: usize = 2 << 20;
const WRITE_BUFFER: usize = 1 << 20;

fn is_gzip(path: &Path) -> bool {
    path.extension().and_then(|s| s.to_str()) == Some("gz")
}

pub fn open_reader(path: &Path) -> io::Result<Box<dyn BufRead>> {
    let file = File::open(path)?;

    if is_gzip(path) {
        let decoder = MultiGzDecoder::new(file);
        Ok(Box::new(BufReader::with_capacity(READ_BUFFER, decoder)))
    } else {
        Ok(Box::new(BufReader::with_capacity(READ_BUFFER, file)))
    }
}

/// A buffered output file, optionally gzip-compressed.
pub enum FileSink {
    Plain(BufWriter<File>),
    Gzip(BufWriter<GzEncoder<File>>),
}

impl FileSink {
    pub fn create(path: &Path, compression: Option<Compression>) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(match compression {
            Some(level) => {
                FileSink::Gzip(BufWriter::with_capacity(WRITE_BUFFER, GzEncoder::new(file, level)))
            }
            None => FileSink::Plain(BufWriter::with_capacity(WRITE_BUFFER, file)),
        })
    }
}

impl Write for FileSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            FileSink::Plain(w) => w.write(buf),
            FileSink::Gzip(w) => w.write(buf),
        }
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        match self {
            FileSink::Plain(w) => w.write_all(buf),
            FileSink::Gzip(w) => w.write_all(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            FileSink::Plain(w) => w.flush(),
            FileSink::Gzip(w) => w.flush(),
        }
    }
}

impl Sink for FileSink {
    fn close(self) -> io::Result<()> {
        match self {
            FileSink::Plain(w) => {
                w.into_inner().map_err(IntoInnerError::into_error)?;
            }
            FileSink::Gzip(w) => {
                let encoder = w.into_inner().map_err(IntoInnerError::into_error)?;
                encoder.finish()?;
            }
        }
        Ok(())
    }
}

/// Creates `<dir>/<R1|R2>_<label>.fastq[.gz]` files.
#[derive(Debug, Clone)]
pub struct FileSinkFactory {
    dir: PathBuf,
    compression: Option<Compression>,
}

impl FileSinkFactory {
    /// `compression` of `None` writes plain FASTQ.
    pub fn new(dir: impl Into<PathBuf>, compression: Option<Compression>) -> Self {
        FileSinkFactory { dir: dir.into(), compression }
    }

    pub fn file_name(&self, read: Stream, label: &str) -> String {
        let extension = if self.compression.is_some() { "fastq.gz" } else { "fastq" };
        format!("{read}_{label}.{extension}")
    }

    pub fn path(&self, read: Stream, label: &str) -> PathBuf {
        self.dir.join(self.file_name(read, label))
    }
}

impl SinkFactory for FileSinkFactory {
    type Sink = FileSink;

    fn open(&mut self, read: Stream, label: &str) -> io::Result<FileSink> {
        FileSink::create(&self.path(read, label), self.compression)
    }

    fn describe(&self, read: Stream, label: &str) -> String {
        self.path(read, label).display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::TempDir;

    #[test]
    fn test_file_names() {
        let gz = FileSinkFactory::new("out", Some(Compression::new(1)));
        assert_eq!(gz.file_name(Stream::Read1, "ACGT-ACGT"), "R1_ACGT-ACGT.fastq.gz");
        assert_eq!(gz.path(Stream::Read2, "hopped"), Path::new("out/R2_hopped.fastq.gz"));
        let plain = FileSinkFactory::new("out", None);
        assert_eq!(plain.file_name(Stream::Read2, "unknown"), "R2_unknown.fastq");
    }

    #[test]
    fn test_gzip_sink_round_trips_through_reader() {
        let dir = TempDir::new().unwrap();
        let mut factory = FileSinkFactory::new(dir.path(), Some(Compression::fast()));
        let mut sink = factory.open(Stream::Read1, "unknown").unwrap();
        sink.write_all(b"@a\nAC\n+\nII\n").unwrap();
        sink.close().unwrap();

        let mut text = String::new();
        open_reader(&dir.path().join("R1_unknown.fastq.gz"))
            .unwrap()
            .read_to_string(&mut text)
            .unwrap();
        assert_eq!(text, "@a\nAC\n+\nII\n");
    }
}
