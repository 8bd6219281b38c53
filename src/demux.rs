//! The single-pass demultiplexing loop: read, classify, route, count.

use std::io::BufRead;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::classify::Classifier;
use crate::counts::DemuxCounts;
use crate::error::{DemuxError, Result};
use crate::index::IndexSet;
use crate::io::open_reader;
use crate::reader::{QuadReader, ReadQuad, Stream};
use crate::router::{OutputRouter, Sink, SinkFactory};

/// Immutable inputs to a run.
#[derive(Debug, Clone)]
pub struct DemuxConfig {
    pub indexes: IndexSet,
    /// Minimum mean Phred score of each index read.
    pub quality_cutoff: i64,
    /// Log progress every this many read pairs; 0 disables progress logging.
    pub progress_interval: u64,
}

impl DemuxConfig {
    pub fn new(indexes: IndexSet, quality_cutoff: i64) -> Self {
        DemuxConfig { indexes, quality_cutoff, progress_interval: 1_000_000 }
    }

    pub fn with_progress_interval(mut self, interval: u64) -> Self {
        self.progress_interval = interval;
        self
    }
}

/// Paths of the four synchronized inputs.
#[derive(Debug, Clone)]
pub struct InputPaths {
    pub read1: PathBuf,
    pub read2: PathBuf,
    pub index1: PathBuf,
    pub index2: PathBuf,
}

impl InputPaths {
    /// Opens all four inputs, gzip-decoding those ending in `.gz`.
    pub fn open(&self) -> Result<QuadReader<Box<dyn BufRead>>> {
        let open = |stream: Stream, path: &Path| {
            open_reader(path).map_err(|source| DemuxError::OpenInput {
                stream,
                path: path.display().to_string(),
                source,
            })
        };
        Ok(QuadReader::new(
            open(Stream::Read1, self.read1.as_path())?,
            open(Stream::Read2, self.read2.as_path())?,
            open(Stream::Index1, self.index1.as_path())?,
            open(Stream::Index2, self.index2.as_path())?,
        ))
    }
}

pub struct Demultiplexer<'a> {
    config: &'a DemuxConfig,
    classifier: Classifier<'a>,
}

impl<'a> Demultiplexer<'a> {
    pub fn new(config: &'a DemuxConfig) -> Self {
        let classifier = Classifier::new(&config.indexes, config.quality_cutoff);
        Demultiplexer { config, classifier }
    }

    /// Opens every output, processes all records, and closes every output.
    ///
    /// Outputs are closed on every path out of this function. On failure the outputs
    /// written so far stay on disk and are incomplete.
    pub fn run<R, F>(&self, inputs: QuadReader<R>, factory: &mut F) -> Result<DemuxCounts>
    where
        R: BufRead,
        F: SinkFactory,
    {
        let router = OutputRouter::open(factory, &self.config.indexes)?;
        info!("Opened {} output files for {}", router.sink_count(), self.config.indexes);
        self.run_with_router(inputs, router)
    }

    /// Like [`run`](Self::run) but with outputs that are already open.
    pub fn run_with_router<R, S>(
        &self,
        mut inputs: QuadReader<R>,
        mut router: OutputRouter<S>,
    ) -> Result<DemuxCounts>
    where
        R: BufRead,
        S: Sink,
    {
        let mut counts = DemuxCounts::new(&self.config.indexes);
        match self.process(&mut inputs, &mut router, &mut counts) {
            Ok(()) => {
                router.close()?;
                Ok(counts)
            }
            Err(e) => {
                warn!("Stopping after {} read pairs: {e}", counts.total_reads());
                if let Err(close_err) = router.close() {
                    warn!("Also failed to close outputs: {close_err}");
                }
                Err(e)
            }
        }
    }

    fn process<R, S>(
        &self,
        inputs: &mut QuadReader<R>,
        router: &mut OutputRouter<S>,
        counts: &mut DemuxCounts,
    ) -> Result<()>
    where
        R: BufRead,
        S: Sink,
    {
        let interval = self.config.progress_interval;
        let mut quad = ReadQuad::default();

        while inputs.next_into(&mut quad)? {
            let classification = self.classifier.classify(
                &quad.index1.sequence,
                &quad.index2.sequence,
                &quad.index1.quality,
                &quad.index2.quality,
            );
            let record = inputs.records_read();
            router.route_tagged(&classification, &mut quad.read1, &mut quad.read2, record)?;
            counts.record(&classification.assignment);

            if interval > 0 && record % interval == 0 {
                info!("Processed {record} read pairs");
            }
        }

        debug_assert!(counts.is_consistent());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::testing::MemoryFactory;

    const HIGH: &str = "IIIIIIII";

    fn fq(records: &[(&str, &str, &str)]) -> String {
        records.iter().map(|(h, s, q)| format!("@{h}\n{s}\n+\n{q}\n")).collect()
    }

    #[test]
    fn test_three_categories_end_to_end() {
        let config = DemuxConfig::new(IndexSet::default(), 30);
        let r1 = fq(&[("a 1", "AAAA", "FFFF"), ("b 1", "CCCC", "FFFF"), ("c 1", "GGGG", "FFFF")]);
        let r2 = fq(&[("a 2", "TTTT", "FFFF"), ("b 2", "GGGG", "FFFF"), ("c 2", "CCCC", "FFFF")]);
        let i1 = fq(&[("a", "GTAGCGTA", HIGH), ("b", "GTAGCGTA", HIGH), ("c", "NNNNNNNN", HIGH)]);
        let i2 = fq(&[("a", "TACGCTAC", HIGH), ("b", "ATCGATCG", HIGH), ("c", "TACGCTAC", HIGH)]);
        let inputs =
            QuadReader::new(r1.as_bytes(), r2.as_bytes(), i1.as_bytes(), i2.as_bytes());

        let mut factory = MemoryFactory::default();
        let counts = Demultiplexer::new(&config).run(inputs, &mut factory).unwrap();

        let set = &config.indexes;
        let gtag = set.id_of(b"GTAGCGTA").unwrap();
        let cgat = set.id_of(b"CGATCGAT").unwrap();
        assert_eq!(counts.total_reads(), 3);
        assert_eq!(counts.matched(gtag), 1);
        assert_eq!(counts.matched_total(), 1);
        assert_eq!(counts.hopped(gtag, cgat), 1);
        assert_eq!(counts.hopped(cgat, gtag), 0);
        assert_eq!(counts.hopped_total(), 1);
        assert_eq!(counts.unknown(), 1);

        let state = factory.state.borrow();
        assert_eq!(
            state.contents["R1_GTAGCGTA-GTAGCGTA"],
            b"@a 1 GTAGCGTA-GTAGCGTA\nAAAA\n+\nFFFF\n"
        );
        assert_eq!(
            state.contents["R2_GTAGCGTA-GTAGCGTA"],
            b"@a 2 GTAGCGTA-GTAGCGTA\nTTTT\n+\nFFFF\n"
        );
        assert_eq!(state.contents["R1_hopped"], b"@b 1 GTAGCGTA-CGATCGAT\nCCCC\n+\nFFFF\n");
        assert_eq!(state.contents["R2_unknown"], b"@c 2 NNNNNNNN-GTAGCGTA\nCCCC\n+\nFFFF\n");
        assert_eq!(state.contents.len(), 6);
        assert_eq!(state.closes.len(), 2 * (24 + 2));
        assert!(state.closes.values().all(|&n| n == 1));
    }

    #[test]
    fn test_write_failure_still_closes_everything() {
        let config = DemuxConfig::new(IndexSet::new(["AAAA", "CCCC"]).unwrap(), 0);
        let rec = fq(&[("x", "AC", "II"), ("y", "AC", "II"), ("z", "AC", "II")]);
        let idx = fq(&[("x", "GGGG", "IIII"), ("y", "GGGG", "IIII"), ("z", "GGGG", "IIII")]);
        let inputs =
            QuadReader::new(rec.as_bytes(), rec.as_bytes(), idx.as_bytes(), idx.as_bytes());

        // each record is eight write calls; the second record's first write fails
        let mut factory = MemoryFactory {
            fail_write: Some(("R2_unknown".to_owned(), 8)),
            ..Default::default()
        };
        let err = Demultiplexer::new(&config).run(inputs, &mut factory).unwrap_err();
        match err {
            DemuxError::Write { destination, record, .. } => {
                assert_eq!(destination, "R2_unknown");
                assert_eq!(record, 2);
            }
            other => panic!("expected write error, got {other:?}"),
        }

        let state = factory.state.borrow();
        assert_eq!(state.closes.len(), 8);
        assert!(state.closes.values().all(|&n| n == 1));
    }

    #[test]
    fn test_stream_mismatch_aborts_and_closes() {
        let config = DemuxConfig::new(IndexSet::new(["AAAA"]).unwrap(), 0);
        let two = fq(&[("x", "AC", "II"), ("y", "AC", "II")]);
        let one = fq(&[("x", "AC", "II")]);
        let inputs =
            QuadReader::new(two.as_bytes(), two.as_bytes(), two.as_bytes(), one.as_bytes());

        let mut factory = MemoryFactory::default();
        let err = Demultiplexer::new(&config).run(inputs, &mut factory).unwrap_err();
        assert!(matches!(err, DemuxError::StreamEndedEarly { stream: Stream::Index2, record: 2 }));
        assert_eq!(factory.state.borrow().closes.len(), 6);
    }

    #[test]
    fn test_open_failure_processes_nothing() {
        let config = DemuxConfig::new(IndexSet::new(["AAAA"]).unwrap(), 0);
        let rec = fq(&[("x", "AC", "II")]);
        let inputs =
            QuadReader::new(rec.as_bytes(), rec.as_bytes(), rec.as_bytes(), rec.as_bytes());
        let mut factory =
            MemoryFactory { fail_open: Some("R1_unknown".to_owned()), ..Default::default() };
        let err = Demultiplexer::new(&config).run(inputs, &mut factory).unwrap_err();
        assert!(matches!(err, DemuxError::OpenDestination { .. }));

        let state = factory.state.borrow();
        assert!(state.contents.is_empty());
        assert_eq!(state.closes.len(), state.opened.len());
    }
}
