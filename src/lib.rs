// lib.rs - 库函数
//
// Dual-index demultiplexing of paired-end FASTQ reads: R1/R2 are routed to per-sample,
// hopped or unknown outputs from the I1/I2 index reads.

pub mod classify;
pub mod counts;
pub mod demux;
pub mod error;
pub mod index;
pub mod io;
pub mod qscan;
pub mod quality;
pub mod reader;
pub mod report;
pub mod router;
pub mod sequence;
pub mod summary;

pub use classify::{Assignment, Category, Classification, Classifier};
pub use counts::DemuxCounts;
pub use demux::{DemuxConfig, Demultiplexer, InputPaths};
pub use error::{DemuxError, Result};
pub use index::{IndexId, IndexSet, DEFAULT_INDEXES};
pub use quality::passes_mean_quality;
pub use reader::{FastqRecord, QuadReader, ReadQuad, Stream};
pub use sequence::{reverse_complement, reverse_complement_with, UnknownBasePolicy};
pub use summary::Summary;
