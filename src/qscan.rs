//! Mean Phred quality per base position over a single FASTQ file.

use std::io::{Read, Write};

use anyhow::{bail, Context, Result};
use fastq::{Parser, Record};

use crate::quality::phred_score;

/// Per-position quality sums over all records of one file.
#[derive(Debug, Clone, Default)]
pub struct PositionQuality {
    sums: Vec<i64>,
    records: u64,
    max_len: Option<usize>,
}

impl PositionQuality {
    /// With `read_length`, exactly that many positions are reported and longer reads are
    /// an error. Without it, positions grow to the longest read seen.
    pub fn new(read_length: Option<usize>) -> Self {
        PositionQuality {
            sums: vec![0; read_length.unwrap_or(0)],
            records: 0,
            max_len: read_length,
        }
    }

    pub fn add(&mut self, qual: &[u8]) -> Result<()> {
        if let Some(max) = self.max_len {
            if qual.len() > max {
                bail!(
                    "record {} has {} bases, more than --read-length {max}",
                    self.records + 1,
                    qual.len()
                );
            }
        } else if qual.len() > self.sums.len() {
            self.sums.resize(qual.len(), 0);
        }
        for (sum, &ch) in self.sums.iter_mut().zip(qual) {
            *sum += phred_score(ch);
        }
        self.records += 1;
        Ok(())
    }

    pub fn records(&self) -> u64 {
        self.records
    }

    /// Mean score per position: the position's sum over the number of records.
    pub fn means(&self) -> Vec<f64> {
        if self.records == 0 {
            return vec![0.0; self.sums.len()];
        }
        self.sums.iter().map(|&s| s as f64 / self.records as f64).collect()
    }

    /// Writes `position<TAB>mean` lines, positions from 0.
    pub fn write_tsv<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        for (i, mean) in self.means().iter().enumerate() {
            writeln!(out, "{i}\t{mean}")?;
        }
        Ok(())
    }
}

/// Scans every record of `reader`.
pub fn scan<R: Read>(reader: R, read_length: Option<usize>) -> Result<PositionQuality> {
    let mut stats = PositionQuality::new(read_length);
    let mut failure = None;
    Parser::new(reader)
        .each(|record| match stats.add(record.qual()) {
            Ok(()) => true,
            Err(e) => {
                failure = Some(e);
                false
            }
        })
        .context("Invalid FASTQ input")?;
    if let Some(e) = failure {
        return Err(e);
    }
    Ok(stats)
}
