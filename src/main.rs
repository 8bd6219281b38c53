use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use env_logger::Env;
use flate2::Compression;
use log::info;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use dual_index_demux::io::{open_reader, FileSinkFactory};
use dual_index_demux::qscan;
use dual_index_demux::report::{log_summary, write_markdown};
use dual_index_demux::{DemuxConfig, Demultiplexer, IndexSet, InputPaths, Summary};

#[derive(Parser)]
#[command(name = "dual-index-demux")]
#[command(about = "Demultiplex paired-end FASTQ reads by exact dual indexes")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Split R1/R2 into per-sample, hopped and unknown FASTQs using I1/I2.
    Demux(DemuxArgs),
    /// Print the mean quality score at each base position of one FASTQ.
    Qscan(QscanArgs),
}

#[derive(clap::Args)]
struct DemuxArgs {
    #[arg(short = '1', long, help = "Read 1 FASTQ (biological)")]
    r1: PathBuf,

    #[arg(short = '2', long, help = "Read 2 FASTQ (biological)")]
    r2: PathBuf,

    #[arg(long, help = "Index 1 FASTQ")]
    i1: PathBuf,

    #[arg(long, help = "Index 2 FASTQ (reverse-complemented before matching)")]
    i2: PathBuf,

    #[arg(short = 'q', long, help = "Minimum mean quality score of each index read")]
    quality_cutoff: i64,

    #[arg(short = 'o', long, help = "Output directory, created if missing")]
    output: PathBuf,

    #[arg(long, help = "File of known indexes, one per line (default: built-in 24 indexes)")]
    indexes: Option<PathBuf>,

    #[arg(long, default_value = "1", help = "Gzip level for outputs (0-9)")]
    compression_level: u32,

    #[arg(long, default_value = "false", help = "Write plain FASTQ instead of gzip")]
    uncompressed: bool,

    #[arg(long, default_value = "1000000", help = "Log progress every N read pairs (0 = off)")]
    progress_interval: u64,
}

#[derive(clap::Args)]
struct QscanArgs {
    #[arg(short = 'f', long, help = "Input FASTQ file")]
    file: PathBuf,

    #[arg(short = 'l', long, help = "Expected read length; longer reads are an error")]
    read_length: Option<usize>,
}

fn run_demux(args: DemuxArgs) -> Result<()> {
    let indexes = match &args.indexes {
        Some(path) => IndexSet::from_file(path)?,
        None => IndexSet::default(),
    };
    info!("Using {indexes}, quality cutoff {}", args.quality_cutoff);

    if !args.output.exists() {
        info!("Output directory {:?} didn't exist, creating it.", args.output);
        fs::create_dir_all(&args.output)
            .with_context(|| format!("Could not create {}", args.output.display()))?;
    }

    let compression =
        (!args.uncompressed).then(|| Compression::new(args.compression_level.min(9)));
    let mut factory = FileSinkFactory::new(&args.output, compression);

    let inputs = InputPaths { read1: args.r1, read2: args.r2, index1: args.i1, index2: args.i2 };
    let config = DemuxConfig::new(indexes, args.quality_cutoff)
        .with_progress_interval(args.progress_interval);

    let counts = Demultiplexer::new(&config)
        .run(inputs.open()?, &mut factory)
        .context("Demultiplexing failed; outputs are incomplete")?;

    let summary = Summary::new(&config.indexes, &counts);
    let report_path = args.output.join("summary.md");
    let mut report = BufWriter::new(
        File::create(&report_path)
            .with_context(|| format!("Could not create {}", report_path.display()))?,
    );
    write_markdown(&summary, &mut report)?;
    report.flush()?;

    log_summary(&summary);
    info!("Report: {}", report_path.display());
    Ok(())
}

fn run_qscan(args: QscanArgs) -> Result<()> {
    let reader =
        open_reader(&args.file).with_context(|| format!("Could not open {}", args.file.display()))?;
    let stats = qscan::scan(reader, args.read_length)
        .with_context(|| format!("Error scanning {}", args.file.display()))?;
    info!("Scanned {} records from {}", stats.records(), args.file.display());

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    stats.write_tsv(&mut out)?;
    out.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    match args.command {
        Command::Demux(args) => run_demux(args),
        Command::Qscan(args) => run_qscan(args),
    }
}
