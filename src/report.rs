//! Markdown summary report and log output for a finished run.

use std::io::{self, Write};

use log::info;

use crate::summary::Summary;

/// Formats a count with `,` thousands separators, e.g. `1234567` -> `1,234,567`.
pub fn format_count(count: u64) -> String {
    let digits = count.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn write_markdown<W: Write>(summary: &Summary, out: &mut W) -> io::Result<()> {
    writeln!(out, "# Demultiplexing Summary\n")?;
    writeln!(out, "- **Total read-pairs processed:** {}", summary.total_reads)?;
    writeln!(
        out,
        "- **Matched (total):** {} ({:.2}%)",
        summary.matched_total,
        summary.matched_percent()
    )?;
    writeln!(
        out,
        "- **Index-hopped (total):** {} ({:.2}%)",
        summary.hopped_total,
        summary.hopped_percent()
    )?;
    writeln!(
        out,
        "- **Unknown (total):** {} ({:.2}%)\n",
        summary.unknown,
        summary.unknown_percent()
    )?;

    writeln!(out, "## Percentage of reads from each sample (matched only)\n")?;
    writeln!(out, "| Sample Index | Matched Count | % of Total Reads |")?;
    writeln!(out, "|--------------|---------------:|-----------------:|")?;
    for row in &summary.per_index {
        writeln!(out, "| {0}-{0} | {1} | {2:.2}% |", row.index, row.count, row.percent)?;
    }

    writeln!(out, "\n## Index hopping per pair (as % of total reads)\n")?;
    writeln!(out, "| From -> To | Hopped Count | % of Total Reads |")?;
    writeln!(out, "|------------|--------------:|-----------------:|")?;
    for row in &summary.hopped_pairs {
        writeln!(out, "| {}->{} | {} | {:.2}% |", row.from, row.to, row.count, row.percent)?;
    }
    Ok(())
}

pub fn log_summary(summary: &Summary) {
    info!("Demultiplexing complete.");
    info!("Total read pairs: {}", format_count(summary.total_reads));
    info!(
        "Matched: {} ({:.2}%)",
        format_count(summary.matched_total),
        summary.matched_percent()
    );
    info!(
        "Hopped: {} ({:.2}%)",
        format_count(summary.hopped_total),
        summary.hopped_percent()
    );
    info!("Unknown: {} ({:.2}%)", format_count(summary.unknown), summary.unknown_percent());
    for row in summary.top_hopped(5) {
        info!("  hopped {} -> {}: {}", row.from, row.to, format_count(row.count));
    }
}
