//! Tracking file rendering: one fixed-width, tab-separated row per transcript.

use std::fmt::Write as _;

use crate::contig::output_contig_name;
use crate::transcript::Gene;

#[must_use]
pub fn header() -> String {
    format!(
        "{:<20}\t{}\t{:<20}\t{:<20}\t{:<20}\t{:<10}\t{:<30}\t{}\n",
        "tracking_id",
        "class_code",
        "nearest_ref_id",
        "gene_id",
        "gene_short_name",
        "tss_id",
        "locus",
        "length"
    )
}

/// Rows for every transcript of a gene as one block.
#[must_use]
pub fn render_gene(gene: &Gene, fix_for_ucsc: bool) -> String {
    let contig = output_contig_name(&gene.contig, fix_for_ucsc);
    let mut block = String::new();
    for t in &gene.transcripts {
        let class_code = t.class_code.map_or_else(|| "-".to_string(), String::from);
        let locus = format!("{contig}:{}:{}-{}", t.strand, t.start(), t.stop());
        let _ = writeln!(
            block,
            "{:<20}\t{:<10}\t{:<20}\t{:<20}\t{:<20}\t{:<10}\t{:<30}\t{}",
            t.id,
            class_code,
            t.ref_trans.as_deref().unwrap_or("-"),
            t.gene_id,
            t.gene_name.as_deref().unwrap_or("-"),
            "-",
            locus,
            t.length()
        );
    }
    block
}
