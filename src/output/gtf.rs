//! GTF rendering for assembled genes.

use std::fmt::Write as _;
use std::path::Path;

use crate::contig::output_contig_name;
use crate::interval::Interval;
use crate::transcript::{Gene, Transcript};

const SOURCE: &str = "grit";

/// `track` line naming the output after its path minus the last extension.
#[must_use]
pub fn track_header(gtf_path: &Path) -> String {
    let path = gtf_path.to_string_lossy();
    let name = path.rsplit_once('.').map_or("", |(stem, _)| stem);
    format!("track name={name} useScore=1\n")
}

/// All GTF lines for a gene as one block, 1-based coordinates.
#[must_use]
pub fn render_gene(gene: &Gene, fix_for_ucsc: bool) -> String {
    let mut block = String::new();
    for transcript in &gene.transcripts {
        let contig = output_contig_name(&transcript.contig, fix_for_ucsc);
        render_transcript(&mut block, transcript, &contig);
    }
    block
}

fn render_transcript(out: &mut String, t: &Transcript, contig: &str) {
    let attributes = attributes(t);
    push_line(out, contig, "transcript", Interval::new(t.start(), t.stop()), t, ".", &attributes);
    for &exon in &t.exons {
        push_line(out, contig, "exon", exon, t, ".", &attributes);
    }
    for (piece, phase) in cds_pieces(t) {
        push_line(out, contig, "CDS", piece, t, &phase.to_string(), &attributes);
    }
}

fn push_line(
    out: &mut String,
    contig: &str,
    feature: &str,
    interval: Interval,
    t: &Transcript,
    frame: &str,
    attributes: &str,
) {
    let _ = writeln!(
        out,
        "{contig}\t{SOURCE}\t{feature}\t{}\t{}\t.\t{}\t{frame}\t{attributes}",
        interval.start + 1,
        interval.stop + 1,
        t.strand,
    );
}

fn attributes(t: &Transcript) -> String {
    let mut attrs = format!("gene_id \"{}\"; transcript_id \"{}\";", t.gene_id, t.id);
    let mut push = |key: &str, value: &str| {
        let _ = write!(attrs, " {key} \"{value}\";");
    };
    if let Some(name) = &t.gene_name {
        push("gene_name", name);
    }
    if let Some(ref_gene) = &t.ref_gene {
        push("ref_gene_id", ref_gene);
    }
    if let Some(ref_trans) = &t.ref_trans {
        push("ref_transcript_id", ref_trans);
    }
    if let Some(code) = t.class_code {
        push("class_code", &code.to_string());
    }
    if let Some(p) = t.promoter {
        push("promoter", &format!("{}-{}", p.start + 1, p.stop + 1));
    }
    if let Some(p) = t.polya_region {
        push("polya", &format!("{}-{}", p.start + 1, p.stop + 1));
    }
    attrs
}

/// Exon pieces inside the coding region, position-sorted, each paired with
/// its GTF phase counted in transcription order.
#[must_use]
pub fn cds_pieces(t: &Transcript) -> Vec<(Interval, u64)> {
    let Some(cds) = t.coding_region else {
        return Vec::new();
    };
    let mut pieces: Vec<Interval> = t
        .exons
        .iter()
        .filter(|e| e.overlaps(cds.start, cds.stop))
        .map(|e| Interval::new(e.start.max(cds.start), e.stop.min(cds.stop)))
        .collect();
    if t.strand.is_reverse() {
        pieces.reverse();
    }

    let mut preceding = 0u64;
    let mut phased: Vec<(Interval, u64)> = pieces
        .into_iter()
        .map(|piece| {
            let phase = (3 - preceding % 3) % 3;
            preceding += piece.len();
            (piece, phase)
        })
        .collect();
    phased.sort_unstable_by_key(|(piece, _)| *piece);
    phased
}
