//! GTF line and attribute parser for reference annotations.

use crate::error::Error;
use crate::interval::Interval;
use crate::strand::Strand;

/// One reference `exon` record, already shifted to 0-based closed coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GtfExon {
    pub contig: String,
    pub strand: Strand,
    pub interval: Interval,
    pub gene_id: String,
    pub transcript_id: String,
    pub gene_name: Option<String>,
}

/// Result of parsing a single GTF line.
pub enum ParsedLine {
    Exon(Box<GtfExon>),
    Discarded,
    Comment,
}

/// Parse one GTF line. Only stranded `exon` features are kept.
pub fn parse_line(line: &str) -> Result<ParsedLine, Error> {
    if line.starts_with('#') || line.starts_with("track") || line.starts_with("browser") {
        return Ok(ParsedLine::Comment);
    }
    let line = line.trim_end();
    if line.is_empty() {
        return Ok(ParsedLine::Comment);
    }

    let columns: Vec<&str> = line.split('\t').collect();
    if columns.len() != 9 {
        return Err(Error::Parse(format!(
            "GTF line has {} columns, expected 9",
            columns.len()
        )));
    }

    if columns[2] != "exon" {
        return Ok(ParsedLine::Discarded);
    }
    let Ok(strand) = columns[6].parse::<Strand>() else {
        return Ok(ParsedLine::Discarded);
    };

    let start: i32 = columns[3]
        .parse()
        .map_err(|e| Error::Parse(format!("invalid start '{}': {e}", columns[3])))?;
    let end: i32 = columns[4]
        .parse()
        .map_err(|e| Error::Parse(format!("invalid end '{}': {e}", columns[4])))?;
    if start < 1 || end < start {
        return Err(Error::Validation(format!(
            "invalid GTF exon coordinates {start}-{end}"
        )));
    }

    let mut gene_id = None;
    let mut transcript_id = None;
    let mut gene_name = None;
    for (key, value) in parse_attributes(columns[8])? {
        match key {
            "gene_id" => gene_id = Some(value.to_string()),
            "transcript_id" => transcript_id = Some(value.to_string()),
            "gene_name" => gene_name = Some(value.to_string()),
            _ => {}
        }
    }
    let gene_id = gene_id
        .ok_or_else(|| Error::Parse("GTF exon missing gene_id attribute".to_string()))?;
    let transcript_id = transcript_id
        .ok_or_else(|| Error::Parse("GTF exon missing transcript_id attribute".to_string()))?;

    Ok(ParsedLine::Exon(Box::new(GtfExon {
        contig: columns[0].to_string(),
        strand,
        interval: Interval::new(start - 1, end - 1),
        gene_id,
        transcript_id,
        gene_name,
    })))
}

/// Parse GTF column 9: `key "value";` pairs, quotes optional.
fn parse_attributes(attrs: &str) -> Result<Vec<(&str, &str)>, Error> {
    let mut pairs = Vec::new();
    for pair in attrs.split(';') {
        let pair = pair.trim();
        if pair.is_empty() {
            continue;
        }
        let (key, value) = pair
            .split_once(char::is_whitespace)
            .ok_or_else(|| Error::Parse(format!("attribute missing value: '{pair}'")))?;
        pairs.push((key, value.trim().trim_matches('"')));
    }
    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exon(line: &str) -> GtfExon {
        match parse_line(line).unwrap() {
            ParsedLine::Exon(e) => *e,
            _ => panic!("expected exon"),
        }
    }

    #[test]
    fn exon_line_is_shifted_to_zero_based() {
        let e = exon(
            "chr1\tHAVANA\texon\t11869\t12227\t.\t+\t.\tgene_id \"G1\"; transcript_id \"T1\"; gene_name \"DDX11L1\";",
        );
        assert_eq!(e.contig, "chr1");
        assert_eq!(e.strand, Strand::Forward);
        assert_eq!(e.interval, Interval::new(11868, 12226));
        assert_eq!(e.gene_id, "G1");
        assert_eq!(e.transcript_id, "T1");
        assert_eq!(e.gene_name.as_deref(), Some("DDX11L1"));
    }

    #[test]
    fn other_features_and_comments_skipped() {
        assert!(matches!(
            parse_line("chr1\tx\tCDS\t1\t9\t.\t+\t0\tgene_id \"G\"; transcript_id \"T\";").unwrap(),
            ParsedLine::Discarded
        ));
        assert!(matches!(
            parse_line("chr1\tx\texon\t1\t9\t.\t.\t.\tgene_id \"G\"; transcript_id \"T\";").unwrap(),
            ParsedLine::Discarded
        ));
        assert!(matches!(parse_line("#!genome-build").unwrap(), ParsedLine::Comment));
        assert!(matches!(parse_line("").unwrap(), ParsedLine::Comment));
    }

    #[test]
    fn missing_transcript_id_rejected() {
        assert!(parse_line("chr1\tx\texon\t1\t9\t.\t+\t.\tgene_id \"G\";").is_err());
    }

    #[test]
    fn wrong_column_count_rejected() {
        assert!(parse_line("chr1\tx\texon\t1\t9").is_err());
    }
}
