//! Genome sequence access backed by a FASTA file.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;

use crate::error::Error;

/// Random access to genomic sequence by contig and closed 0-based range.
pub trait SequenceSource: Send + Sync {
    fn fetch(&self, contig: &str, start: i32, stop: i32) -> Result<Vec<u8>, Error>;
}

/// Whole genome held in memory, one uppercased sequence per contig.
#[derive(Debug, Default)]
pub struct Genome {
    contigs: HashMap<String, Vec<u8>>,
}

impl Genome {
    /// Load a plain or gzip-compressed (`.gz`) FASTA file.
    pub fn from_path(path: &Path) -> Result<Self, Error> {
        let file = File::open(path)?;
        let records = if path.extension().is_some_and(|ext| ext == "gz") {
            parse_fasta(BufReader::new(MultiGzDecoder::new(file)))?
        } else {
            parse_fasta(BufReader::new(file))?
        };
        Self::from_records(records)
    }

    pub fn from_records(records: Vec<(String, Vec<u8>)>) -> Result<Self, Error> {
        let mut contigs = HashMap::with_capacity(records.len());
        for (name, seq) in records {
            if contigs.contains_key(&name) {
                return Err(Error::Validation(format!(
                    "duplicate contig in FASTA: {name}"
                )));
            }
            contigs.insert(name, seq);
        }
        Ok(Self { contigs })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.contigs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contigs.is_empty()
    }

    /// Looks a contig up by name, trying the name with and without a `chr` prefix.
    fn contig(&self, name: &str) -> Option<&[u8]> {
        if let Some(seq) = self.contigs.get(name) {
            return Some(seq);
        }
        let alternate = match name.strip_prefix("chr") {
            Some(bare) => bare.to_string(),
            None => format!("chr{name}"),
        };
        self.contigs.get(&alternate).map(Vec::as_slice)
    }
}

impl SequenceSource for Genome {
    fn fetch(&self, contig: &str, start: i32, stop: i32) -> Result<Vec<u8>, Error> {
        let seq = self
            .contig(contig)
            .ok_or_else(|| Error::Validation(format!("contig not found in FASTA: {contig}")))?;
        if start < 0 || stop < start || stop as usize >= seq.len() {
            return Err(Error::Validation(format!(
                "range {start}-{stop} outside contig {contig} (length {})",
                seq.len()
            )));
        }
        Ok(seq[start as usize..=stop as usize].to_vec())
    }
}

/// Reads FASTA records as (first header token, uppercased sequence) pairs.
pub fn parse_fasta<R: BufRead>(reader: R) -> Result<Vec<(String, Vec<u8>)>, Error> {
    let mut results: Vec<(String, Vec<u8>)> = Vec::new();
    let mut current_name: Option<String> = None;
    let mut current_sequence: Vec<u8> = Vec::new();

    for line in reader.lines() {
        let line = line?;
        if let Some(header) = line.strip_prefix('>') {
            if let Some(name) = current_name.take() {
                results.push((name, std::mem::take(&mut current_sequence)));
            }
            let name = header.split_whitespace().next().unwrap_or("");
            if name.is_empty() {
                return Err(Error::Parse(format!("empty FASTA header: {line}")));
            }
            current_name = Some(name.to_string());
        } else if current_name.is_some() {
            let start = current_sequence.len();
            current_sequence.extend_from_slice(line.trim().as_bytes());
            current_sequence[start..].make_ascii_uppercase();
        }
    }

    if let Some(name) = current_name {
        results.push((name, current_sequence));
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::{Cursor, Write};

    #[test]
    fn parse_multiple_records() {
        let fasta = b">chr1 first\nACGT\nacgt\n>2\nTTTT\n";
        let records = parse_fasta(Cursor::new(&fasta[..])).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].0, "chr1");
        assert_eq!(records[0].1, b"ACGTACGT");
        assert_eq!(records[1].0, "2");
    }

    #[test]
    fn empty_header_rejected() {
        assert!(parse_fasta(Cursor::new(&b">\nACGT\n"[..])).is_err());
    }

    #[test]
    fn fetch_closed_range_with_prefix_fallback() {
        let genome =
            Genome::from_records(vec![("2L".to_string(), b"AACCGGTT".to_vec())]).unwrap();
        assert_eq!(genome.fetch("2L", 2, 5).unwrap(), b"CCGG");
        assert_eq!(genome.fetch("chr2L", 0, 0).unwrap(), b"A");
        assert!(genome.fetch("2L", 4, 8).is_err());
        assert!(genome.fetch("3R", 0, 1).is_err());
    }

    #[test]
    fn duplicate_contig_rejected() {
        let records = vec![
            ("chr1".to_string(), b"A".to_vec()),
            ("chr1".to_string(), b"C".to_vec()),
        ];
        assert!(Genome::from_records(records).is_err());
    }

    #[test]
    fn load_gzipped_file() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::fast());
        encoder.write_all(b">chrX\nGATTACA\n").unwrap();
        let gz = encoder.finish().unwrap();
        let mut file = tempfile::Builder::new().suffix(".fa.gz").tempfile().unwrap();
        file.write_all(&gz).unwrap();

        let genome = Genome::from_path(file.path()).unwrap();
        assert_eq!(genome.len(), 1);
        assert_eq!(genome.fetch("chrX", 0, 6).unwrap(), b"GATTACA");
    }
}
