//! BED reader for clustered elements.
//!
//! Each BED6 line is one element; the `name` column carries its category
//! (`tss_exon`, `intron`, ...). BED's half-open `[start, end)` is converted
//! to the closed intervals used everywhere else.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;

use crate::error::Error;
use crate::interval::Interval;
use crate::strand::Strand;

use super::{ElementCategory, ElementGroup};

/// Elements grouped by `(contig, strand)`.
pub type GroupedElements = BTreeMap<(String, Strand), ElementGroup>;

enum ParsedLine {
    Element {
        contig: String,
        strand: Strand,
        category: ElementCategory,
        interval: Interval,
    },
    Comment,
}

/// Load elements from a path; `.gz` files are decompressed transparently.
pub fn load_elements_path(path: &Path) -> Result<GroupedElements, Error> {
    let file = File::open(path)?;
    if path.extension().is_some_and(|ext| ext == "gz") {
        load_elements(BufReader::new(MultiGzDecoder::new(file)))
    } else {
        load_elements(BufReader::new(file))
    }
}

/// Load elements from a buffered BED stream.
pub fn load_elements<R: BufRead>(reader: R) -> Result<GroupedElements, Error> {
    let mut groups = GroupedElements::new();

    for (line_num, line) in reader.lines().enumerate() {
        let line_num = line_num + 1;
        let line = line?;
        match parse_line(&line)
            .map_err(|e| Error::Parse(format!("{e} (line {line_num}: {line})")))?
        {
            ParsedLine::Element {
                contig,
                strand,
                category,
                interval,
            } => groups
                .entry((contig, strand))
                .or_default()
                .push(category, interval),
            ParsedLine::Comment => continue,
        }
    }

    for group in groups.values_mut() {
        group.sort();
    }
    Ok(groups)
}

fn parse_line(line: &str) -> Result<ParsedLine, Error> {
    let line = line.trim_end();
    if line.is_empty()
        || line.starts_with('#')
        || line.starts_with("track")
        || line.starts_with("browser")
    {
        return Ok(ParsedLine::Comment);
    }

    let columns: Vec<&str> = line.split('\t').collect();
    if columns.len() < 6 {
        return Err(Error::Parse(format!(
            "BED line has {} columns, expected at least 6",
            columns.len()
        )));
    }

    let start: i32 = columns[1]
        .parse()
        .map_err(|e| Error::Parse(format!("invalid start '{}': {e}", columns[1])))?;
    let end: i32 = columns[2]
        .parse()
        .map_err(|e| Error::Parse(format!("invalid end '{}': {e}", columns[2])))?;
    if end <= start {
        return Err(Error::Validation(format!(
            "empty element interval [{start}, {end})"
        )));
    }

    Ok(ParsedLine::Element {
        contig: columns[0].to_string(),
        strand: columns[5].parse()?,
        category: columns[3].parse()?,
        interval: Interval::new(start, end - 1),
    })
}
