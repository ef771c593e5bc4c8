//! Per-gene binary file: common header followed by a zstd-compressed record.

use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor, Read, Write};
use std::path::Path;

use crate::error::Error;
use crate::interval::Interval;
use crate::strand::Strand;
use crate::transcript::{CodingRegion, Gene, Transcript};

use super::binary_io::{BinaryRead, BinaryWrite};

/// Trellis file signature: 0x89 0x54 0x52 0x4C 0x0D 0x0A 0x1A 0x0A
pub const TRELLIS_SIGNATURE: u64 = 727_905_342_005_073_033;

pub const GENE_FILE_TYPE: u16 = 1;
pub const GENE_FORMAT_VERSION: u16 = 1;

const COMPRESSION_LEVEL: i32 = 3;

pub fn write_common_header<W: Write>(
    writer: &mut W,
    file_type: u16,
    format_version: u16,
) -> Result<(), Error> {
    writer.write_u64(TRELLIS_SIGNATURE)?;
    writer.write_u16(file_type)?;
    writer.write_u16(format_version)?;
    Ok(())
}

/// Reads and validates the common header. Returns (file_type, format_version).
pub fn read_common_header<R: Read>(reader: &mut R) -> Result<(u16, u16), Error> {
    let signature = reader.read_u64()?;
    if signature != TRELLIS_SIGNATURE {
        return Err(Error::Format(format!(
            "invalid Trellis file signature: expected {TRELLIS_SIGNATURE}, got {signature}"
        )));
    }
    let file_type = reader.read_u16()?;
    let format_version = reader.read_u16()?;
    Ok((file_type, format_version))
}

pub fn write_gene<W: Write>(writer: &mut W, gene: &Gene) -> Result<(), Error> {
    let mut body = Vec::new();
    encode_gene(&mut body, gene)?;
    let compressed = zstd::encode_all(body.as_slice(), COMPRESSION_LEVEL)?;

    write_common_header(writer, GENE_FILE_TYPE, GENE_FORMAT_VERSION)?;
    writer.write_len(compressed.len())?;
    writer.write_all(&compressed)?;
    Ok(())
}

pub fn read_gene<R: Read>(reader: &mut R) -> Result<Gene, Error> {
    let (file_type, format_version) = read_common_header(reader)?;
    if file_type != GENE_FILE_TYPE {
        return Err(Error::Format(format!(
            "expected gene file type {GENE_FILE_TYPE}, got {file_type}"
        )));
    }
    if format_version != GENE_FORMAT_VERSION {
        return Err(Error::Format(format!(
            "unsupported gene format version {format_version} (expected {GENE_FORMAT_VERSION})"
        )));
    }

    let len = reader.read_u32()? as usize;
    let mut compressed = vec![0u8; len];
    reader.read_exact(&mut compressed)?;
    let body = zstd::decode_all(compressed.as_slice())?;

    let mut cursor = Cursor::new(body.as_slice());
    let gene = decode_gene(&mut cursor)?;
    if (cursor.position() as usize) != body.len() {
        return Err(Error::Format(format!(
            "{} trailing bytes after gene record",
            body.len() - cursor.position() as usize
        )));
    }
    Ok(gene)
}

/// Writes `gene` to `path`, replacing any existing file.
pub fn write_gene_file(path: &Path, gene: &Gene) -> Result<(), Error> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_gene(&mut writer, gene)?;
    writer.flush()?;
    Ok(())
}

pub fn read_gene_file(path: &Path) -> Result<Gene, Error> {
    let mut reader = BufReader::new(File::open(path)?);
    read_gene(&mut reader)
}

fn encode_gene<W: Write>(w: &mut W, gene: &Gene) -> Result<(), Error> {
    w.write_string(&gene.id)?;
    w.write_opt_string(gene.name.as_deref())?;
    w.write_string(&gene.contig)?;
    w.write_u8(gene.strand.to_byte())?;
    w.write_i32(gene.start)?;
    w.write_i32(gene.stop)?;
    w.write_len(gene.transcripts.len())?;
    for t in &gene.transcripts {
        w.write_string(&t.id)?;
        w.write_string(&t.gene_id)?;
        w.write_len(t.exons.len())?;
        for &exon in &t.exons {
            w.write_interval(exon)?;
        }
        w.write_opt_interval(t.promoter)?;
        w.write_opt_interval(t.polya_region)?;
        w.write_opt_interval(t.coding_region.map(|c| Interval::new(c.start, c.stop)))?;
        w.write_opt_string(t.ref_gene.as_deref())?;
        w.write_opt_string(t.ref_trans.as_deref())?;
        w.write_u8(t.class_code.map_or(0, |c| c as u8))?;
        w.write_opt_string(t.gene_name.as_deref())?;
    }
    Ok(())
}

fn decode_gene<R: Read>(r: &mut R) -> Result<Gene, Error> {
    let id = r.read_string()?;
    let name = r.read_opt_string()?;
    let contig = r.read_string()?;
    let strand = Strand::try_from(r.read_u8()?)?;
    let start = r.read_i32()?;
    let stop = r.read_i32()?;

    let num_transcripts = r.read_u32()? as usize;
    let mut transcripts = Vec::with_capacity(num_transcripts.min(1024));
    for _ in 0..num_transcripts {
        let t_id = r.read_string()?;
        let gene_id = r.read_string()?;
        let num_exons = r.read_u32()? as usize;
        let exons = (0..num_exons)
            .map(|_| r.read_interval())
            .collect::<Result<Vec<_>, _>>()?;
        if !exons.windows(2).all(|w| w[0] < w[1]) {
            return Err(Error::Format(format!("exons of {t_id} are not sorted")));
        }

        let mut t = Transcript::new(t_id, &gene_id, &contig, strand, exons);
        t.promoter = r.read_opt_interval()?;
        t.polya_region = r.read_opt_interval()?;
        t.coding_region = r
            .read_opt_interval()?
            .map(|i| CodingRegion { start: i.start, stop: i.stop });
        t.ref_gene = r.read_opt_string()?;
        t.ref_trans = r.read_opt_string()?;
        t.class_code = match r.read_u8()? {
            0 => None,
            c if c.is_ascii_graphic() => Some(c as char),
            c => return Err(Error::Format(format!("invalid class code byte: {c}"))),
        };
        t.gene_name = r.read_opt_string()?;
        transcripts.push(t);
    }

    Ok(Gene {
        id,
        name,
        contig,
        strand,
        start,
        stop,
        transcripts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn annotated_gene() -> Gene {
        let mut coding = Transcript::new(
            "XLOC_7_0".to_string(),
            "XLOC_7",
            "chr2",
            Strand::Reverse,
            vec![Interval::new(100, 150), Interval::new(300, 350)],
        );
        coding.promoter = Some(Interval::new(320, 350));
        coding.coding_region = Some(CodingRegion { start: 120, stop: 330 });
        coding.ref_gene = Some("G1".to_string());
        coding.ref_trans = Some("R1".to_string());
        coding.class_code = Some('=');
        coding.gene_name = Some("ABC1".to_string());

        let single = Transcript::new(
            "XLOC_7_1".to_string(),
            "XLOC_7",
            "chr2",
            Strand::Reverse,
            vec![Interval::new(90, 360)],
        );
        Gene {
            id: "XLOC_7".to_string(),
            name: Some("G1".to_string()),
            contig: "chr2".to_string(),
            strand: Strand::Reverse,
            start: 90,
            stop: 360,
            transcripts: vec![coding, single],
        }
    }

    #[test]
    fn signature_bytes() {
        let bytes = TRELLIS_SIGNATURE.to_le_bytes();
        assert_eq!(bytes, [0x89, 0x54, 0x52, 0x4C, 0x0D, 0x0A, 0x1A, 0x0A]);
    }

    #[test]
    fn gene_file_restores_annotations() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("XLOC_7.NA.NA.gene");
        let gene = annotated_gene();
        write_gene_file(&path, &gene).unwrap();
        assert_eq!(read_gene_file(&path).unwrap(), gene);
    }

    #[test]
    fn wrong_signature_rejected() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&0u64.to_le_bytes());
        buf.extend_from_slice(&GENE_FILE_TYPE.to_le_bytes());
        buf.extend_from_slice(&GENE_FORMAT_VERSION.to_le_bytes());
        let err = read_gene(&mut Cursor::new(buf)).unwrap_err();
        assert!(err.to_string().contains("invalid Trellis file signature"));
    }

    #[test]
    fn unknown_version_rejected() {
        let mut buf = Vec::new();
        write_common_header(&mut buf, GENE_FILE_TYPE, GENE_FORMAT_VERSION + 1).unwrap();
        let err = read_gene(&mut Cursor::new(buf)).unwrap_err();
        assert!(err.to_string().contains("unsupported gene format version"));
    }

    #[test]
    fn truncated_body_is_an_error() {
        let mut buf = Vec::new();
        write_gene(&mut buf, &annotated_gene()).unwrap();
        buf.truncate(buf.len() - 4);
        assert!(read_gene(&mut Cursor::new(buf)).is_err());
    }
}
