//! Contig naming conventions for output files.

/// Rewrites a contig name into UCSC style (`chr` prefix, `chrM` for the
/// mitochondrial genome) so GTF output loads directly into the browser.
#[must_use]
pub fn fix_contig_name_for_ucsc(name: &str) -> String {
    match name {
        "M" | "MT" | "chrMT" => "chrM".to_string(),
        _ if name.starts_with("chr") => name.to_string(),
        _ => format!("chr{name}"),
    }
}

/// Returns the contig name to emit, honouring the UCSC-renaming switch.
#[must_use]
pub fn output_contig_name(name: &str, fix_for_ucsc: bool) -> String {
    if fix_for_ucsc {
        fix_contig_name_for_ucsc(name)
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adds_prefix() {
        assert_eq!(fix_contig_name_for_ucsc("2L"), "chr2L");
        assert_eq!(fix_contig_name_for_ucsc("X"), "chrX");
    }

    #[test]
    fn keeps_existing_prefix() {
        assert_eq!(fix_contig_name_for_ucsc("chr4"), "chr4");
    }

    #[test]
    fn mitochondrial_aliases() {
        assert_eq!(fix_contig_name_for_ucsc("M"), "chrM");
        assert_eq!(fix_contig_name_for_ucsc("MT"), "chrM");
        assert_eq!(fix_contig_name_for_ucsc("chrMT"), "chrM");
    }

    #[test]
    fn switch_off_is_identity() {
        assert_eq!(output_contig_name("2L", false), "2L");
        assert_eq!(output_contig_name("2L", true), "chr2L");
    }
}
