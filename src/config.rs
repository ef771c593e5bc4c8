use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

/// Ceiling on enumerated candidate transcripts per gene.
pub const DEFAULT_MAX_CANDIDATE_TRANSCRIPTS: usize = 1_000_000;

/// Minimum open reading frame length, in codons, accepted as a coding region.
pub const DEFAULT_MIN_ORF_AAS: usize = 100;

/// Settings threaded through gene assembly, writing and work distribution.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Worker slots: producers plus pure consumers never exceed this.
    pub threads: usize,
    pub max_candidate_transcripts: usize,
    /// When set, genes are enumerated as length-capped fragments.
    pub max_fragment_length: Option<u64>,
    pub enqueue_timeout_ms: u64,
    pub monitor_poll_ms: u64,
    pub fix_chrm_names_for_ucsc: bool,
    /// Log the full error chain and a backtrace for failed genes.
    pub verbose_errors: bool,
    pub min_orf_aas: usize,
    pub tmp_dir: PathBuf,
    pub sample_type: Option<String>,
    pub rep_id: Option<String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            threads: 1,
            max_candidate_transcripts: DEFAULT_MAX_CANDIDATE_TRANSCRIPTS,
            max_fragment_length: None,
            enqueue_timeout_ms: 100,
            monitor_poll_ms: 1000,
            fix_chrm_names_for_ucsc: true,
            verbose_errors: false,
            min_orf_aas: DEFAULT_MIN_ORF_AAS,
            tmp_dir: std::env::temp_dir(),
            sample_type: None,
            rep_id: None,
        }
    }
}

impl BuildConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.threads == 0 {
            bail!("threads must be at least 1");
        }
        if self.max_candidate_transcripts == 0 {
            bail!("maxCandidateTranscripts must be at least 1");
        }
        if self.max_fragment_length == Some(0) {
            bail!("maxFragmentLength must be positive when set");
        }
        if self.enqueue_timeout_ms == 0 {
            bail!("enqueueTimeoutMs must be positive");
        }
        if self.min_orf_aas == 0 {
            bail!("minOrfAas must be at least 1");
        }
        Ok(())
    }

    #[must_use]
    pub fn enqueue_timeout(&self) -> Duration {
        Duration::from_millis(self.enqueue_timeout_ms)
    }

    #[must_use]
    pub fn monitor_poll_interval(&self) -> Duration {
        Duration::from_millis(self.monitor_poll_ms)
    }

    /// Capacity of the shared gene queue.
    #[must_use]
    pub fn queue_capacity(&self) -> usize {
        2 * self.threads
    }

    /// Temporary file holding one serialized gene, keyed by gene id,
    /// sample type and replicate id.
    #[must_use]
    pub fn gene_tmp_path(&self, gene_id: &str) -> PathBuf {
        let sample = self.sample_type.as_deref().unwrap_or("NA");
        let rep = self.rep_id.as_deref().unwrap_or("NA");
        self.tmp_dir.join(format!("{gene_id}.{sample}.{rep}.gene"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(json: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(json.as_bytes()).unwrap();
        f
    }

    #[test]
    fn valid_config_all_fields() {
        let json = r#"{
            "threads": 8,
            "maxCandidateTranscripts": 5000,
            "maxFragmentLength": 600,
            "enqueueTimeoutMs": 50,
            "monitorPollMs": 250,
            "fixChrmNamesForUcsc": false,
            "verboseErrors": true,
            "minOrfAas": 50,
            "tmpDir": "/scratch/genes",
            "sampleType": "rnaseq",
            "repId": "rep1"
        }"#;
        let f = write_config(json);
        let config = BuildConfig::from_file(f.path()).unwrap();
        assert_eq!(config.threads, 8);
        assert_eq!(config.queue_capacity(), 16);
        assert_eq!(config.max_fragment_length, Some(600));
        assert_eq!(config.enqueue_timeout(), Duration::from_millis(50));
        assert!(!config.fix_chrm_names_for_ucsc);
        assert_eq!(
            config.gene_tmp_path("XLOC_7"),
            PathBuf::from("/scratch/genes/XLOC_7.rnaseq.rep1.gene")
        );
    }

    #[test]
    fn omitted_fields_use_defaults() {
        let f = write_config(r#"{ "threads": 4 }"#);
        let config = BuildConfig::from_file(f.path()).unwrap();
        assert_eq!(config.threads, 4);
        assert_eq!(
            config.max_candidate_transcripts,
            DEFAULT_MAX_CANDIDATE_TRANSCRIPTS
        );
        assert!(config.max_fragment_length.is_none());
        assert!(config.sample_type.is_none());
        assert!(
            config
                .gene_tmp_path("XLOC_0")
                .ends_with("XLOC_0.NA.NA.gene")
        );
    }

    #[test]
    fn zero_threads_rejected() {
        let f = write_config(r#"{ "threads": 0 }"#);
        let err = BuildConfig::from_file(f.path()).unwrap_err();
        assert!(err.to_string().contains("threads"));
    }

    #[test]
    fn zero_fragment_length_rejected() {
        let f = write_config(r#"{ "maxFragmentLength": 0 }"#);
        let err = BuildConfig::from_file(f.path()).unwrap_err();
        assert!(err.to_string().contains("maxFragmentLength"));
    }

    #[test]
    fn unknown_field_rejected() {
        let f = write_config(r#"{ "nthreads": 2 }"#);
        let err = BuildConfig::from_file(f.path()).unwrap_err();
        assert!(err.to_string().contains("failed to parse config file"));
    }
}
