use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;

use trellis::cli;
use trellis::config::BuildConfig;
use trellis::elements::load_elements_path;
use trellis::fasta::Genome;
use trellis::orf::LongestOrfFinder;
use trellis::perf::format_count;
use trellis::pipeline::build_transcripts;
use trellis::reference::ReferenceIndex;
use trellis::transcript::GeneAssembler;

#[derive(Parser)]
#[command(
    name = "build_transcripts",
    about = "Assemble candidate transcripts from gene elements"
)]
struct Cli {
    /// BED6 file of gene elements (plain or .gz)
    #[arg(short = 'e', long = "elements")]
    elements: PathBuf,

    /// Output GTF path
    #[arg(long = "gtf")]
    gtf: PathBuf,

    /// Output tracking path
    #[arg(long = "tracking")]
    tracking: PathBuf,

    /// Path to a JSON configuration file
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Genome FASTA used to annotate coding regions
    #[arg(short = 'f', long = "fasta")]
    fasta: Option<PathBuf>,

    /// Reference annotation GTF used to assign class codes
    #[arg(short = 'r', long = "reference")]
    reference: Option<PathBuf>,

    #[arg(short = 't', long = "threads")]
    threads: Option<usize>,

    /// Directory for per-gene files
    #[arg(long = "tmp-dir")]
    tmp_dir: Option<PathBuf>,

    #[arg(long = "sample-type")]
    sample_type: Option<String>,

    #[arg(long = "rep-id")]
    rep_id: Option<String>,
}

impl Cli {
    fn build_config(&self) -> Result<BuildConfig> {
        let mut config = match &self.config {
            Some(path) => BuildConfig::from_file(path)?,
            None => BuildConfig::default(),
        };
        if let Some(threads) = self.threads {
            config.threads = threads;
        }
        if let Some(tmp_dir) = &self.tmp_dir {
            config.tmp_dir.clone_from(tmp_dir);
        }
        if self.sample_type.is_some() {
            config.sample_type.clone_from(&self.sample_type);
        }
        if self.rep_id.is_some() {
            config.rep_id.clone_from(&self.rep_id);
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let start = Instant::now();
    let cli_args = Cli::parse();

    cli::banner("Build Transcripts");

    // ── Configuration ────────────────────────────────────
    cli::section("Configuration");

    let config = cli_args.build_config()?;
    cli::kv("Elements", &cli_args.elements.display().to_string());
    cli::kv("GTF", &cli_args.gtf.display().to_string());
    cli::kv("Tracking", &cli_args.tracking.display().to_string());
    cli::kv_opt(
        "FASTA",
        cli_args.fasta.as_ref().map(|p| p.display().to_string()).as_deref(),
    );
    cli::kv_opt(
        "Reference",
        cli_args.reference.as_ref().map(|p| p.display().to_string()).as_deref(),
    );
    cli::kv("Threads", &config.threads.to_string());
    cli::kv("Temp dir", &config.tmp_dir.display().to_string());
    match config.max_fragment_length {
        Some(max) => cli::kv("Enumeration", &format!("fragments of {max} bp")),
        None => cli::kv("Enumeration", "exhaustive"),
    }
    cli::kv(
        "Max candidates",
        &format_count(config.max_candidate_transcripts as u64),
    );

    eprintln!();

    // ── Inputs ───────────────────────────────────────────
    cli::section("Inputs");

    let groups = load_elements_path(&cli_args.elements)
        .with_context(|| format!("failed to load elements: {}", cli_args.elements.display()))?;
    let num_loci: usize = groups.values().map(|g| g.num_genes()).sum();
    cli::kv("Contig/strands", &groups.len().to_string());
    cli::kv("Gene loci", &format_count(num_loci as u64));

    let finder = match &cli_args.fasta {
        Some(path) => {
            let genome = Genome::from_path(path)
                .with_context(|| format!("failed to load FASTA: {}", path.display()))?;
            cli::kv("Contigs", &genome.len().to_string());
            Some(LongestOrfFinder::new(genome, config.min_orf_aas))
        }
        None => None,
    };
    let reference = match &cli_args.reference {
        Some(path) => {
            let index = ReferenceIndex::from_path(path)
                .with_context(|| format!("failed to load reference: {}", path.display()))?;
            cli::kv("Reference genes", &format_count(index.num_genes() as u64));
            Some(index)
        }
        None => None,
    };

    eprintln!();

    // ── Build ────────────────────────────────────────────
    cli::section("Build");

    let mut assembler = GeneAssembler::new(&config);
    if let Some(finder) = &finder {
        assembler = assembler.with_coding_finder(finder);
    }
    if let Some(reference) = &reference {
        assembler = assembler.with_reference(reference);
    }

    let records = build_transcripts(&groups, &cli_args.gtf, &cli_args.tracking, &config, assembler)
        .context("failed to build transcripts")?;

    let num_transcripts: usize = records.iter().map(|r| r.num_transcripts).sum();
    cli::kv("Genes", &format_count(records.len() as u64));
    cli::kv("Transcripts", &format_count(num_transcripts as u64));
    if records.len() < num_loci {
        cli::warning(&format!(
            "{} loci produced no gene (see log)",
            format_count((num_loci - records.len()) as u64)
        ));
    }
    cli::success(&format!("wrote {}", cli_args.gtf.display()));
    cli::success(&format!("wrote {}", cli_args.tracking.display()));

    cli::print_summary(start, records.len());
    Ok(())
}
