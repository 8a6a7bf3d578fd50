//! CLI argument definitions for `openclif`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use clif_model::{ClinicalDomain, SourceDataset};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "openclif",
    version,
    about = "OpenCLIF - cross-dataset identifier mappings for CLIF categories",
    long_about = "Build CSV mapping tables that locate every CLIF category in the open ICU \
                  databases (MIMIC-III, MIMIC-IV, eICU-CRD, HiRID, AmsterdamUMCdb, SICdb).\n\n\
                  Category definitions and the category-to-concept crosswalk come from the \
                  pinned standards bundle; identifiers come from a concept dictionary."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for humans, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Generate the mapping tables from a concept dictionary.
    Build(BuildArgs),

    /// List CLIF categories with their crosswalk concept.
    Categories(CategoriesArgs),

    /// Verify the standards bundle and print a JSON report.
    Doctor(DoctorArgs),

    /// Resolve source identifiers of one dataset against emitted tables.
    Lookup(LookupArgs),
}

#[derive(Parser)]
pub struct BuildArgs {
    /// Concept dictionary JSON (default: the one pinned in the standards bundle).
    #[arg(long = "concept-dict", value_name = "JSON")]
    pub concept_dict: Option<PathBuf>,

    /// Standards bundle directory (default: $OPENCLIF_STANDARDS_DIR or the bundled standards/).
    #[arg(long = "standards-dir", value_name = "DIR")]
    pub standards_dir: Option<PathBuf>,

    /// Directory receiving one sub-directory per domain.
    #[arg(long = "output-dir", value_name = "DIR", default_value = "mappings")]
    pub output_dir: PathBuf,

    /// Restrict the build to these domains (repeatable; default: all).
    #[arg(long = "domain", value_enum)]
    pub domains: Vec<DomainArg>,

    /// Also write the coverage summary as JSON.
    #[arg(long = "coverage-report", value_name = "PATH")]
    pub coverage_report: Option<PathBuf>,

    /// Build and report without writing any file.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Parser)]
pub struct CategoriesArgs {
    #[arg(long = "standards-dir", value_name = "DIR")]
    pub standards_dir: Option<PathBuf>,

    /// Only list these domains (repeatable).
    #[arg(long = "domain", value_enum)]
    pub domains: Vec<DomainArg>,
}

#[derive(Parser)]
pub struct DoctorArgs {
    #[arg(long = "standards-dir", value_name = "DIR")]
    pub standards_dir: Option<PathBuf>,
}

#[derive(Parser)]
pub struct LookupArgs {
    /// Dataset whose identifier column is indexed.
    #[arg(long = "dataset", value_enum)]
    pub dataset: DatasetArg,

    /// Directory holding previously built mapping tables.
    #[arg(long = "mappings-dir", value_name = "DIR", default_value = "mappings")]
    pub mappings_dir: PathBuf,

    /// Only index these domains (repeatable).
    #[arg(long = "domain", value_enum)]
    pub domains: Vec<DomainArg>,

    /// Item ids, labels or column names to resolve. Without values the whole
    /// index is printed.
    #[arg(value_name = "VALUE")]
    pub values: Vec<String>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum DomainArg {
    Vitals,
    Labs,
    Medications,
    #[value(name = "respiratory_support", alias = "respiratory-support")]
    RespiratorySupport,
}

impl From<DomainArg> for ClinicalDomain {
    fn from(arg: DomainArg) -> Self {
        match arg {
            DomainArg::Vitals => ClinicalDomain::Vitals,
            DomainArg::Labs => ClinicalDomain::Labs,
            DomainArg::Medications => ClinicalDomain::Medications,
            DomainArg::RespiratorySupport => ClinicalDomain::RespiratorySupport,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum DatasetArg {
    #[value(alias = "mimic3")]
    Mimic,
    #[value(alias = "mimic4")]
    Miiv,
    Eicu,
    Hirid,
    Aumc,
    Sic,
}

impl From<DatasetArg> for SourceDataset {
    fn from(arg: DatasetArg) -> Self {
        match arg {
            DatasetArg::Mimic => SourceDataset::Mimic,
            DatasetArg::Miiv => SourceDataset::Miiv,
            DatasetArg::Eicu => SourceDataset::Eicu,
            DatasetArg::Hirid => SourceDataset::Hirid,
            DatasetArg::Aumc => SourceDataset::Aumc,
            DatasetArg::Sic => SourceDataset::Sic,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

/// Selected domains in canonical order; all of them when none is given.
pub fn selected_domains(args: &[DomainArg]) -> Vec<ClinicalDomain> {
    let requested: Vec<ClinicalDomain> = args.iter().copied().map(ClinicalDomain::from).collect();
    ClinicalDomain::ALL
        .into_iter()
        .filter(|domain| requested.is_empty() || requested.contains(domain))
        .collect()
}
