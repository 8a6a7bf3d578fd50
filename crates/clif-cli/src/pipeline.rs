//! The `build` pipeline: standards → dictionary → tables → files.
//!
//! Nothing is written until every table has been built and rendered, so a
//! failing run leaves the output directory untouched.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clif_map::{ConceptDictionary, MappingBuilder};
use clif_model::{ClinicalDomain, CoverageReport, MappingTable};
use clif_report::OutputBatch;
use clif_standards::{StandardsRegistry, VerifySummary, resolve_standards_root};
use tracing::{info, info_span};

#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub concept_dict: Option<PathBuf>,
    pub standards_dir: Option<PathBuf>,
    pub output_dir: PathBuf,
    pub domains: Vec<ClinicalDomain>,
    pub coverage_report: Option<PathBuf>,
    pub dry_run: bool,
}

impl BuildOptions {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            concept_dict: None,
            standards_dir: None,
            output_dir: output_dir.into(),
            domains: ClinicalDomain::ALL.to_vec(),
            coverage_report: None,
            dry_run: false,
        }
    }
}

#[derive(Debug)]
pub struct BuildResult {
    pub standards_dir: PathBuf,
    pub concept_dict: PathBuf,
    pub output_dir: PathBuf,
    pub tables: Vec<MappingTable>,
    pub coverage: CoverageReport,
    /// Files written, in write order. Empty on a dry run.
    pub written: Vec<PathBuf>,
    pub dry_run: bool,
}

pub fn load_standards(standards_dir: Option<PathBuf>) -> Result<(StandardsRegistry, VerifySummary)> {
    let root = resolve_standards_root(standards_dir);
    StandardsRegistry::verify_and_load(&root)
        .with_context(|| format!("load standards bundle from {}", root.display()))
}

/// The explicit dictionary path, else the one pinned in the bundle.
pub fn resolve_concept_dict(
    explicit: Option<&Path>,
    registry: &StandardsRegistry,
) -> Result<PathBuf> {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| registry.concept_dict_path())
        .ok_or_else(|| {
            anyhow!("no concept dictionary given and none pinned in the standards bundle")
        })
}

pub fn build_tables(
    registry: &StandardsRegistry,
    dictionary: &ConceptDictionary,
    domains: &[ClinicalDomain],
) -> Result<Vec<MappingTable>> {
    let builder = MappingBuilder::new(&registry.crosswalk, dictionary);
    let mut tables = Vec::with_capacity(domains.len());
    for domain in domains {
        let definitions = registry
            .table(*domain)
            .ok_or_else(|| anyhow!("standards bundle has no {domain} definitions"))?;
        let table = builder
            .build_table(definitions)
            .with_context(|| format!("build {domain} mapping table"))?;
        tables.push(table);
    }
    Ok(tables)
}

pub fn run_build(options: &BuildOptions) -> Result<BuildResult> {
    let span = info_span!("build", output_dir = %options.output_dir.display());
    let _guard = span.enter();

    let (registry, _summary) = load_standards(options.standards_dir.clone())?;
    let concept_dict = resolve_concept_dict(options.concept_dict.as_deref(), &registry)?;
    let dictionary = ConceptDictionary::from_path(&concept_dict)
        .with_context(|| format!("load concept dictionary {}", concept_dict.display()))?;

    let tables = build_tables(&registry, &dictionary, &options.domains)?;
    let coverage = CoverageReport::from_tables(&tables);

    let mut batch = OutputBatch::new();
    for table in &tables {
        batch
            .add_table(&options.output_dir, table)
            .with_context(|| format!("render {} table", table.domain))?;
    }
    if let Some(path) = &options.coverage_report {
        batch
            .add_coverage(path, &coverage)
            .context("render coverage report")?;
    }

    let written = if options.dry_run {
        info!(files = batch.len(), "dry run: skipping output");
        Vec::new()
    } else {
        batch.commit().context("write output files")?
    };

    Ok(BuildResult {
        standards_dir: registry.root.clone(),
        concept_dict,
        output_dir: options.output_dir.clone(),
        tables,
        coverage,
        written,
        dry_run: options.dry_run,
    })
}
