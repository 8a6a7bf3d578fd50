use anyhow::{Context, Result, bail};
use tracing::info;

use clif_cli::pipeline::{BuildOptions, BuildResult, load_standards, run_build as run_pipeline};
use clif_model::SourceDataset;
use clif_report::{SourceIndex, read_mapping_dir};
use clif_standards::DoctorReport;

use crate::cli::{BuildArgs, CategoriesArgs, DoctorArgs, LookupArgs, selected_domains};
use crate::summary::{category_table, print_hits, print_index};

pub fn run_build(args: &BuildArgs) -> Result<BuildResult> {
    let options = BuildOptions {
        concept_dict: args.concept_dict.clone(),
        standards_dir: args.standards_dir.clone(),
        output_dir: args.output_dir.clone(),
        domains: selected_domains(&args.domains),
        coverage_report: args.coverage_report.clone(),
        dry_run: args.dry_run,
    };
    run_pipeline(&options)
}

pub fn run_categories(args: &CategoriesArgs) -> Result<()> {
    let (registry, _) = load_standards(args.standards_dir.clone())?;
    for domain in selected_domains(&args.domains) {
        let Some(definitions) = registry.table(domain) else {
            continue;
        };
        let rows: Vec<(String, Option<String>, Option<String>)> = definitions
            .categories
            .iter()
            .map(|category| {
                let entry = registry.crosswalk.entry(&category.name);
                (
                    category.name.clone(),
                    entry.and_then(|e| e.concept.clone()),
                    entry.and_then(|e| e.notes.clone()),
                )
            })
            .collect();
        println!("{} ({} categories)", domain.label(), rows.len());
        println!("{}", category_table(&rows));
    }
    Ok(())
}

/// Prints the doctor report; returns whether category definitions and
/// crosswalk agree.
pub fn run_doctor(args: &DoctorArgs) -> Result<bool> {
    let (registry, summary) = load_standards(args.standards_dir.clone())?;
    let report = DoctorReport::from_verify_summary(&summary, registry.files.clone());
    let json = serde_json::to_string_pretty(&report).context("serialize doctor report")?;
    println!("{json}");
    Ok(report.is_consistent())
}

pub fn run_lookup(args: &LookupArgs) -> Result<()> {
    let dataset = SourceDataset::from(args.dataset);
    let domains = selected_domains(&args.domains);
    let tables = read_mapping_dir(&args.mappings_dir, &domains)
        .with_context(|| format!("read mapping tables from {}", args.mappings_dir.display()))?;
    if tables.is_empty() {
        bail!(
            "no mapping tables found under {} (run `openclif build` first)",
            args.mappings_dir.display()
        );
    }

    let index = SourceIndex::from_tables(dataset, &tables);
    info!(dataset = %dataset, entries = index.len(), "built source index");
    if args.values.is_empty() {
        print_index(&index);
    } else {
        for value in &args.values {
            print_hits(value, &index.lookup(value));
        }
    }
    Ok(())
}
