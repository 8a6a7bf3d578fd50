use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use clif_model::{DomainCoverage, SourceDataset};
use clif_cli::pipeline::BuildResult;
use clif_report::{IndexHit, MatchKind, SourceIndex};

pub fn print_build_summary(result: &BuildResult) {
    println!("Standards: {}", result.standards_dir.display());
    println!("Concept dictionary: {}", result.concept_dict.display());
    if result.dry_run {
        println!("Output: {} (dry run, nothing written)", result.output_dir.display());
    } else {
        println!("Output: {}", result.output_dir.display());
    }

    let mut table = Table::new();
    let mut header = vec![
        header_cell("Domain"),
        header_cell("Categories"),
        header_cell("Linked"),
        header_cell("Mapped"),
    ];
    header.extend(SourceDataset::ALL.iter().map(|d| header_cell(d.label())));
    table.set_header(header);
    apply_summary_table_style(&mut table);
    for index in 1..table.column_count() {
        align_column(&mut table, index, CellAlignment::Right);
    }

    let mut totals = DomainTotals::default();
    for coverage in &result.coverage.domains {
        totals.add(coverage);
        let mut row = vec![
            Cell::new(coverage.domain.label())
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(coverage.total),
            Cell::new(format!("{} ({}%)", coverage.concept_linked, coverage.linked_percent())),
            count_cell(coverage.with_identifiers, coverage.total),
        ];
        row.extend(
            SourceDataset::ALL
                .iter()
                .map(|dataset| count_cell(coverage.dataset_count(*dataset), coverage.total)),
        );
        table.add_row(row);
    }

    let mut total_row = vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(totals.total).add_attribute(Attribute::Bold),
        Cell::new(totals.linked).add_attribute(Attribute::Bold),
        Cell::new(totals.mapped).add_attribute(Attribute::Bold),
    ];
    total_row.extend(
        totals
            .per_dataset
            .iter()
            .map(|count| Cell::new(count).add_attribute(Attribute::Bold)),
    );
    table.add_row(total_row);
    println!("{table}");

    for coverage in &result.coverage.domains {
        if !coverage.unmapped.is_empty() {
            println!(
                "Unmapped {}: {}",
                coverage.domain.as_str(),
                coverage.unmapped.join(", ")
            );
        }
    }
    for path in &result.written {
        println!("Wrote {}", path.display());
    }
}

#[derive(Default)]
struct DomainTotals {
    total: usize,
    linked: usize,
    mapped: usize,
    per_dataset: [usize; SourceDataset::ALL.len()],
}

impl DomainTotals {
    fn add(&mut self, coverage: &DomainCoverage) {
        self.total += coverage.total;
        self.linked += coverage.concept_linked;
        self.mapped += coverage.with_identifiers;
        for (slot, dataset) in self.per_dataset.iter_mut().zip(SourceDataset::ALL) {
            *slot += coverage.dataset_count(dataset);
        }
    }
}

/// One line per category: name, concept, notes.
pub fn category_table(rows: &[(String, Option<String>, Option<String>)]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Category", "Concept", "Notes"]);
    apply_table_style(&mut table);
    for (category, concept, notes) in rows {
        table.add_row(vec![
            Cell::new(category),
            match concept {
                Some(concept) => Cell::new(concept),
                None => dim_cell("-"),
            },
            Cell::new(notes.as_deref().unwrap_or_default()),
        ]);
    }
    table
}

pub fn print_index(index: &SourceIndex) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Match"),
        header_cell("Value"),
        header_cell("Domain"),
        header_cell("Category"),
    ]);
    apply_table_style(&mut table);
    for (id, targets) in index.ids() {
        for target in targets {
            table.add_row(index_row(MatchKind::Id, id, target.domain.as_str(), &target.category));
        }
    }
    for (column, targets) in index.columns() {
        for target in targets {
            table.add_row(index_row(
                MatchKind::Column,
                column,
                target.domain.as_str(),
                &target.category,
            ));
        }
    }
    for (pattern, target) in index.patterns() {
        table.add_row(index_row(
            MatchKind::Pattern,
            pattern,
            target.domain.as_str(),
            &target.category,
        ));
    }
    println!("Dataset: {}", index.dataset().label());
    println!("{table}");
}

pub fn print_hits(value: &str, hits: &[IndexHit]) {
    if hits.is_empty() {
        println!("{value}: no match");
        return;
    }
    for hit in hits {
        println!(
            "{value}: {}/{} ({} {})",
            hit.target.domain.as_str(),
            hit.target.category,
            kind_label(hit.kind),
            hit.value
        );
    }
}

fn index_row(kind: MatchKind, value: &str, domain: &str, category: &str) -> Vec<Cell> {
    vec![
        Cell::new(kind_label(kind)).fg(kind_color(kind)),
        Cell::new(value),
        Cell::new(domain),
        Cell::new(category),
    ]
}

fn kind_label(kind: MatchKind) -> &'static str {
    match kind {
        MatchKind::Id => "id",
        MatchKind::Column => "col",
        MatchKind::Pattern => "regex",
    }
}

fn kind_color(kind: MatchKind) -> Color {
    match kind {
        MatchKind::Id => Color::Green,
        MatchKind::Column => Color::Blue,
        MatchKind::Pattern => Color::Yellow,
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(140);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

/// Zero counts are dimmed; full coverage is green.
fn count_cell(count: usize, total: usize) -> Cell {
    if count == 0 {
        dim_cell(count)
    } else if count == total {
        Cell::new(count).fg(Color::Green)
    } else {
        Cell::new(count)
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
