//! Rendering mapping tables and coverage reports to bytes.

use clif_model::{CoverageReport, MappingTable};

use crate::error::{ReportError, Result};

/// Render a table as CSV: header row, then one record per category.
pub fn render_table(table: &MappingTable) -> Result<Vec<u8>> {
    let origin = table.domain.table_path();
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer
        .write_record(table.header())
        .map_err(|e| ReportError::csv(&origin, e))?;
    for row in &table.rows {
        writer
            .write_record(table.record(row))
            .map_err(|e| ReportError::csv(&origin, e))?;
    }
    writer
        .into_inner()
        .map_err(|e| ReportError::csv(&origin, e.error()))
}

/// Pretty JSON with a trailing newline.
pub fn render_coverage(report: &CoverageReport) -> Result<Vec<u8>> {
    let mut bytes = serde_json::to_vec_pretty(report)?;
    bytes.push(b'\n');
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use clif_model::{
        Category, ClinicalDomain, IdentifierExpression, IdentifierTerm, MappingRow, SourceDataset,
    };

    use super::*;

    fn vitals() -> MappingTable {
        let mut table = MappingTable::new(
            ClinicalDomain::Vitals,
            vec![
                "vital_category".to_string(),
                "description".to_string(),
                "vital_name_examples".to_string(),
            ],
        );
        let heart_rate = Category::new("heart_rate", "Heart rate")
            .unwrap()
            .with_examples(["heart rate", "pulse"]);
        let mut row = MappingRow::unmapped(heart_rate, Some("hr".to_string()));
        row.identifiers
            .insert(SourceDataset::Sic, IdentifierExpression::from_ids(["711"]));
        row.identifiers.insert(
            SourceDataset::Eicu,
            IdentifierExpression::new(vec![
                IdentifierTerm::Column("heartrate".to_string()),
                IdentifierTerm::Pattern("^Heart Rate$".to_string()),
            ]),
        );
        table.rows.push(row);
        table.rows.push(MappingRow::unmapped(
            Category::new("spo2", "Oxygen saturation").unwrap(),
            None,
        ));
        table
    }

    #[test]
    fn renders_header_and_rows() {
        let bytes = render_table(&vitals()).unwrap();
        insta::assert_snapshot!(String::from_utf8(bytes).unwrap(), @r#"
        vital_category,description,vital_name_examples,ricu_concept,mimic_iii_itemid,mimic_iv_itemid,eicu_ids,hirid_ids,aumc_ids,sic_ids
        heart_rate,Heart rate,"heart rate, pulse",hr,,,col:heartrate; regex:^Heart Rate$,,,711
        spo2,Oxygen saturation,,,,,,,,
        "#);
    }

    #[test]
    fn coverage_ends_with_newline() {
        let report = CoverageReport::from_tables([&vitals()]);
        let bytes = render_coverage(&report).unwrap();
        assert_eq!(bytes.last(), Some(&b'\n'));
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["domains"][0]["with_identifiers"], 1);
    }
}
