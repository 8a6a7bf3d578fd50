use std::fs;

use clif_map::{ConceptDictionary, MapError, MappingBuilder, build_table};
use clif_model::{
    Category, CategoryTable, ClinicalDomain, Crosswalk, CrosswalkEntry, SourceDataset,
};
use proptest::prelude::*;
use tempfile::TempDir;

const DICT: &str = r#"{
    "hr": {
        "description": "heart rate",
        "sources": {
            "sic": [{ "ids": 711, "table": "data_float_h", "sub_var": "DataID" }],
            "hirid": [{ "ids": 200, "table": "observations", "sub_var": "variableid" }]
        }
    },
    "sbp": {
        "sources": {
            "mimic": [{ "ids": [51, 442, 455], "table": "chartevents" }],
            "eicu": [
                { "val_var": "systemicsystolic", "table": "vitalperiodic" },
                { "regex": "^Non-Invasive BP Systolic$", "table": "vitalaperiodic" }
            ]
        }
    },
    "temp": { "sources": { "aumc": [{ "ids": "A12" }], "miiv": "chartevents" } }
}"#;

fn vitals() -> CategoryTable {
    let mut table = CategoryTable::new(
        ClinicalDomain::Vitals,
        CategoryTable::default_columns(ClinicalDomain::Vitals),
    );
    for (name, description) in [
        ("heart_rate", "Heart rate"),
        ("sbp", "Systolic blood pressure"),
        ("spo2", "Oxygen saturation"),
    ] {
        table.push(Category::new(name, description).unwrap()).unwrap();
    }
    table
}

fn crosswalk() -> Crosswalk {
    Crosswalk::from_entries([
        CrosswalkEntry::linked("Heart_Rate", "hr"),
        CrosswalkEntry::linked("sbp", "sbp"),
        CrosswalkEntry::unmapped("spo2", "not mapped yet"),
    ])
    .unwrap()
}

#[test]
fn heart_rate_scenario() {
    let dictionary = ConceptDictionary::from_json_str(DICT).unwrap();
    let mapping = build_table(&vitals(), &crosswalk(), &dictionary).unwrap();

    let hr = mapping.find("heart_rate").unwrap();
    assert_eq!(hr.concept.as_deref(), Some("hr"));
    assert_eq!(hr.rendered(SourceDataset::Sic), "711");
    assert_eq!(hr.rendered(SourceDataset::Hirid), "200");
    for dataset in [
        SourceDataset::Mimic,
        SourceDataset::Miiv,
        SourceDataset::Eicu,
        SourceDataset::Aumc,
    ] {
        assert_eq!(hr.rendered(dataset), "", "{dataset}");
    }
}

#[test]
fn rows_follow_definition_order() {
    let dictionary = ConceptDictionary::from_json_str(DICT).unwrap();
    let mapping = build_table(&vitals(), &crosswalk(), &dictionary).unwrap();
    let names: Vec<&str> = mapping.rows.iter().map(|r| r.category.name.as_str()).collect();
    assert_eq!(names, vec!["heart_rate", "sbp", "spo2"]);
    assert!(mapping.rows.iter().all(|r| !r.category.description.is_empty()));
}

#[test]
fn tagged_values_are_verbatim() {
    let dictionary = ConceptDictionary::from_json_str(DICT).unwrap();
    let mapping = build_table(&vitals(), &crosswalk(), &dictionary).unwrap();
    let sbp = mapping.find("sbp").unwrap();
    assert_eq!(sbp.rendered(SourceDataset::Mimic), "51; 442; 455");
    assert_eq!(
        sbp.rendered(SourceDataset::Eicu),
        "col:systemicsystolic; regex:^Non-Invasive BP Systolic$"
    );
}

#[test]
fn intentionally_unmapped_rows_are_empty() {
    let dictionary = ConceptDictionary::from_json_str(DICT).unwrap();
    let mapping = build_table(&vitals(), &crosswalk(), &dictionary).unwrap();
    let spo2 = mapping.find("spo2").unwrap();
    assert_eq!(spo2.concept, None);
    assert!(!spo2.has_identifiers());
}

#[test]
fn referencing_malformed_concept_is_fatal() {
    let dictionary = ConceptDictionary::from_json_str(DICT).unwrap();
    let crosswalk = Crosswalk::from_entries([CrosswalkEntry::linked("heart_rate", "temp")]).unwrap();

    let err = build_table(&vitals(), &crosswalk, &dictionary).unwrap_err();
    match err {
        MapError::MalformedDictionary { concept, .. } => assert_eq!(concept, "temp"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unreferenced_malformed_concept_is_ignored() {
    let dictionary = ConceptDictionary::from_json_str(DICT).unwrap();
    assert!(build_table(&vitals(), &crosswalk(), &dictionary).is_ok());
}

#[test]
fn builds_are_deterministic() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("concept-dict.json");
    fs::write(&path, DICT).unwrap();

    let first = ConceptDictionary::from_path(&path).unwrap();
    let second = ConceptDictionary::from_path(&path).unwrap();
    let tables = [vitals()];
    let crosswalk = crosswalk();
    let a = MappingBuilder::new(&crosswalk, &first).build_all(&tables).unwrap();
    let b = MappingBuilder::new(&crosswalk, &second).build_all(&tables).unwrap();
    assert_eq!(a, b);
}

#[test]
fn missing_dictionary_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let err = ConceptDictionary::from_path(&dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, MapError::Io { .. }));
}

fn id_value() -> impl Strategy<Value = (serde_json::Value, String)> {
    prop_oneof![
        (1u32..1_000_000).prop_map(|id| (serde_json::json!(id), id.to_string())),
        "[ A-Za-z0-9_.-]{0,3}[A-Za-z0-9][ A-Za-z0-9_.-]{0,3}"
            .prop_map(|id| (serde_json::json!(id.clone()), id)),
    ]
}

proptest! {
    #[test]
    fn id_lists_survive_the_builder(ids in proptest::collection::vec(id_value(), 1..8)) {
        let values: Vec<serde_json::Value> = ids.iter().map(|(value, _)| value.clone()).collect();
        let json = serde_json::json!({ "hr": { "sources": { "miiv": [{ "ids": values }] } } });
        let dictionary = ConceptDictionary::from_value(&json).unwrap();
        let mapping = build_table(&vitals(), &crosswalk(), &dictionary).unwrap();
        let cell = mapping.find("heart_rate").unwrap().rendered(SourceDataset::Miiv);
        let split: Vec<String> = cell.split("; ").map(ToString::to_string).collect();
        let expected: Vec<String> = ids.into_iter().map(|(_, text)| text).collect();
        prop_assert_eq!(split, expected);
    }
}
