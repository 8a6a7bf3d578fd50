//! Property tests for identifier expressions.

use clif_model::{ExpressionKind, IdentifierExpression, IdentifierTerm};
use proptest::prelude::*;

fn id_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        (1u32..400_000).prop_map(|n| n.to_string()),
        "[a-z][a-z0-9 _%-]{0,15}[a-z0-9]",
    ]
}

fn term_strategy() -> impl Strategy<Value = IdentifierTerm> {
    prop_oneof![
        id_strategy().prop_map(IdentifierTerm::Id),
        "\\^[a-z .()|*+?]{1,20}\\$".prop_map(IdentifierTerm::Pattern),
        "[a-z_]{1,12}".prop_map(IdentifierTerm::Column),
    ]
}

proptest! {
    #[test]
    fn id_lists_split_back_into_the_same_ids(ids in prop::collection::vec(id_strategy(), 1..8)) {
        let expr = IdentifierExpression::from_ids(ids.clone());
        let rendered = expr.render();
        let split: Vec<String> = rendered.split("; ").map(ToString::to_string).collect();
        prop_assert_eq!(split, ids);
    }

    #[test]
    fn rendered_expressions_parse_back(terms in prop::collection::vec(term_strategy(), 0..6)) {
        let expr = IdentifierExpression::new(terms);
        let parsed = IdentifierExpression::parse(&expr.render());
        prop_assert_eq!(parsed, expr);
    }

    #[test]
    fn tagged_terms_render_verbatim(pattern in "\\^[A-Za-z0-9 ,.()\\[\\]|*+?\\\\-]{1,24}\\$") {
        let expr = IdentifierExpression::new(vec![IdentifierTerm::Pattern(pattern.clone())]);
        prop_assert_eq!(expr.render(), format!("regex:{pattern}"));
        prop_assert_eq!(expr.kind(), ExpressionKind::Pattern);
    }
}

#[test]
fn serializes_terms_with_kind_tags() {
    let expr = IdentifierExpression::new(vec![
        IdentifierTerm::Id("200".to_string()),
        IdentifierTerm::Column("sao2".to_string()),
    ]);
    let json = serde_json::to_value(&expr).expect("serialize");
    assert_eq!(
        json,
        serde_json::json!([
            {"kind": "id", "value": "200"},
            {"kind": "column", "value": "sao2"}
        ])
    );
}
