// Property-based tests for column resolution.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use std::collections::HashSet;

use proptest::prelude::*;

use gridport_io::columns::resolve_columns;
use gridport_io::schema::{FieldDescriptor, Schema};

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn config_256() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct FieldCase {
    index: Option<usize>,
    ignored: bool,
    excluded: bool,
}

fn arb_field() -> impl Strategy<Value = FieldCase> {
    (
        prop_oneof![
            3 => Just(None),
            1 => (0usize..12).prop_map(Some),
        ],
        prop::bool::weighted(0.1),
        prop::bool::weighted(0.2),
    )
        .prop_map(|(index, ignored, excluded)| FieldCase {
            index,
            ignored,
            excluded,
        })
}

fn arb_fields() -> impl Strategy<Value = Vec<FieldCase>> {
    prop::collection::vec(arb_field(), 0..10)
}

fn build(cases: &[FieldCase]) -> (Schema, HashSet<String>) {
    let mut schema = Schema::new();
    let mut exclude = HashSet::new();

    for (position, case) in cases.iter().enumerate() {
        let name = format!("field{}", position);
        let mut field = FieldDescriptor::new(name.as_str());
        if let Some(index) = case.index {
            field = field.index(index);
        }
        if case.ignored {
            field = field.ignore();
        }
        if case.excluded {
            exclude.insert(name);
        }
        schema = schema.field(field);
    }

    (schema, exclude)
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]

    /// Resolved indices are exactly {0..k-1}: contiguous, no duplicates,
    /// no gaps, for any mix of explicit indices, ignores and exclusions.
    #[test]
    fn resolved_indices_are_contiguous(cases in arb_fields()) {
        let (schema, exclude) = build(&cases);
        let columns = resolve_columns(&schema, &exclude);

        let expected = cases
            .iter()
            .filter(|s| !s.ignored && !s.excluded)
            .count();
        prop_assert_eq!(columns.len(), expected);

        for (position, meta) in columns.iter().enumerate() {
            prop_assert_eq!(meta.index, position);
        }
    }

    /// With unique explicit indices every included field gets a distinct
    /// pre-renumber slot, so explicitly indexed fields always come out in
    /// index order relative to each other, whatever the declaration order.
    #[test]
    fn explicit_fields_keep_index_order(cases in arb_fields()) {
        let (schema, exclude) = build(&cases);

        let explicit: Vec<usize> = cases.iter().filter_map(|s| s.index).collect();
        let unique = {
            let mut sorted = explicit.clone();
            sorted.sort_unstable();
            sorted.windows(2).all(|w| w[0] != w[1])
        };
        prop_assume!(unique);

        let columns = resolve_columns(&schema, &exclude);

        // With unique explicit indices, included explicit fields appear in
        // index order relative to each other.
        let explicit_order: Vec<usize> = columns
            .iter()
            .filter_map(|meta| schema.get(&meta.field_name).and_then(|f| f.declared_index()))
            .collect();
        let mut sorted = explicit_order.clone();
        sorted.sort_unstable();
        prop_assert_eq!(explicit_order, sorted);
    }

    /// Resolution is a pure function: same inputs, same output.
    #[test]
    fn resolution_is_deterministic(cases in arb_fields()) {
        let (schema, exclude) = build(&cases);
        let first = resolve_columns(&schema, &exclude);
        let second = resolve_columns(&schema, &exclude);
        prop_assert_eq!(first, second);
    }
}
