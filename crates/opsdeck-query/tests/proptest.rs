//! Property-based tests for the query pipeline using proptest.

use opsdeck_query::{
    group_by, take_first, Dir, GroupBy, Number, Op, Query, Sort, Value,
};
use proptest::prelude::*;

// ============================================================================
// Test helpers
// ============================================================================

fn number_accessor<'a>(n: &'a i64, _field: &str) -> Value<'a> {
    Value::Number(Number::I64(*n))
}

#[derive(Debug, Clone)]
struct Row {
    index: usize,
    score: Option<i64>,
    name: String,
    email: String,
}

fn row_accessor<'a>(row: &'a Row, field: &str) -> Value<'a> {
    match field {
        "index" => Value::Number(Number::from(row.index)),
        "score" => row.score.map_or(Value::None, |s| Value::Number(Number::I64(s))),
        "name" => Value::String(&row.name),
        "email" => Value::String(&row.email),
        _ => Value::None,
    }
}

// Small score domain so that ties and missing values are common.
fn rows_strategy() -> impl Strategy<Value = Vec<Row>> {
    prop::collection::vec(
        (prop::option::of(0i64..5), "[a-c]{1,4}", "[a-c]{1,4}"),
        0..60,
    )
    .prop_map(|raw| {
        raw.into_iter()
            .enumerate()
            .map(|(index, (score, name, email))| Row {
                index,
                score,
                name,
                email,
            })
            .collect()
    })
}

// ============================================================================
// Property tests
// ============================================================================

proptest! {
    /// Filter should never return more items than the input.
    #[test]
    fn filter_never_grows_collection(
        items in prop::collection::vec(any::<i64>(), 0..100),
        threshold in any::<i64>(),
    ) {
        let query = Query::new().greater_than("value", threshold).build();
        let results = query.filter(&items, number_accessor);
        prop_assert!(results.len() <= items.len());
    }

    /// Count should equal the length of filtered results.
    #[test]
    fn count_equals_filter_len(
        items in prop::collection::vec(any::<i64>(), 0..100),
        threshold in any::<i64>(),
    ) {
        let query = Query::new().greater_or_equal("value", threshold).build();
        prop_assert_eq!(
            query.filter(&items, number_accessor).len(),
            query.count(&items, number_accessor)
        );
    }

    /// An empty query returns the input unchanged, in order.
    #[test]
    fn empty_query_is_identity(rows in rows_strategy()) {
        let results = Query::new().filter(&rows, row_accessor);
        prop_assert_eq!(results.len(), rows.len());
        for (result, row) in results.iter().zip(&rows) {
            prop_assert!(std::ptr::eq(*result, row));
        }
    }

    /// Offset and limit never exceed their bounds.
    #[test]
    fn offset_and_limit_bounds(
        items in prop::collection::vec(any::<i64>(), 0..100),
        offset in 0usize..50,
        limit in 0usize..50,
    ) {
        let results = Query::new().offset(offset).limit(limit).filter(&items, number_accessor);
        prop_assert!(results.len() <= limit);
        prop_assert_eq!(results.len(), items.len().saturating_sub(offset).min(limit));
    }

    /// take_first returns min(n, len) items from the front.
    #[test]
    fn take_first_bounds(
        items in prop::collection::vec(any::<i64>(), 0..50),
        n in 0usize..100,
    ) {
        let first = take_first(&items, n);
        prop_assert_eq!(first.len(), n.min(items.len()));
        prop_assert_eq!(&first[..], &items[..first.len()]);
    }

    /// not_equals is the exact complement of equals.
    #[test]
    fn not_equals_complements_equals(rows in rows_strategy(), target in 0i64..5) {
        let eq = Query::new().equals("score", target).count(&rows, row_accessor);
        let ne = Query::new().not_equals("score", target).count(&rows, row_accessor);
        prop_assert_eq!(eq + ne, rows.len());
    }

    /// A record matches a search when any search field contains the term.
    #[test]
    fn search_is_or_across_fields(rows in rows_strategy(), term in "[a-c]{1,2}") {
        let query = Query::new().search(&term, ["name", "email"]);
        for row in &rows {
            let expected = row.name.contains(&term) || row.email.contains(&term);
            prop_assert_eq!(query.matches(row, row_accessor), expected);
        }
    }

    /// Equal keys keep input order; missing keys come last in both directions.
    #[test]
    fn sort_is_stable_with_missing_last(rows in rows_strategy(), desc in any::<bool>()) {
        let dir = if desc { Dir::Desc } else { Dir::Asc };
        let mut refs: Vec<&Row> = rows.iter().collect();
        Sort::new("score", dir).apply(&mut refs, row_accessor);

        for pair in refs.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            match (a.score, b.score) {
                (None, Some(_)) => prop_assert!(false, "missing score sorted before a present one"),
                (Some(x), Some(y)) if x == y => prop_assert!(a.index < b.index),
                (None, None) => prop_assert!(a.index < b.index),
                (Some(x), Some(y)) => prop_assert!(if desc { x > y } else { x < y }, "out of order: {:?} then {:?}", x, y),
                (Some(_), None) => {}
            }
        }
    }

    /// Every record lands in exactly one group.
    #[test]
    fn grouping_is_exhaustive(rows in rows_strategy()) {
        let grouping = GroupBy::field("name", row_accessor).order(["a", "b"]);
        let groups = group_by(&rows, &grouping);
        prop_assert_eq!(groups.total(), rows.len());

        let labels = groups.labels();
        let mut unique = labels.clone();
        unique.sort_unstable();
        unique.dedup();
        prop_assert_eq!(unique.len(), labels.len());
    }

    /// With grouping, the limit applies to each group.
    #[test]
    fn grouped_limit_is_per_group(rows in rows_strategy(), limit in 0usize..5) {
        let grouping = GroupBy::field("email", row_accessor);
        let groups = Query::new().sort_asc("score").limit(limit).group(&rows, row_accessor, &grouping);
        for group in &groups {
            prop_assert!(group.items.len() <= limit);
        }
    }

    /// A predicate on a missing field with `exists` removes exactly the rows without it.
    #[test]
    fn exists_partitions_rows(rows in rows_strategy()) {
        let present = Query::new().exists("score").count(&rows, row_accessor);
        let absent = Query::new().predicate("score", Op::DoesNotExist, ()).count(&rows, row_accessor);
        prop_assert_eq!(present, rows.iter().filter(|r| r.score.is_some()).count());
        prop_assert_eq!(present + absent, rows.len());
    }
}
