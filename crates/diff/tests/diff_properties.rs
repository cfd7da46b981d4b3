//! Property tests for the diff engine
//!
//! - apply(old, diff(old, new)) reconstructs new
//! - diff(x, x) is empty
//! - chunked and windowed diffs reconstruct the same document as a plain diff
//! - positional array mode also reconstructs new

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{json, Value};
use vellum_core::{JsonValue, PathSegment};
use vellum_diff::{values_equal, DiffConfig, DiffEngine};

fn json_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        (-20i64..20).prop_map(|n| json!(n)),
        "[a-c]{0,3}".prop_map(Value::String),
    ];
    leaf.prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::btree_map("[a-e]", inner, 0..5)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

fn assert_reconstructs(engine: &DiffEngine, old: &Value, new: &Value) -> Result<(), TestCaseError> {
    let old = JsonValue::from_value(old.clone());
    let new = JsonValue::from_value(new.clone());
    let delta = engine.calculate_diff(&old, &new);
    let rebuilt = engine
        .apply_diff(&old, &delta)
        .map_err(|e| TestCaseError::fail(format!("apply failed: {}", e)))?;
    prop_assert!(
        values_equal(&rebuilt, &new, engine.config().precision),
        "rebuilt {} expected {}",
        rebuilt,
        new
    );
    Ok(())
}

fn chunked_engine() -> DiffEngine {
    DiffEngine::new(DiffConfig {
        memory_threshold: 0,
        chunk_size: 2,
        max_lcs_cells: 9,
        ..DiffConfig::default()
    })
}

proptest! {
    #[test]
    fn diff_then_apply_reconstructs(old in json_strategy(), new in json_strategy()) {
        assert_reconstructs(&DiffEngine::default(), &old, &new)?;
    }

    #[test]
    fn diff_of_identical_documents_is_empty(doc in json_strategy()) {
        let v = JsonValue::from_value(doc);
        let delta = DiffEngine::default().calculate_diff(&v, &v);
        prop_assert!(delta.is_empty());
        prop_assert_eq!(delta.change_complexity, 0.0);
    }

    #[test]
    fn chunked_diff_reconstructs(old in json_strategy(), new in json_strategy()) {
        assert_reconstructs(&chunked_engine(), &old, &new)?;
    }

    #[test]
    fn positional_diff_reconstructs(old in json_strategy(), new in json_strategy()) {
        let engine = DiffEngine::new(DiffConfig { use_lcs: false, ..DiffConfig::default() });
        assert_reconstructs(&engine, &old, &new)?;
    }

    #[test]
    fn counters_match_operations(old in json_strategy(), new in json_strategy()) {
        let delta = DiffEngine::default()
            .calculate_diff(&JsonValue::from_value(old), &JsonValue::from_value(new));
        prop_assert_eq!(delta.total_operations, delta.operations.len());
        prop_assert_eq!(
            delta.added_count + delta.removed_count + delta.modified_count,
            delta.total_operations
        );
        prop_assert!((0.0..=1.0).contains(&delta.change_complexity));
    }
}

#[test]
fn scenario_object_edit() {
    let engine = DiffEngine::default();
    let old = JsonValue::from_value(json!({"a": 1, "b": 2}));
    let new = JsonValue::from_value(json!({"a": 1, "b": 3, "c": 4}));
    let delta = engine.calculate_diff(&old, &new);
    assert_eq!(delta.total_operations, 2);
    assert_eq!(delta.modified_count, 1);
    assert_eq!(delta.added_count, 1);
    assert!((delta.change_complexity - 0.5).abs() < 1e-9);
    let rendered: Vec<String> = delta.operations.iter().map(|op| op.to_string()).collect();
    assert_eq!(rendered, vec!["REPLACE /b", "ADD /c"]);
}

#[test]
fn scenario_array_edit() {
    let engine = DiffEngine::default();
    let old = JsonValue::from_value(json!([1, 2, 3]));
    let new = JsonValue::from_value(json!([1, 3, 4]));
    let delta = engine.calculate_diff(&old, &new);
    assert_eq!(delta.removed_count, 1);
    assert_eq!(delta.added_count, 1);
    assert_eq!(delta.operations[0].path.segments(), &[PathSegment::Index(1)]);
    assert_eq!(*engine.apply_diff(&old, &delta).unwrap(), json!([1, 3, 4]));
}

#[test]
fn large_array_chunked_matches_plain() {
    let mut rng = StdRng::seed_from_u64(7);
    let old: Vec<Value> = (0..3000).map(|i| json!({"id": i, "v": rng.gen_range(0..10)})).collect();
    let mut new = old.clone();
    for _ in 0..200 {
        let idx = rng.gen_range(0..new.len());
        match rng.gen_range(0..3) {
            0 => {
                new.remove(idx);
            }
            1 => new.insert(idx, json!({"id": -1, "v": rng.gen_range(0..10)})),
            _ => new[idx] = json!({"id": idx, "v": 99}),
        }
    }
    let old = JsonValue::from_value(Value::Array(old));
    let new = JsonValue::from_value(Value::Array(new));

    let plain = DiffEngine::default();
    let chunked = DiffEngine::new(DiffConfig {
        memory_threshold: 1024,
        chunk_size: 250,
        ..DiffConfig::default()
    });
    for engine in [&plain, &chunked] {
        let delta = engine.calculate_diff(&old, &new);
        let rebuilt = engine.apply_diff(&old, &delta).unwrap();
        assert_eq!(rebuilt, new);
    }
}

#[test]
fn float_noise_below_precision_is_ignored() {
    let engine = DiffEngine::default();
    let old = JsonValue::from_value(json!({"price": 10.00001, "qty": 3}));
    let new = JsonValue::from_value(json!({"price": 10.00004, "qty": 3}));
    assert!(engine.calculate_diff(&old, &new).is_empty());
}
