use std::collections::BTreeSet;

use proptest::prelude::*;
use sweep_core::{Combination, ParamValue, ParameterSpec, Scalar};
use sweep_exp::expand;

fn example_spec() -> ParameterSpec {
    ParameterSpec::try_from_entries([
        ("map", ParamValue::from("empty-8-8")),
        ("cache", ParamValue::list(["a", "b"])),
        ("ngoals", ParamValue::list([5i64])),
        ("goals_k", ParamValue::from(2i64)),
        ("goals_m", ParamValue::from(1i64)),
        ("nagents", ParamValue::list([4i64, 8])),
    ])
    .expect("spec")
}

#[test]
fn example_spec_yields_four_combinations() {
    let spec = example_spec();
    let combinations: Vec<Combination> = expand(&spec).expect("expand").collect();
    assert_eq!(combinations.len(), 4);

    let expected: Combination = [
        ("map", Scalar::from("empty-8-8")),
        ("cache", Scalar::from("a")),
        ("ngoals", Scalar::from(5i64)),
        ("goals_k", Scalar::from(2i64)),
        ("goals_m", Scalar::from(1i64)),
        ("nagents", Scalar::from(4i64)),
    ]
    .into_iter()
    .collect();
    assert_eq!(combinations[0], expected);

    let pairs: Vec<(String, String)> = combinations
        .iter()
        .map(|c| (c.get("cache").unwrap().to_string(), c.get("nagents").unwrap().to_string()))
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("a".to_string(), "4".to_string()),
            ("a".to_string(), "8".to_string()),
            ("b".to_string(), "4".to_string()),
            ("b".to_string(), "8".to_string()),
        ]
    );
}

#[test]
fn combinations_keep_declaration_order() {
    let spec = example_spec();
    let declared: Vec<&str> = spec.keys().collect();
    for combination in expand(&spec).expect("expand") {
        let keys: Vec<&str> = combination.keys().collect();
        assert_eq!(keys, declared);
    }
}

#[test]
fn all_scalar_spec_yields_one_combination() {
    let spec = ParameterSpec::try_from_entries([
        ("map", ParamValue::from("random-32-32-10")),
        ("seed", ParamValue::from(7i64)),
    ])
    .expect("spec");
    let combinations: Vec<_> = expand(&spec).expect("expand").collect();
    assert_eq!(combinations.len(), 1);
    assert_eq!(combinations[0].get("seed"), Some(&Scalar::Int(7)));
}

fn arb_scalar() -> impl Strategy<Value = Scalar> {
    prop_oneof![
        any::<bool>().prop_map(Scalar::Bool),
        (-50i64..50).prop_map(Scalar::Int),
        "[a-z]{1,4}".prop_map(Scalar::Str),
    ]
}

fn arb_value() -> impl Strategy<Value = ParamValue> {
    prop_oneof![
        arb_scalar().prop_map(ParamValue::Scalar),
        prop::collection::vec(arb_scalar(), 1..4).prop_map(ParamValue::List),
    ]
}

fn arb_spec() -> impl Strategy<Value = ParameterSpec> {
    prop::collection::vec(arb_value(), 1..5).prop_map(|values| {
        ParameterSpec::try_from_entries(
            values
                .into_iter()
                .enumerate()
                .map(|(idx, value)| (format!("p{idx}"), value)),
        )
        .expect("generated spec is well formed")
    })
}

proptest! {
    #[test]
    fn length_is_product_of_axis_sizes(spec in arb_spec()) {
        let expected: usize = spec.iter().map(|(_, value)| value.values().len()).product();
        let combinations: Vec<_> = expand(&spec).unwrap().collect();
        prop_assert_eq!(combinations.len(), expected);
        prop_assert_eq!(spec.combination_count().unwrap(), expected);
        for combination in &combinations {
            prop_assert_eq!(combination.len(), spec.len());
            prop_assert!(combination.keys().eq(spec.keys()));
        }
    }

    #[test]
    fn expansion_is_deterministic(spec in arb_spec()) {
        let first: Vec<_> = expand(&spec).unwrap().collect();
        let second: Vec<_> = expand(&spec).unwrap().collect();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn values_stay_within_their_axes(spec in arb_spec()) {
        let combinations: Vec<_> = expand(&spec).unwrap().collect();
        for (key, value) in spec.iter() {
            let seen: Vec<&Scalar> = combinations
                .iter()
                .map(|combination| combination.get(key).unwrap())
                .collect();
            match value {
                ParamValue::Scalar(scalar) => {
                    prop_assert!(seen.iter().all(|s| *s == scalar));
                }
                ParamValue::List(values) => {
                    prop_assert!(seen.iter().all(|s| values.contains(s)));
                    for candidate in values {
                        prop_assert!(seen.contains(&candidate));
                    }
                }
            }
        }
    }

    #[test]
    fn distinct_axes_yield_distinct_combinations(sizes in prop::collection::vec(1usize..4, 1..5)) {
        let spec = ParameterSpec::try_from_entries(sizes.iter().enumerate().map(|(idx, size)| {
            (format!("p{idx}"), ParamValue::list(0..*size as i64))
        }))
        .unwrap();
        let unique: BTreeSet<String> = expand(&spec)
            .unwrap()
            .map(|combination| {
                combination
                    .iter()
                    .map(|(_, value)| value.to_string())
                    .collect::<Vec<_>>()
                    .join(",")
            })
            .collect();
        prop_assert_eq!(unique.len(), sizes.iter().product::<usize>());
    }
}
