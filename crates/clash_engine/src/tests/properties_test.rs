//! Contract properties of `clash_detection`.

use super::support::{keys, random_set};
use crate::{clash_detection, clash_detection_with_config, ClashConfig, ClashConvention};
use std::collections::{BTreeMap, HashSet};

fn labelled_pairs(results: &crate::ClashResultSequence, swapped: bool) -> BTreeMap<(String, String), u64> {
    results
        .iter()
        .map(|r| {
            let (a, b) = (r.a.to_string(), r.b.to_string());
            let key = if swapped { (b, a) } else { (a, b) };
            (key, r.dist.to_bits())
        })
        .collect()
}

#[test]
fn role_swap_reports_same_pairs_and_distances() {
    let rng = fastrand::Rng::with_seed(7);
    let set_a = random_set(&rng, 250, 20.0, 0.8, "a");
    let set_b = random_set(&rng, 400, 20.0, 0.8, "b");

    for threshold in [-0.2, 0.0, 0.5] {
        let forward = clash_detection(&set_a, &set_b, threshold).expect("forward run");
        let backward = clash_detection(&set_b, &set_a, threshold).expect("backward run");

        assert!(!forward.is_empty(), "fixture should produce clashes at t={threshold}");
        assert_eq!(forward.len(), backward.len());
        assert_eq!(labelled_pairs(&forward, false), labelled_pairs(&backward, true));
    }
}

#[test]
fn raising_threshold_never_drops_a_pair() {
    let rng = fastrand::Rng::with_seed(11);
    let set_a = random_set(&rng, 300, 15.0, 0.5, "a");
    let set_b = random_set(&rng, 300, 15.0, 0.5, "b");

    for convention in [ClashConvention::SurfaceToSurface, ClashConvention::CenterToCenter] {
        let config = ClashConfig::with_convention(convention);
        let mut previous: Option<HashSet<(usize, usize)>> = None;

        for threshold in [-0.5, -0.1, 0.0, 0.1, 0.75, 2.0] {
            let results = clash_detection_with_config(&set_a, &set_b, threshold, &config).expect("run succeeds");
            let pairs: HashSet<(usize, usize)> = results.iter().map(|r| (r.a.index, r.b.index)).collect();
            if let Some(prev) = &previous {
                assert!(
                    prev.is_subset(&pairs),
                    "{convention:?}: pairs lost when raising threshold to {threshold}"
                );
            }
            previous = Some(pairs);
        }
    }
}

#[test]
fn empty_set_yields_empty_results() {
    let other = "0 0 0 5\n1 1 1 5 big\n";
    for threshold in [-10.0, 0.0, 1e6] {
        assert!(clash_detection("", other, threshold).expect("empty A").is_empty());
        assert!(clash_detection(other, "", threshold).expect("empty B").is_empty());
        assert!(clash_detection("# nothing here\n\n", other, threshold).expect("comment-only A").is_empty());
        assert!(clash_detection("", "", threshold).expect("both empty").is_empty());
    }
}

#[test]
fn repeated_runs_are_identical() {
    let rng = fastrand::Rng::with_seed(3);
    let set_a = random_set(&rng, 500, 10.0, 0.3, "a");
    let set_b = random_set(&rng, 500, 10.0, 0.3, "b");

    let first = clash_detection(&set_a, &set_b, 0.1).expect("first run");
    let second = clash_detection(&set_a, &set_b, 0.1).expect("second run");
    assert_eq!(first, second);
    assert_eq!(keys(&first), keys(&second));

    let first_json = serde_json::to_string(&first).expect("serializes");
    let second_json = serde_json::to_string(&second).expect("serializes");
    assert_eq!(first_json, second_json);
}

#[test]
fn results_are_sorted_by_distance_then_ids() {
    let rng = fastrand::Rng::with_seed(5);
    let set_a = random_set(&rng, 200, 8.0, 0.5, "a");
    let set_b = random_set(&rng, 200, 8.0, 0.5, "b");

    let results = clash_detection(&set_a, &set_b, 0.25).expect("run succeeds");
    assert!(results.len() > 1);
    for window in results.as_slice().windows(2) {
        let (x, y) = (&window[0], &window[1]);
        let ordered = x.dist < y.dist
            || (x.dist == y.dist && (x.a.index, x.b.index) < (y.a.index, y.b.index));
        assert!(ordered, "{x} should precede {y}");
    }
}
