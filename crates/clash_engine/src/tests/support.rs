//! Shared fixtures for scenario tests.

use crate::config::ClashConvention;
use crate::parser::parse;
use crate::results::ClashResultSequence;
use crate::types::SetOrigin;

/// Generates `count` labelled records inside a cube of edge `extent`.
pub fn random_set(rng: &fastrand::Rng, count: usize, extent: f64, max_radius: f64, prefix: &str) -> String {
    let mut text = String::with_capacity(count * 48);
    for i in 0..count {
        let x = rng.f64() * extent;
        let y = rng.f64() * extent;
        let z = rng.f64() * extent;
        let r = rng.f64() * max_radius;
        text.push_str(&format!("{x} {y} {z} {r} {prefix}{i}\n"));
    }
    text
}

/// `(a index, b index, dist bits)` in result order.
pub fn keys(results: &ClashResultSequence) -> Vec<(usize, usize, u64)> {
    results
        .iter()
        .map(|r| (r.a.index, r.b.index, r.dist.to_bits()))
        .collect()
}

/// Exhaustive pairwise scan in result order.
pub fn brute_force(
    set_a: &str,
    set_b: &str,
    threshold: f64,
    convention: ClashConvention,
) -> Vec<(usize, usize, u64)> {
    let a = parse(set_a, SetOrigin::A).expect("set A should parse");
    let b = parse(set_b, SetOrigin::B).expect("set B should parse");

    let mut found = Vec::new();
    for ea in &a {
        for eb in &b {
            let dist = ea.position.distance(eb.position);
            if convention.is_clash(dist, threshold, ea.radius, eb.radius) {
                found.push((ea.id.index, eb.id.index, dist));
            }
        }
    }
    found.sort_by(|x, y| x.2.total_cmp(&y.2).then(x.0.cmp(&y.0)).then(x.1.cmp(&y.1)));
    found.into_iter().map(|(a, b, d)| (a, b, d.to_bits())).collect()
}
