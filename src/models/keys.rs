//! Dotted key ordering
//!
//! Field keys such as `48.61.3` sort component by component, numerically.

use std::cmp::Ordering;

/// Compares two dotted keys numerically, component by component.
///
/// Missing or non-numeric components count as 0, so `4` and `4.0` compare
/// equal and `3.3` sorts before `4`.
pub fn compare_dotted(lhs: &str, rhs: &str) -> Ordering {
    let mut left = components(lhs);
    let mut right = components(rhs);

    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (l, r) => match l.unwrap_or(0).cmp(&r.unwrap_or(0)) {
                Ordering::Equal => continue,
                other => return other,
            },
        }
    }
}

fn components(key: &str) -> impl Iterator<Item = u64> + '_ {
    key.split('.')
        .filter(|part| !part.is_empty())
        .map(|part| part.trim().parse().unwrap_or(0))
}
