use rand::Rng;

/// Draws `count` distinct indices from `0..pool_size`, none of them in `exclude`.
///
/// Rejection sampling; the caller guarantees that enough indices remain
/// after exclusion (see [`Strategy::min_population`](crate::Strategy::min_population)).
pub(crate) fn distinct_indices<R: Rng + ?Sized>(
    exclude: &[usize],
    count: usize,
    pool_size: usize,
    rng: &mut R,
) -> Vec<usize> {
    debug_assert!(
        count + (0..pool_size).filter(|k| exclude.contains(k)).count() <= pool_size,
        "not enough individuals to draw {count} distinct indices"
    );
    let mut out = Vec::with_capacity(count);
    while out.len() < count {
        let idx = rng.random_range(0..pool_size);
        if exclude.contains(&idx) || out.contains(&idx) {
            continue;
        }
        out.push(idx);
    }
    out
}
