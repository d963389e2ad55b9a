use ndarray::{Array1, Zip};

/// Mirrors every out-of-box component back inside `[lower, upper]`.
///
/// Components are folded with period `2 (upper - lower)`, so a value that
/// overshoots by more than the box width keeps bouncing instead of sticking
/// to a face. Degenerate intervals collapse to `lower`; non-finite values
/// land on the centre of the box.
pub fn reflect_into_bounds(x: &mut Array1<f64>, lower: &Array1<f64>, upper: &Array1<f64>) {
    Zip::from(x)
        .and(lower)
        .and(upper)
        .for_each(|v, &lo, &hi| *v = reflect(*v, lo, hi));
}

fn reflect(v: f64, lo: f64, hi: f64) -> f64 {
    let width = hi - lo;
    if width <= 0.0 {
        return lo;
    }
    if !v.is_finite() {
        return lo + 0.5 * width;
    }
    if (lo..=hi).contains(&v) {
        return v;
    }
    let period = 2.0 * width;
    let mut t = (v - lo).rem_euclid(period);
    if t > width {
        t = period - t;
    }
    lo + t
}
