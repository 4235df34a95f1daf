/// Clamps a raw `elapsed / duration` ratio into `[0, 1]`.
///
/// A non-positive duration counts as already finished.
pub fn progress(elapsed_s: f64, duration_s: f64) -> f64 {
    if duration_s <= 0.0 {
        return 1.0;
    }
    (elapsed_s / duration_s).clamp(0.0, 1.0)
}

/// Cubic ease-out: `1 - (1 - t)^3`. Fast start, slow finish.
pub fn ease_out_cubic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    let inv = 1.0 - t;
    1.0 - inv * inv * inv
}

#[cfg(test)]
mod tests {
    use super::{ease_out_cubic, progress};

    #[test]
    fn endpoints_are_exact() {
        assert_eq!(ease_out_cubic(0.0), 0.0);
        assert_eq!(ease_out_cubic(1.0), 1.0);
    }

    #[test]
    fn is_monotonic() {
        let mut prev = ease_out_cubic(0.0);
        for i in 1..=100 {
            let v = ease_out_cubic(i as f64 / 100.0);
            assert!(v >= prev, "ease_out_cubic decreased at step {i}");
            prev = v;
        }
    }

    #[test]
    fn progress_is_clamped() {
        assert_eq!(progress(-1.0, 2.0), 0.0);
        assert_eq!(progress(1.0, 2.0), 0.5);
        assert_eq!(progress(5.0, 2.0), 1.0);
        assert_eq!(progress(0.0, 0.0), 1.0);
    }
}
