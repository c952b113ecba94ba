//! Trailing-window statistics.
//!
//! Each output has the same length as its input. The first (window - 1)
//! entries are `None`, as is any window containing a non-finite value.

fn window_at(values: &[f64], i: usize, window: usize) -> Option<&[f64]> {
    if window == 0 || i + 1 < window {
        return None;
    }
    let slice = &values[i + 1 - window..=i];
    if slice.iter().all(|v| v.is_finite()) {
        Some(slice)
    } else {
        None
    }
}

/// Simple moving average over `window` values.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| window_at(values, i, window).map(|w| w.iter().sum::<f64>() / window as f64))
        .collect()
}

/// Sample standard deviation (divides by n - 1) over `window` values.
///
/// A window of one has no sample deviation and yields `None` throughout.
pub fn rolling_stddev(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window < 2 {
        return vec![None; values.len()];
    }
    (0..values.len())
        .map(|i| {
            window_at(values, i, window).map(|w| {
                let mean = w.iter().sum::<f64>() / window as f64;
                let variance = w
                    .iter()
                    .map(|v| {
                        let diff = v - mean;
                        diff * diff
                    })
                    .sum::<f64>()
                    / (window - 1) as f64;
                variance.sqrt()
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn mean_warmup() {
        let out = rolling_mean(&[10.0, 20.0, 30.0, 40.0, 50.0], 3);
        assert!(out[0].is_none());
        assert!(out[1].is_none());
        assert_relative_eq!(out[2].unwrap(), 20.0);
        assert_relative_eq!(out[3].unwrap(), 30.0);
        assert_relative_eq!(out[4].unwrap(), 40.0);
    }

    #[test]
    fn stddev_is_sample_estimator() {
        let out = rolling_stddev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0], 8);
        // population std is 2.0; sample std = sqrt(32 / 7)
        assert_relative_eq!(out[7].unwrap(), (32.0_f64 / 7.0).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn stddev_constant_values() {
        let out = rolling_stddev(&[100.0, 100.0, 100.0, 100.0], 3);
        assert!(out[1].is_none());
        assert_relative_eq!(out[2].unwrap(), 0.0);
    }

    #[test]
    fn stddev_window_of_one_is_undefined() {
        let out = rolling_stddev(&[1.0, 2.0], 1);
        assert!(out.iter().all(Option::is_none));
    }

    #[test]
    fn non_finite_value_poisons_its_windows() {
        let out = rolling_mean(&[1.0, f64::NAN, 3.0, 4.0, 5.0], 2);
        assert!(out[1].is_none());
        assert!(out[2].is_none());
        assert_relative_eq!(out[3].unwrap(), 3.5);
    }

    #[test]
    fn zero_window_yields_nothing() {
        let out = rolling_mean(&[1.0, 2.0], 0);
        assert!(out.iter().all(Option::is_none));
    }
}
