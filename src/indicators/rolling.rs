// =============================================================================
// Rolling-window primitives
// =============================================================================
//
// Building blocks shared by every windowed study. All functions return a
// vector of exactly `values.len()` elements; positions without a full window
// of finite samples are `None`.
//
//   rolling_mean(x, n)[i] = mean(x[i-n+1..=i])
//   rolling_std(x, n)[i]  = sample std-dev (divisor n - 1) of the same window
//   diff(x, n)[i]         = x[i] - x[i-n]
//   shift(x, n)[i]        = x[i-n]
// =============================================================================

/// Rolling arithmetic mean over exactly `window` samples.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    rolling(values, window, |w| Some(w.iter().sum::<f64>() / w.len() as f64))
}

/// Rolling sample standard deviation over exactly `window` samples.
///
/// A window of one sample has no sample variance, so every point is `None`.
pub fn rolling_std(values: &[f64], window: usize) -> Vec<Option<f64>> {
    rolling(values, window, |w| {
        if w.len() < 2 {
            return None;
        }
        // A summed mean drifts off a constant like 0.1; keep flat windows at 0.
        if w.iter().all(|&x| x == w[0]) {
            return Some(0.0);
        }
        let n = w.len() as f64;
        let mean = w.iter().sum::<f64>() / n;
        let variance = w.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);
        Some(variance.sqrt())
    })
}

/// `values[i] - values[i - lag]`.
pub fn diff(values: &[f64], lag: usize) -> Vec<Option<f64>> {
    lagged(values, lag, |cur, prev| cur - prev)
}

/// `values[i - lag]`.
pub fn shift(values: &[f64], lag: usize) -> Vec<Option<f64>> {
    lagged(values, lag, |_, prev| prev)
}

/// Division that yields `None` for a missing operand, a zero divisor, or a
/// non-finite quotient.
pub fn checked_div(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    let (n, d) = (numerator?, denominator?);
    if d == 0.0 {
        return None;
    }
    Some(n / d).filter(|q| q.is_finite())
}

fn rolling<F>(values: &[f64], window: usize, stat: F) -> Vec<Option<f64>>
where
    F: Fn(&[f64]) -> Option<f64>,
{
    let mut out = vec![None; values.len()];
    if window == 0 || values.len() < window {
        return out;
    }
    for end in window..=values.len() {
        let w = &values[end - window..end];
        if w.iter().all(|x| x.is_finite()) {
            out[end - 1] = stat(w).filter(|v| v.is_finite());
        }
    }
    out
}

fn lagged<F>(values: &[f64], lag: usize, f: F) -> Vec<Option<f64>>
where
    F: Fn(f64, f64) -> f64,
{
    values
        .iter()
        .enumerate()
        .map(|(i, &cur)| {
            if i < lag {
                return None;
            }
            let prev = values[i - lag];
            if cur.is_finite() && prev.is_finite() {
                Some(f(cur, prev))
            } else {
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_pads_leading_points() {
        let out = rolling_mean(&[1.0, 2.0, 3.0, 4.0], 3);
        assert_eq!(out, vec![None, None, Some(2.0), Some(3.0)]);
    }

    #[test]
    fn mean_window_longer_than_input() {
        assert_eq!(rolling_mean(&[1.0, 2.0], 5), vec![None, None]);
    }

    #[test]
    fn zero_window_is_all_undefined() {
        assert_eq!(rolling_mean(&[1.0, 2.0], 0), vec![None, None]);
        assert_eq!(rolling_std(&[1.0, 2.0], 0), vec![None, None]);
    }

    #[test]
    fn std_is_sample_std() {
        // Sample std of [2, 4, 4, 4, 5, 5, 7, 9] = sqrt(32 / 7)
        let xs = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let out = rolling_std(&xs, 8);
        let expected = (32.0_f64 / 7.0).sqrt();
        assert!((out[7].unwrap() - expected).abs() < 1e-10);
        assert!(out[..7].iter().all(Option::is_none));
    }

    #[test]
    fn std_single_sample_window_is_undefined() {
        assert_eq!(rolling_std(&[1.0, 2.0], 1), vec![None, None]);
    }

    #[test]
    fn nan_poisons_only_windows_containing_it() {
        let out = rolling_mean(&[f64::NAN, 2.0, 4.0, 6.0], 2);
        assert_eq!(out, vec![None, None, Some(3.0), Some(5.0)]);
    }

    #[test]
    fn diff_and_shift() {
        let xs = [10.0, 11.0, 13.0, 16.0];
        assert_eq!(diff(&xs, 2), vec![None, None, Some(3.0), Some(5.0)]);
        assert_eq!(shift(&xs, 1), vec![None, Some(10.0), Some(11.0), Some(13.0)]);
        assert_eq!(diff(&xs, 0), vec![Some(0.0); 4]);
    }

    #[test]
    fn checked_div_guards_zero() {
        assert_eq!(checked_div(Some(1.0), Some(0.0)), None);
        assert_eq!(checked_div(Some(0.0), Some(0.0)), None);
        assert_eq!(checked_div(None, Some(2.0)), None);
        assert_eq!(checked_div(Some(1.0), Some(4.0)), Some(0.25));
    }

    #[test]
    fn std_of_constant_window_is_exact_zero() {
        for price in [0.1, 10.1, 33.3] {
            let out = rolling_std(&[price; 25], 20);
            assert!(out[..19].iter().all(Option::is_none));
            assert!(out[19..].iter().all(|s| *s == Some(0.0)), "price {price}");
        }
    }
}
