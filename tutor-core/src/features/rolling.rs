//! Column helpers over `f64` series.
//!
//! Every helper returns a vector of the same length as its input. Positions
//! without enough history are `NaN`, and a window containing a `NaN` yields
//! `NaN`.

/// `values[i] / values[i - periods] - 1`.
pub fn pct_change(values: &[f64], periods: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    for i in periods..values.len() {
        out[i] = values[i] / values[i - periods] - 1.0;
    }
    out
}

/// Shift by `periods` positions. Positive values look back, negative values look forward.
pub fn shift(values: &[f64], periods: isize) -> Vec<f64> {
    let n = values.len() as isize;
    (0..n)
        .map(|i| {
            let src = i - periods;
            if (0..n).contains(&src) {
                values[src as usize]
            } else {
                f64::NAN
            }
        })
        .collect()
}

/// Difference with the previous element.
pub fn diff(values: &[f64]) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    for i in 1..values.len() {
        out[i] = values[i] - values[i - 1];
    }
    out
}

fn rolling(values: &[f64], window: usize, stat: impl Fn(&[f64]) -> f64) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if window == 0 || values.len() < window {
        return out;
    }
    for end in (window - 1)..values.len() {
        let slice = &values[end + 1 - window..=end];
        if slice.iter().all(|v| !v.is_nan()) {
            out[end] = stat(slice);
        }
    }
    out
}

pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (ddof = 1). `NaN` for fewer than two values.
pub fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    (ss / (values.len() - 1) as f64).sqrt()
}

pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    rolling(values, window, mean)
}

pub fn rolling_std(values: &[f64], window: usize) -> Vec<f64> {
    rolling(values, window, sample_std)
}

/// Linear-interpolated quantile over the non-`NaN` values.
///
/// Returns `None` when there is no value to rank.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn pct_change_leading_nan() {
        let out = pct_change(&[100.0, 110.0, 121.0], 1);
        assert!(out[0].is_nan());
        assert!(approx(out[1], 0.1));
        assert!(approx(out[2], 0.1));
    }

    #[test]
    fn shift_both_directions() {
        let v = [1.0, 2.0, 3.0];
        let back = shift(&v, 1);
        assert!(back[0].is_nan());
        assert_eq!(&back[1..], &[1.0, 2.0]);
        let fwd = shift(&v, -1);
        assert_eq!(&fwd[..2], &[2.0, 3.0]);
        assert!(fwd[2].is_nan());
    }

    #[test]
    fn rolling_mean_and_std() {
        let v = [1.0, 2.0, 3.0, 4.0];
        let m = rolling_mean(&v, 2);
        assert!(m[0].is_nan());
        assert_eq!(&m[1..], &[1.5, 2.5, 3.5]);

        let s = rolling_std(&v, 3);
        assert!(s[1].is_nan());
        assert!(approx(s[2], 1.0));
        assert!(approx(s[3], 1.0));
    }

    #[test]
    fn rolling_window_with_nan_is_nan() {
        let v = [f64::NAN, 1.0, 2.0, 3.0];
        let m = rolling_mean(&v, 2);
        assert!(m[1].is_nan());
        assert_eq!(m[2], 1.5);
    }

    #[test]
    fn rolling_std_of_constant_is_zero() {
        let s = rolling_std(&[5.0; 10], 4);
        assert!(s[3..].iter().all(|v| *v == 0.0));
    }

    #[test]
    fn quantile_interpolates() {
        let v = [4.0, 1.0, f64::NAN, 3.0, 2.0];
        assert_eq!(quantile(&v, 0.0), Some(1.0));
        assert_eq!(quantile(&v, 1.0), Some(4.0));
        assert!(approx(quantile(&v, 0.7).unwrap(), 3.1));
        assert_eq!(quantile(&[f64::NAN], 0.5), None);
    }
}
