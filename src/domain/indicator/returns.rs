//! Period-over-period changes of a value series.

/// v[t] - v[t-1]; undefined at t = 0.
pub fn differences(values: &[f64]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    if !values.is_empty() {
        out.push(None);
    }
    out.extend(values.windows(2).map(|w| Some(w[1] - w[0])));
    out
}

/// ln(v[t] / v[t-1]); undefined at t = 0.
pub fn log_returns(values: &[f64]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    if !values.is_empty() {
        out.push(None);
    }
    out.extend(values.windows(2).map(|w| Some((w[1] / w[0]).ln())));
    out
}
