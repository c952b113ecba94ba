//! Ordinary least squares via the normal equations.

use crate::domain::error::StratbenchError;
use nalgebra::{DMatrix, DVector};

#[derive(Debug, Clone)]
pub struct OlsFit {
    pub params: DVector<f64>,
    /// Standard errors of `params`; NaN when the fit has no residual degrees of freedom.
    pub std_errors: DVector<f64>,
    pub residuals: DVector<f64>,
    pub nobs: usize,
}

impl OlsFit {
    pub fn t_value(&self, index: usize) -> f64 {
        self.params[index] / self.std_errors[index]
    }
}

/// Fit y = X·b. `x` is nobs × k; include a column of ones for an intercept.
pub fn ols(x: &DMatrix<f64>, y: &DVector<f64>) -> Result<OlsFit, StratbenchError> {
    let (nobs, k) = x.shape();
    if nobs != y.len() {
        return Err(StratbenchError::numeric(format!(
            "design has {} rows but response has {}",
            nobs,
            y.len()
        )));
    }
    if nobs < k || k == 0 {
        return Err(StratbenchError::numeric(format!(
            "{} observations cannot identify {} parameters",
            nobs, k
        )));
    }

    let xtx = x.transpose() * x;
    let xty = x.transpose() * y;
    let xtx_inv = xtx
        .try_inverse()
        .ok_or_else(|| StratbenchError::numeric("singular design matrix"))?;

    let params = &xtx_inv * xty;
    let fitted = x * &params;
    let residuals = y - fitted;

    let dof = nobs - k;
    let std_errors = if dof > 0 {
        let sse = residuals.iter().map(|r| r * r).sum::<f64>();
        let sigma2 = sse / dof as f64;
        DVector::from_fn(k, |i, _| (sigma2 * xtx_inv[(i, i)]).sqrt())
    } else {
        DVector::from_element(k, f64::NAN)
    };

    if params.iter().any(|p| !p.is_finite()) {
        return Err(StratbenchError::numeric("non-finite regression coefficient"));
    }

    Ok(OlsFit {
        params,
        std_errors,
        residuals,
        nobs,
    })
}
