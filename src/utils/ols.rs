//! Ordinary Least Squares regression on an explicit design matrix.
//!
//! Used by the unit-root regression, which needs coefficient standard errors
//! and the Gaussian log-likelihood as well as the estimates.

use crate::error::{ForecastError, Result};

/// Fitted OLS regression `y = X @ beta + e`.
#[derive(Debug, Clone)]
pub struct OlsFit {
    /// Estimated coefficients, one per design column.
    pub coefficients: Vec<f64>,
    /// Standard errors of the coefficients.
    pub std_errors: Vec<f64>,
    /// Residual sum of squares.
    pub ssr: f64,
    /// Number of observations.
    pub nobs: usize,
}

impl OlsFit {
    /// t-statistic of coefficient `j`.
    pub fn t_value(&self, j: usize) -> f64 {
        self.coefficients[j] / self.std_errors[j]
    }

    /// Gaussian log-likelihood evaluated at the MLE of the error variance.
    pub fn log_likelihood(&self) -> f64 {
        let n = self.nobs as f64;
        -n / 2.0 * ((2.0 * std::f64::consts::PI).ln() + (self.ssr / n).ln() + 1.0)
    }

    /// Akaike information criterion.
    pub fn aic(&self) -> f64 {
        -2.0 * self.log_likelihood() + 2.0 * self.coefficients.len() as f64
    }
}

/// Fit OLS given the design matrix as rows.
///
/// Solves the normal equations with a Cholesky factorization; a rank-deficient
/// design is reported as a computation error.
pub fn ols(design: &[Vec<f64>], y: &[f64]) -> Result<OlsFit> {
    let n = y.len();
    if design.len() != n {
        return Err(ForecastError::DimensionMismatch {
            expected: n,
            got: design.len(),
        });
    }
    let k = design.first().map_or(0, Vec::len);
    if k == 0 {
        return Err(ForecastError::InvalidParameter("design matrix has no columns".into()));
    }
    if n <= k {
        return Err(ForecastError::InsufficientData { needed: k + 1, got: n });
    }

    let mut xtx = vec![vec![0.0; k]; k];
    let mut xty = vec![0.0; k];
    for (row, &y_obs) in design.iter().zip(y) {
        if row.len() != k {
            return Err(ForecastError::DimensionMismatch {
                expected: k,
                got: row.len(),
            });
        }
        for i in 0..k {
            xty[i] += row[i] * y_obs;
            for j in 0..=i {
                xtx[i][j] += row[i] * row[j];
            }
        }
    }
    for i in 0..k {
        for j in 0..i {
            xtx[j][i] = xtx[i][j];
        }
    }

    let chol = cholesky(&xtx).ok_or_else(|| {
        ForecastError::ComputationError("OLS design matrix is singular".into())
    })?;
    let coefficients = chol.solve(&xty);

    let ssr: f64 = design
        .iter()
        .zip(y)
        .map(|(row, &y_obs)| {
            let fitted: f64 = row.iter().zip(&coefficients).map(|(x, b)| x * b).sum();
            (y_obs - fitted).powi(2)
        })
        .sum();

    let sigma2 = ssr / (n - k) as f64;
    let std_errors = (0..k)
        .map(|j| {
            let mut e = vec![0.0; k];
            e[j] = 1.0;
            (sigma2 * chol.solve(&e)[j]).sqrt()
        })
        .collect();

    Ok(OlsFit {
        coefficients,
        std_errors,
        ssr,
        nobs: n,
    })
}

/// Lower-triangular Cholesky factor `L` with `A = L @ L'`.
struct Cholesky {
    l: Vec<Vec<f64>>,
}

impl Cholesky {
    /// Solve `A @ x = b` by forward then backward substitution.
    fn solve(&self, b: &[f64]) -> Vec<f64> {
        let l = &self.l;
        let n = b.len();

        let mut y = vec![0.0; n];
        for i in 0..n {
            let mut sum = b[i];
            for j in 0..i {
                sum -= l[i][j] * y[j];
            }
            y[i] = sum / l[i][i];
        }

        let mut x = vec![0.0; n];
        for i in (0..n).rev() {
            let mut sum = y[i];
            for j in (i + 1)..n {
                sum -= l[j][i] * x[j];
            }
            x[i] = sum / l[i][i];
        }
        x
    }
}

/// Factorize a symmetric positive definite matrix.
///
/// Returns `None` when a pivot is not positive relative to its diagonal entry.
fn cholesky(a: &[Vec<f64>]) -> Option<Cholesky> {
    let n = a.len();
    let mut l = vec![vec![0.0; n]; n];

    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[i][j];
            for k in 0..j {
                sum -= l[i][k] * l[j][k];
            }

            if i == j {
                if !(sum > 1e-10 * a[i][i].abs().max(f64::MIN_POSITIVE)) {
                    return None;
                }
                l[i][j] = sum.sqrt();
            } else {
                l[i][j] = sum / l[j][j];
            }
        }
    }

    Some(Cholesky { l })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn with_intercept(x: &[f64]) -> Vec<Vec<f64>> {
        x.iter().map(|&v| vec![1.0, v]).collect()
    }

    #[test]
    fn exact_line_recovered() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y: Vec<f64> = x.iter().map(|v| 2.0 + 3.0 * v).collect();
        let fit = ols(&with_intercept(&x), &y).unwrap();

        assert_relative_eq!(fit.coefficients[0], 2.0, epsilon = 1e-9);
        assert_relative_eq!(fit.coefficients[1], 3.0, epsilon = 1e-9);
        assert!(fit.ssr < 1e-18);
    }

    #[test]
    fn standard_errors_match_closed_form() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [2.1, 3.9, 6.2, 7.8, 10.1];
        let fit = ols(&with_intercept(&x), &y).unwrap();

        // Simple regression: se(b1) = sqrt(s2 / Sxx) with Sxx = 10
        let s2 = fit.ssr / 3.0;
        assert_relative_eq!(fit.std_errors[1], (s2 / 10.0).sqrt(), epsilon = 1e-10);
        assert_relative_eq!(fit.coefficients[1], 1.99, epsilon = 1e-10);
    }

    #[test]
    fn collinear_design_is_rejected() {
        let design: Vec<Vec<f64>> = (0..6).map(|_| vec![1.0, 4.0]).collect();
        let y = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        assert!(matches!(
            ols(&design, &y),
            Err(ForecastError::ComputationError(_))
        ));
    }

    #[test]
    fn too_few_observations() {
        let design = vec![vec![1.0, 1.0], vec![1.0, 2.0]];
        assert!(matches!(
            ols(&design, &[1.0, 2.0]),
            Err(ForecastError::InsufficientData { .. })
        ));
    }

    #[test]
    fn aic_penalizes_parameters() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let y = [1.2, 1.9, 3.1, 4.2, 4.8, 6.1];
        let fit = ols(&with_intercept(&x), &y).unwrap();
        assert_relative_eq!(fit.aic(), -2.0 * fit.log_likelihood() + 4.0);
    }
}
