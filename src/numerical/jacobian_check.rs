//! comparison of a finite-difference jacobian with a known analytic one
use crate::numerical::numerical_jacobian::{FdScalar, InvalidShapeError};
use ndarray::{Array1, Array2, ArrayBase, Data, Ix1, Ix2, Zip};
use std::fmt;

/// sum of absolute elementwise differences between two matrices of the same shape
pub fn abs_error_sum<A, S1, S2>(
    analytic: &ArrayBase<S1, Ix2>,
    numerical: &ArrayBase<S2, Ix2>,
) -> Result<A, InvalidShapeError>
where
    A: FdScalar,
    S1: Data<Elem = A>,
    S2: Data<Elem = A>,
{
    if analytic.dim() != numerical.dim() {
        return Err(InvalidShapeError::ShapeMismatch {
            expected: analytic.dim(),
            found: numerical.dim(),
        });
    }
    Ok(Zip::from(analytic)
        .and(numerical)
        .fold(A::zero(), |acc, &a, &b| acc + (a - b).abs()))
}

/// Jacobian of x -> A·x in (n, m) orientation, i.e. Aᵗ
pub fn linear_map_jacobian<A, S>(a: &ArrayBase<S, Ix2>) -> Array2<A>
where
    A: FdScalar,
    S: Data<Elem = A>,
{
    a.t().to_owned()
}

/// Jacobian of the elementwise sine: diag(cos(x))
pub fn sine_jacobian<A, S>(x: &ArrayBase<S, Ix1>) -> Array2<A>
where
    A: FdScalar,
    S: Data<Elem = A>,
{
    let cos: Array1<A> = x.mapv(|xi| xi.cos());
    Array2::from_diag(&cos)
}

/// analytic and numerical jacobians of one test function together with the aggregate error
#[derive(Debug, Clone)]
pub struct JacobianReport<A> {
    pub name: String,
    pub analytic: Array2<A>,
    pub numerical: Array2<A>,
    pub error: A,
}

impl<A: FdScalar> JacobianReport<A> {
    pub fn new(
        name: &str,
        analytic: Array2<A>,
        numerical: Array2<A>,
    ) -> Result<Self, InvalidShapeError> {
        let error = abs_error_sum(&analytic, &numerical)?;
        Ok(JacobianReport {
            name: name.to_string(),
            analytic,
            numerical,
            error,
        })
    }

    pub fn passes(&self, tolerance: A) -> bool {
        self.error < tolerance
    }
}

impl<A: FdScalar + fmt::Display> fmt::Display for JacobianReport<A> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.name)?;
        writeln!(f, "{}", self.analytic)?;
        writeln!(f, "{}", self.numerical)?;
        write!(f, "{}", self.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use ndarray::array;

    #[test]
    fn test_abs_error_sum() {
        let a = array![[1.0, 2.0], [3.0, 4.0]];
        let b = array![[1.5, 2.0], [2.0, 4.25]];
        assert_relative_eq!(abs_error_sum(&a, &b).unwrap(), 1.75);
        assert_eq!(abs_error_sum(&a, &a).unwrap(), 0.0);
    }

    #[test]
    fn test_abs_error_sum_shape_mismatch() {
        let a = array![[1.0, 2.0], [3.0, 4.0]];
        let b = array![[1.0, 2.0]];
        assert_eq!(
            abs_error_sum(&a, &b).unwrap_err(),
            InvalidShapeError::ShapeMismatch {
                expected: (2, 2),
                found: (1, 2)
            }
        );
    }

    #[test]
    fn test_analytic_jacobians() {
        let a = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
        assert_eq!(linear_map_jacobian(&a), array![[1.0, 4.0], [2.0, 5.0], [3.0, 6.0]]);

        let x = array![0.0, std::f64::consts::PI];
        let jac = sine_jacobian(&x);
        assert_abs_diff_eq!(jac, array![[1.0, 0.0], [0.0, -1.0]], epsilon = 1e-15);
    }

    #[test]
    fn test_report() {
        let report = JacobianReport::new(
            "identity",
            Array2::<f64>::eye(2),
            array![[1.0, 0.001], [0.0, 1.0]],
        )
        .unwrap();
        assert!(report.passes(1e-2));
        assert!(!report.passes(1e-4));
        let printed = report.to_string();
        assert!(printed.starts_with("identity\n"));
        assert_eq!(printed.lines().last(), Some("0.001"));
    }
}
