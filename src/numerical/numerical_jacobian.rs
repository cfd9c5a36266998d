//! Forward-difference estimate of the Jacobian of a vector function.
//!
//! The Jacobian is returned with shape (n, m): row `i` holds the partial derivatives
//! of all m outputs with respect to the i-th input. This is the transpose of the
//! usual (m, n) convention, so for f(x) = A·x the estimate approaches Aᵗ.
//!
//! # Example
//! ```
//! use ndarray::{Array1, ArrayView1, array};
//! use RustedJacobian::numerical::numerical_jacobian::numerical_jacobian;
//!
//! let a = array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]];
//! let x = Array1::<f64>::ones(2);
//! let jac = numerical_jacobian(|v: ArrayView1<f64>| a.dot(&v), &x).unwrap();
//! assert_eq!(jac.dim(), (2, 3));
//! assert!((jac[[1, 2]] - 6.0).abs() < 1e-6);
//! ```
use log::debug;
use nalgebra::{DMatrix, DVector, Scalar};
use ndarray::{Array, Array1, Array2, ArrayBase, ArrayView1, Axis, Data, Dimension, Ix1, Zip};
use num_traits::Float;
use std::fmt;

/// perturbation step applied to one coordinate at a time
pub const EPS: f64 = 1e-5;

/// Floating point types the estimator works with. The perturbation step is
/// taken at the precision of the type itself.
pub trait FdScalar: Float + fmt::Debug + 'static {
    fn perturbation() -> Self;
}

impl FdScalar for f32 {
    fn perturbation() -> Self {
        EPS as f32
    }
}

impl FdScalar for f64 {
    fn perturbation() -> Self {
        EPS
    }
}

/// Error types for shape validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidShapeError {
    /// the point of evaluation is not a vector
    InputNotVector { ndim: usize },
    /// the function returned something other than a vector
    OutputNotVector { ndim: usize },
    /// a perturbed evaluation returned a vector of another length than f(x)
    OutputLengthChanged { expected: usize, found: usize },
    /// two matrices that must be compared elementwise differ in shape
    ShapeMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },
}

impl fmt::Display for InvalidShapeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            InvalidShapeError::InputNotVector { ndim } => write!(
                f,
                "the vector x should be one dimensional, got {} dimensions",
                ndim
            ),
            InvalidShapeError::OutputNotVector { ndim } => write!(
                f,
                "the function should have vector value, got {} dimensions",
                ndim
            ),
            InvalidShapeError::OutputLengthChanged { expected, found } => write!(
                f,
                "the function returned {} components at a perturbed point, {} at x",
                found, expected
            ),
            InvalidShapeError::ShapeMismatch { expected, found } => write!(
                f,
                "shape mismatch: expected {:?}, found {:?}",
                expected, found
            ),
        }
    }
}

impl std::error::Error for InvalidShapeError {}

fn into_vector<A, D>(value: Array<A, D>) -> Result<Array1<A>, InvalidShapeError>
where
    D: Dimension,
{
    let ndim = value.ndim();
    value
        .into_dimensionality::<Ix1>()
        .map_err(|_| InvalidShapeError::OutputNotVector { ndim })
}

/// Estimate the Jacobian of a fallible function `f` at `x` by forward differences.
///
/// Any error returned by `f` is handed back to the caller untouched, so `E` is
/// the caller's own error type; it only has to absorb [`InvalidShapeError`].
/// `Box<dyn std::error::Error>` qualifies.
///
/// `f` is evaluated n+1 times. `x` itself is never modified, the perturbation
/// happens on a private copy that is restored after every coordinate.
pub fn estimate_jacobian<A, S, D, Do, F, E>(f: F, x: &ArrayBase<S, D>) -> Result<Array2<A>, E>
where
    A: FdScalar,
    S: Data<Elem = A>,
    D: Dimension,
    Do: Dimension,
    F: Fn(ArrayView1<A>) -> Result<Array<A, Do>, E>,
    E: From<InvalidShapeError>,
{
    let ndim = x.ndim();
    let x = x
        .view()
        .into_dimensionality::<Ix1>()
        .map_err(|_| InvalidShapeError::InputNotVector { ndim })?;
    let fx = into_vector(f(x.view())?)?;

    let n = x.len();
    let m = fx.len();
    debug!("estimating jacobian: {} inputs, {} outputs", n, m);

    let eps = A::perturbation();
    let mut xperturb = x.to_owned();
    let mut jac = Array2::<A>::zeros((n, m));
    for (i, mut row) in jac.axis_iter_mut(Axis(0)).enumerate() {
        xperturb[i] = x[i] + eps;
        let fxi = into_vector(f(xperturb.view())?)?;
        if fxi.len() != m {
            return Err(InvalidShapeError::OutputLengthChanged {
                expected: m,
                found: fxi.len(),
            }
            .into());
        }
        Zip::from(&mut row)
            .and(&fxi)
            .and(&fx)
            .for_each(|j, &fi, &f0| *j = (fi - f0) / eps);
        xperturb[i] = x[i];
    }
    Ok(jac)
}

/// [`estimate_jacobian`] for functions that cannot fail.
pub fn numerical_jacobian<A, S, D, Do, F>(
    f: F,
    x: &ArrayBase<S, D>,
) -> Result<Array2<A>, InvalidShapeError>
where
    A: FdScalar,
    S: Data<Elem = A>,
    D: Dimension,
    Do: Dimension,
    F: Fn(ArrayView1<A>) -> Array<A, Do>,
{
    estimate_jacobian(|v| Ok(f(v)), x)
}

/// The same forward-difference scheme for functions written over nalgebra vectors.
/// Returns a (n, m) matrix like [`estimate_jacobian`].
pub fn estimate_jacobian_dvector<T, F, E>(f: F, x: &DVector<T>) -> Result<DMatrix<T>, E>
where
    T: FdScalar + Scalar,
    F: Fn(&DVector<T>) -> Result<DVector<T>, E>,
    E: From<InvalidShapeError>,
{
    let fx = f(x)?;
    let n = x.len();
    let m = fx.len();
    debug!("estimating jacobian (nalgebra): {} inputs, {} outputs", n, m);

    let eps = T::perturbation();
    let mut xperturb = x.clone();
    let mut jac = DMatrix::<T>::zeros(n, m);
    for i in 0..n {
        xperturb[i] = x[i] + eps;
        let fxi = f(&xperturb)?;
        if fxi.len() != m {
            return Err(InvalidShapeError::OutputLengthChanged {
                expected: m,
                found: fxi.len(),
            }
            .into());
        }
        for j in 0..m {
            jac[(i, j)] = (fxi[j] - fx[j]) / eps;
        }
        xperturb[i] = x[i];
    }
    Ok(jac)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{Array0, array};

    #[test]
    fn test_perturbation_follows_precision() {
        assert_eq!(<f64 as FdScalar>::perturbation(), 1e-5);
        assert_eq!(<f32 as FdScalar>::perturbation(), 1e-5_f32);
    }

    #[test]
    fn test_error_messages() {
        let e = InvalidShapeError::InputNotVector { ndim: 2 };
        assert!(e.to_string().starts_with("the vector x should be one dimensional"));
        let e = InvalidShapeError::OutputNotVector { ndim: 0 };
        assert!(e.to_string().starts_with("the function should have vector value"));
    }

    #[test]
    fn test_into_vector() {
        let v = into_vector(array![1.0, 2.0].into_dyn()).unwrap();
        assert_eq!(v, array![1.0, 2.0]);
        let err = into_vector(Array0::from_elem((), 1.0)).unwrap_err();
        assert_eq!(err, InvalidShapeError::OutputNotVector { ndim: 0 });
    }

    #[test]
    fn test_dvector_linear() {
        let a = DMatrix::from_row_slice(2, 3, &[1.0, -2.0, 0.5, 3.0, 0.0, 4.0]);
        let x = DVector::from_vec(vec![0.3, -1.0, 2.0]);
        let jac = estimate_jacobian_dvector(
            |v: &DVector<f64>| Ok::<_, InvalidShapeError>(&a * v),
            &x,
        )
        .unwrap();
        assert_eq!(jac.shape(), (3, 2));
        assert_relative_eq!(jac, a.transpose(), epsilon = 1e-8);
    }

    #[test]
    fn test_dvector_function_error_propagates() {
        #[derive(Debug, PartialEq)]
        enum StepError {
            Shape(InvalidShapeError),
            Overflow(usize),
        }
        impl From<InvalidShapeError> for StepError {
            fn from(e: InvalidShapeError) -> Self {
                StepError::Shape(e)
            }
        }

        let x = DVector::from_vec(vec![1.0, 2.0, 3.0]);
        // fails on the second perturbed point only
        let res = estimate_jacobian_dvector(
            |v: &DVector<f64>| {
                if v[1] != 2.0 {
                    Err(StepError::Overflow(1))
                } else {
                    Ok(v.clone())
                }
            },
            &x,
        );
        assert_eq!(res.unwrap_err(), StepError::Overflow(1));

        let res: Result<DMatrix<f64>, StepError> =
            estimate_jacobian_dvector(|_v: &DVector<f64>| Err(StepError::Overflow(0)), &x);
        assert_eq!(res.unwrap_err(), StepError::Overflow(0));
        assert!(matches!(
            StepError::from(InvalidShapeError::OutputNotVector { ndim: 0 }),
            StepError::Shape(_)
        ));
    }

    #[test]
    fn test_dvector_output_length_changed() {
        let x = DVector::from_vec(vec![1.0, 2.0]);
        let res = estimate_jacobian_dvector(
            |v: &DVector<f64>| {
                if v[0] == 1.0 {
                    Ok::<_, InvalidShapeError>(DVector::from_element(2, v[0]))
                } else {
                    Ok(DVector::from_element(3, v[0]))
                }
            },
            &x,
        );
        assert_eq!(
            res.unwrap_err(),
            InvalidShapeError::OutputLengthChanged {
                expected: 2,
                found: 3
            }
        );
    }
}
