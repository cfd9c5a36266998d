/// Forward-difference jacobian of a vector function of a vector argument.
///  Example#1
/// ```
/// use ndarray::{Array1, ArrayView1};
/// use RustedJacobian::numerical::numerical_jacobian::numerical_jacobian;
/// // g(x) = sin(x) elementwise, its jacobian is diag(cos(x))
/// let x = Array1::<f64>::ones(4);
/// let jac = numerical_jacobian(|v: ArrayView1<f64>| v.mapv(f64::sin), &x).unwrap();
/// assert!((jac[[2, 2]] - 1.0_f64.cos()).abs() < 1e-4);
/// ```
/// Example#2
/// ```
/// // functions that may fail keep their own error type
/// use ndarray::{Array1, ArrayView1, array};
/// use RustedJacobian::numerical::numerical_jacobian::estimate_jacobian;
/// let x = array![1.0, 2.0];
/// let res: Result<_, Box<dyn std::error::Error>> =
///     estimate_jacobian(|v: ArrayView1<f64>| Ok(v.mapv(f64::ln)), &x);
/// assert_eq!(res.unwrap().dim(), (2, 2));
/// ```
pub mod numerical_jacobian;
/// comparison with analytic jacobians
pub mod jacobian_check;
