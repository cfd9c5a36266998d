use crate::Utils::logger::{init_logger, parse_loglevel, save_jacobian_to_csv};
use crate::numerical::jacobian_check::{JacobianReport, linear_map_jacobian, sine_jacobian};
use crate::numerical::numerical_jacobian::{
    InvalidShapeError, estimate_jacobian_dvector, numerical_jacobian,
};
use log::{info, warn};
use nalgebra::{DMatrix, DVector};
use ndarray::{Array1, Array2, ArrayView1};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;
use std::path::Path;

/// Error types for demo configuration
#[derive(Debug, Clone, PartialEq)]
pub enum DemoConfigError {
    Parse(String),
    UnknownKey(String),
    InvalidValue { key: String, msg: String },
}

impl fmt::Display for DemoConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DemoConfigError::Parse(msg) => write!(f, "cannot parse config: {}", msg),
            DemoConfigError::UnknownKey(key) => write!(f, "unknown config key: {}", key),
            DemoConfigError::InvalidValue { key, msg } => {
                write!(f, "invalid value for {}: {}", key, msg)
            }
        }
    }
}

impl std::error::Error for DemoConfigError {}

/// Demonstration of the estimator on two functions with known jacobians:
/// f(x) = A·x with a seeded random A, and g(x) = sin(x) elementwise.
#[derive(Debug, Clone)]
pub struct JacobianDemo {
    pub seed: u64,
    /// number of rows of the random matrix A, i.e. number of outputs of f
    pub nrows: usize,
    pub point: Array1<f64>,
    /// largest acceptable sum of absolute errors
    pub tolerance: f64,
    pub loglevel: Option<String>,
    /// directory to save numerical jacobians as csv, nothing is saved if None
    pub csv_dir: Option<String>,
}

impl JacobianDemo {
    pub fn new() -> JacobianDemo {
        JacobianDemo {
            seed: 42,
            nrows: 3,
            point: Array1::ones(4),
            tolerance: 1e-3,
            loglevel: Some("info".to_string()),
            csv_dir: None,
        }
    }
    ////////////////////////////SETTERS///////////////////////////////////////////////////////////////////
    pub fn set_demo_params(
        &mut self,
        seed: Option<u64>,
        nrows: Option<usize>,
        point: Option<Vec<f64>>,
        tolerance: Option<f64>,
        loglevel: Option<String>,
    ) -> Result<(), DemoConfigError> {
        let invalid = |key: &str, msg: String| DemoConfigError::InvalidValue {
            key: key.to_string(),
            msg,
        };
        if nrows == Some(0) {
            return Err(invalid("nrows", "must be at least 1".to_string()));
        }
        if point.as_ref().is_some_and(|p| p.is_empty()) {
            return Err(invalid("point", "must have at least one component".to_string()));
        }
        if let Some(tolerance) = tolerance {
            if !(tolerance > 0.0) {
                return Err(invalid("tolerance", format!("must be positive, got {}", tolerance)));
            }
        }
        if loglevel.as_deref().is_some_and(|level| parse_loglevel(level).is_none()) {
            return Err(invalid(
                "loglevel",
                "must be debug, info, warn, error or off".to_string(),
            ));
        }

        // all arguments are valid, apply them together
        if let Some(seed) = seed {
            self.seed = seed;
        }
        if let Some(nrows) = nrows {
            self.nrows = nrows;
        }
        if let Some(point) = point {
            self.point = Array1::from_vec(point);
        }
        if let Some(tolerance) = tolerance {
            self.tolerance = tolerance;
        }
        if let Some(level) = loglevel {
            self.loglevel = Some(level);
        }
        Ok(())
    }

    pub fn set_csv_dir(&mut self, csv_dir: Option<String>) {
        self.csv_dir = csv_dir;
    }

    /// Read the `[demo]` section of a TOML document. Keys that are absent keep their defaults.
    /// ```toml
    /// [demo]
    /// seed = 42
    /// nrows = 3
    /// point = [1.0, 1.0, 1.0, 1.0]
    /// tolerance = 1e-3
    /// loglevel = "info"
    /// csv_dir = "results"
    /// ```
    pub fn from_toml_str(input: &str) -> Result<JacobianDemo, DemoConfigError> {
        let table = input
            .parse::<toml::Table>()
            .map_err(|e| DemoConfigError::Parse(e.to_string()))?;
        let mut demo = JacobianDemo::new();
        let section = match table.get("demo") {
            Some(value) => value.as_table().ok_or_else(|| DemoConfigError::InvalidValue {
                key: "demo".to_string(),
                msg: "must be a table".to_string(),
            })?,
            None => return Ok(demo),
        };

        let invalid = |key: &str, msg: &str| DemoConfigError::InvalidValue {
            key: key.to_string(),
            msg: msg.to_string(),
        };
        let (mut seed, mut nrows, mut point, mut tolerance, mut loglevel) =
            (None, None, None, None, None);
        for (key, value) in section {
            let key = key.as_str();
            match key {
                "seed" => {
                    let v = value
                        .as_integer()
                        .filter(|v| *v >= 0)
                        .ok_or_else(|| invalid(key, "must be a non-negative integer"))?;
                    seed = Some(v as u64);
                }
                "nrows" => {
                    let v = value
                        .as_integer()
                        .filter(|v| *v > 0)
                        .ok_or_else(|| invalid(key, "must be a positive integer"))?;
                    nrows = Some(v as usize);
                }
                "point" => {
                    let arr = value
                        .as_array()
                        .ok_or_else(|| invalid(key, "must be an array of numbers"))?;
                    let values = arr
                        .iter()
                        .map(|v| v.as_float().or_else(|| v.as_integer().map(|i| i as f64)))
                        .collect::<Option<Vec<f64>>>()
                        .ok_or_else(|| invalid(key, "must be an array of numbers"))?;
                    point = Some(values);
                }
                "tolerance" => {
                    let v = value
                        .as_float()
                        .or_else(|| value.as_integer().map(|i| i as f64))
                        .ok_or_else(|| invalid(key, "must be a number"))?;
                    tolerance = Some(v);
                }
                "loglevel" => {
                    let v = value
                        .as_str()
                        .ok_or_else(|| invalid(key, "must be a string"))?;
                    loglevel = Some(v.to_string());
                }
                "csv_dir" => {
                    let v = value
                        .as_str()
                        .ok_or_else(|| invalid(key, "must be a string"))?;
                    demo.set_csv_dir(Some(v.to_string()));
                }
                other => return Err(DemoConfigError::UnknownKey(other.to_string())),
            }
        }
        demo.set_demo_params(seed, nrows, point, tolerance, loglevel)?;
        Ok(demo)
    }

    /// nrows x n matrix of uniform [0, 1) numbers, the same for the same seed
    pub fn random_matrix(&self) -> Array2<f64> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        Array2::from_shape_fn((self.nrows, self.point.len()), |_| rng.random::<f64>())
    }

    pub fn linear_map_case(&self) -> Result<JacobianReport<f64>, InvalidShapeError> {
        let a = self.random_matrix();
        let jac_num = numerical_jacobian(|x: ArrayView1<f64>| a.dot(&x), &self.point)?;
        JacobianReport::new("f(x) = A*x", linear_map_jacobian(&a), jac_num)
    }

    pub fn sine_case(&self) -> Result<JacobianReport<f64>, InvalidShapeError> {
        let jac_num = numerical_jacobian(|x: ArrayView1<f64>| x.mapv(f64::sin), &self.point)?;
        JacobianReport::new("g(x) = sin(x)", sine_jacobian(&self.point), jac_num)
    }

    fn save_report(&self, report: &JacobianReport<f64>, filename: &str) {
        if let Some(dir) = &self.csv_dir {
            let path = Path::new(dir).join(filename);
            let path = path.to_string_lossy();
            match save_jacobian_to_csv(&report.numerical, &path) {
                Ok(()) => info!("numerical jacobian saved to {}", path),
                Err(e) => warn!("cannot save {}: {}", path, e),
            }
        }
    }

    /// run both cases, print them, and warn about the ones with error above tolerance
    pub fn run(&self) -> Result<Vec<JacobianReport<f64>>, InvalidShapeError> {
        info!(
            "jacobian demo: seed {}, A is {}x{}, x = {}",
            self.seed,
            self.nrows,
            self.point.len(),
            self.point
        );
        let reports = vec![self.linear_map_case()?, self.sine_case()?];
        for (k, report) in reports.iter().enumerate() {
            println!("{}", report);
            if report.passes(self.tolerance) {
                info!(
                    "{}: error {:e} within tolerance {:e}",
                    report.name, report.error, self.tolerance
                );
            } else {
                warn!(
                    "{}: error {:e} exceeds tolerance {:e}",
                    report.name, report.error, self.tolerance
                );
            }
            self.save_report(report, &format!("jacobian_{}.csv", k));
        }
        Ok(reports)
    }

    /// run with the configured loglevel installed as the terminal logger
    pub fn run_with_logging(&self) -> Result<Vec<JacobianReport<f64>>, InvalidShapeError> {
        init_logger(self.loglevel.as_deref(), false);
        let res = self.run();
        info!("demo ended");
        res
    }
}

impl Default for JacobianDemo {
    fn default() -> Self {
        JacobianDemo::new()
    }
}

pub fn jacobian_examples(example: usize) {
    match example {
        0 => {
            // the classic demo: seed 42, 3x4 matrix, x = [1, 1, 1, 1]
            let demo = JacobianDemo::new();
            if let Err(e) = demo.run_with_logging() {
                eprintln!("{}", e);
            }
        }
        1 => {
            // the same demo configured from a TOML document
            let input = r#"
                [demo]
                seed = 7
                nrows = 2
                point = [0.5, -1.0, 2.0]
                tolerance = 1e-4
                loglevel = "debug"
            "#;
            match JacobianDemo::from_toml_str(input) {
                Ok(demo) => {
                    if let Err(e) = demo.run_with_logging() {
                        eprintln!("{}", e);
                    }
                }
                Err(e) => eprintln!("{}", e),
            }
        }
        2 => {
            // nalgebra vectors: f(x, y) = (x^2 + y^2 - 10, x - y - 4)
            let x = DVector::from_vec(vec![1.0, 1.0]);
            let res = estimate_jacobian_dvector(
                |v: &DVector<f64>| {
                    Ok::<_, InvalidShapeError>(DVector::from_vec(vec![
                        v[0] * v[0] + v[1] * v[1] - 10.0,
                        v[0] - v[1] - 4.0,
                    ]))
                },
                &x,
            );
            match res {
                Ok(jac) => {
                    let jac_ana = DMatrix::from_row_slice(2, 2, &[2.0, 1.0, 2.0, -1.0]);
                    println!("{}\n{}\n{}", jac_ana, jac, (&jac - &jac_ana).abs().sum());
                }
                Err(e) => eprintln!("{}", e),
            }
        }
        3 => {
            // single precision: the perturbation step is taken as f32 as well
            let x = Array1::<f32>::ones(4);
            match numerical_jacobian(|v: ArrayView1<f32>| v.mapv(f32::sin), &x)
                .and_then(|jac| JacobianReport::new("g(x) = sin(x), f32", sine_jacobian(&x), jac))
            {
                Ok(report) => println!("{}", report),
                Err(e) => eprintln!("{}", e),
            }
        }
        _ => {
            println!("no example with number {}", example);
        }
    }
}
