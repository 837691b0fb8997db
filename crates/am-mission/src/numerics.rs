//! Pseudospectral discretization operators and solver settings.

use crate::error::{MissionError, MissionResult};
use nalgebra::{DMatrix, DVector};

/// Differentiation/integration operators over one coordinate.
#[derive(Clone, Debug)]
pub struct Operators {
    /// Control points (dimensionless in [0,1], or rescaled time [s])
    pub control_points: DVector<f64>,
    /// Differentiation operator (N×N)
    pub differentiate: DMatrix<f64>,
    /// Integration operator (N×N)
    pub integrate: DMatrix<f64>,
}

impl Default for Operators {
    fn default() -> Self {
        Self {
            control_points: DVector::zeros(0),
            differentiate: DMatrix::zeros(0, 0),
            integrate: DMatrix::zeros(0, 0),
        }
    }
}

/// Numerical settings and operators for one segment.
#[derive(Clone, Debug)]
pub struct Numerics {
    /// Number of control points N (≥ 2)
    pub number_of_control_points: usize,
    /// Residual norm tolerance for the segment solve
    pub tolerance_solution: f64,
    /// Residual-evaluation budget for the segment solve
    pub max_evaluations: usize,
    /// Finite difference step for the solver Jacobian
    pub step_size: f64,
    /// Dimensionless operators on [0,1], pure functions of N
    pub dimensionless: Operators,
    /// Operators rescaled by the segment's actual time span
    pub time: Operators,
    /// Set by the driver after the solve
    pub converged: Option<bool>,
}

impl Default for Numerics {
    fn default() -> Self {
        Self {
            number_of_control_points: 16,
            tolerance_solution: 1e-8,
            max_evaluations: 20_000,
            step_size: 1e-8,
            dimensionless: Operators::default(),
            time: Operators::default(),
            converged: None,
        }
    }
}

impl Numerics {
    /// Build the dimensionless operators for the configured N.
    pub fn build(&mut self) -> MissionResult<()> {
        let (x, d, i) = chebyshev_data(self.number_of_control_points)?;
        self.dimensionless = Operators {
            control_points: x,
            differentiate: d,
            integrate: i,
        };
        Ok(())
    }

    /// Rescale the dimensionless operators onto a time span of `t_span`
    /// seconds starting at `t_initial`.
    pub fn rescale_time(&mut self, t_initial: f64, t_span: f64) -> MissionResult<()> {
        if self.dimensionless.control_points.is_empty() {
            return Err(MissionError::config("numerics operators not built"));
        }
        if !(t_span.is_finite() && t_span > 0.0) {
            return Err(MissionError::config(format!(
                "segment time span must be positive, got {t_span}"
            )));
        }
        self.time = Operators {
            control_points: self
                .dimensionless
                .control_points
                .map(|x| t_initial + x * t_span),
            differentiate: &self.dimensionless.differentiate / t_span,
            integrate: &self.dimensionless.integrate * t_span,
        };
        Ok(())
    }
}

/// Chebyshev pseudospectral differentiation and integration matrices over
/// cosine-spaced points on [0,1].
///
/// The integration operator is the inverse of the differentiation operator
/// on rows/columns 1..N, padded with a zero first row and column, so
/// `integrate * derivative` reconstructs a function up to its value at the
/// first node. Deterministic, a pure function of N.
pub fn chebyshev_data(n: usize) -> MissionResult<(DVector<f64>, DMatrix<f64>, DMatrix<f64>)> {
    if n < 2 {
        return Err(MissionError::config(format!(
            "discretization needs at least 2 control points, got {n}"
        )));
    }

    // cosine spaced in range [0,1]
    let x = DVector::from_fn(n, |i, _| {
        0.5 * (1.0 - (std::f64::consts::PI * i as f64 / (n - 1) as f64).cos())
    });

    // endpoint coefficients with alternating signs
    let c = DVector::from_fn(n, |i, _| {
        let endpoint = if i == 0 || i == n - 1 { 2.0 } else { 1.0 };
        endpoint * (-1.0f64).powi(i as i32)
    });

    let mut d = DMatrix::zeros(n, n);
    for i in 0..n {
        for j in 0..n {
            if i != j {
                d[(i, j)] = (c[i] / c[j]) / (x[i] - x[j]);
            }
        }
    }
    // negative row-sum trick for the diagonal
    for i in 0..n {
        let mut row_sum = 0.0;
        for j in 0..n {
            if i != j {
                row_sum += d[(i, j)];
            }
        }
        d[(i, i)] = -row_sum;
    }

    // invert D with the first row and column stripped, repack with zeros
    let sub = d.view((1, 1), (n - 1, n - 1)).into_owned();
    let sub_inv = sub
        .try_inverse()
        .ok_or_else(|| MissionError::config("differentiation operator is singular"))?;

    let mut integrate = DMatrix::zeros(n, n);
    integrate
        .view_mut((1, 1), (n - 1, n - 1))
        .copy_from(&sub_inv);

    Ok((x, d, integrate))
}
