//! Dense linear solvers backing the IK iteration: a square LU solve, a
//! rank-deficiency-tolerant SVD least-squares solve, and a pseudo-inverse.
//! The SVD routines cut off singular values below a configurable ratio of the
//! largest one instead of failing on ill-conditioned input.

extern crate nalgebra as na;
use na::{DMatrix, DVector};

/// Default singular value cutoff: values below this fraction of the largest
/// singular value are treated as zero.
pub const DEFAULT_SV_RATIO: f64 = 1.0e-3;

/// Solves the square system `a * x = b` by LU decomposition.
pub fn solve_linear_equation_lu(
    a: &DMatrix<f64>,
    b: &DVector<f64>,
) -> Result<DVector<f64>, &'static str> {
    if !a.is_square() {
        return Err("LU solve requires a square matrix");
    }
    if a.nrows() != b.len() {
        return Err("dimension mismatch between matrix and right-hand side");
    }
    a.clone().lu().solve(b).ok_or("matrix is singular")
}

/// Least-squares solve of the possibly rectangular system `a * x = b` via
/// SVD. Singular values below `sv_ratio` times the largest one are cut off,
/// so rank-deficient systems degrade gracefully instead of erroring.
pub fn solve_linear_equation_svd(
    a: &DMatrix<f64>,
    b: &DVector<f64>,
    sv_ratio: f64,
) -> Result<DVector<f64>, &'static str> {
    if a.nrows() != b.len() {
        return Err("dimension mismatch between matrix and right-hand side");
    }
    if a.ncols() == 0 || a.nrows() == 0 {
        return Ok(DVector::zeros(a.ncols()));
    }
    let svd = a.clone().svd(true, true);
    let cutoff = svd.singular_values.max() * sv_ratio;
    svd.solve(b, cutoff)
}

/// Solves `a * x = b`, picking the solver by shape: a direct LU solve for
/// square systems, falling back to the SVD least-squares solve when the
/// matrix is rectangular or singular.
pub fn solve_linear_equation(
    a: &DMatrix<f64>,
    b: &DVector<f64>,
    sv_ratio: f64,
) -> Result<DVector<f64>, &'static str> {
    if a.is_square() {
        if let Ok(x) = solve_linear_equation_lu(a, b) {
            return Ok(x);
        }
    }
    solve_linear_equation_svd(a, b, sv_ratio)
}

/// Moore-Penrose pseudo-inverse with the same singular value cutoff ratio as
/// [`solve_linear_equation_svd`].
pub fn pseudo_inverse(a: &DMatrix<f64>, sv_ratio: f64) -> Result<DMatrix<f64>, &'static str> {
    if a.ncols() == 0 || a.nrows() == 0 {
        return Ok(DMatrix::zeros(a.ncols(), a.nrows()));
    }
    let svd = a.clone().svd(true, true);
    let cutoff = svd.singular_values.max() * sv_ratio;
    svd.pseudo_inverse(cutoff)
}

/// Matrix inverse built on the square LU solve against an identity
/// right-hand side.
pub fn inverse(m: &DMatrix<f64>) -> Result<DMatrix<f64>, &'static str> {
    if !m.is_square() {
        return Err("only square matrices can be inverted");
    }
    let dim = m.nrows();
    let mut out = DMatrix::identity(dim, dim);
    if m.clone().lu().solve_mut(&mut out) {
        Ok(out)
    } else {
        Err("matrix is singular")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lu_solves_square_system() {
        let a = DMatrix::from_row_slice(2, 2, &[2.0, 0.0, 0.0, 4.0]);
        let b = DVector::from_row_slice(&[2.0, 8.0]);
        let x = solve_linear_equation_lu(&a, &b).unwrap();
        assert!((x[0] - 1.0).abs() < 1e-12);
        assert!((x[1] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_lu_reports_singular_matrix() {
        let a = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 4.0]);
        let b = DVector::from_row_slice(&[1.0, 2.0]);
        assert!(solve_linear_equation_lu(&a, &b).is_err());
    }

    #[test]
    fn test_svd_solves_overdetermined_system() {
        // Tall system: least-squares fit of x = 3 over two consistent rows.
        let a = DMatrix::from_row_slice(2, 1, &[1.0, 2.0]);
        let b = DVector::from_row_slice(&[3.0, 6.0]);
        let x = solve_linear_equation_svd(&a, &b, DEFAULT_SV_RATIO).unwrap();
        assert_eq!(x.len(), 1);
        assert!((x[0] - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_svd_tolerates_rank_deficiency() {
        let a = DMatrix::from_row_slice(2, 2, &[1.0, 1.0, 1.0, 1.0]);
        let b = DVector::from_row_slice(&[2.0, 2.0]);
        let x = solve_linear_equation_svd(&a, &b, DEFAULT_SV_RATIO).unwrap();
        assert!(x.iter().all(|v| v.is_finite()));
        // Minimum-norm solution splits the demand across both columns.
        assert!((x[0] - 1.0).abs() < 1e-9);
        assert!((x[1] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_dispatch_falls_back_to_svd_for_singular_square() {
        let a = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 4.0]);
        let b = DVector::from_row_slice(&[1.0, 2.0]);
        let x = solve_linear_equation(&a, &b, DEFAULT_SV_RATIO).unwrap();
        assert!(x.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_inverse_round_trip() {
        let m = DMatrix::from_row_slice(2, 2, &[4.0, 7.0, 2.0, 6.0]);
        let inv = inverse(&m).unwrap();
        let product = &m * &inv;
        let identity = DMatrix::<f64>::identity(2, 2);
        assert!((product - identity).norm() < 1e-12);
    }

    #[test]
    fn test_pseudo_inverse_of_column() {
        let a = DMatrix::from_row_slice(3, 1, &[0.0, 2.0, 0.0]);
        let pinv = pseudo_inverse(&a, DEFAULT_SV_RATIO).unwrap();
        assert_eq!((pinv.nrows(), pinv.ncols()), (1, 3));
        assert!((pinv[(0, 1)] - 0.5).abs() < 1e-12);
    }
}
