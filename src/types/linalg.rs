//! Linear algebra aliases shared by the filters
//!
//! Model dimensions are only known at runtime, so everything is built on
//! nalgebra's dynamically sized storage.

use nalgebra::{DMatrix, DVector};

pub type DMat = DMatrix<f64>;
pub type DVec = DVector<f64>;

/// Build a matrix from row-major rows. Returns the index of the first row
/// whose length differs from row 0.
pub fn mat_from_rows(rows: &[Vec<f64>]) -> Result<DMat, usize> {
    let ncols = rows.first().map_or(0, Vec::len);
    if let Some(bad) = rows.iter().position(|r| r.len() != ncols) {
        return Err(bad);
    }
    let flat: Vec<f64> = rows.iter().flatten().copied().collect();
    Ok(DMat::from_row_slice(rows.len(), ncols, &flat))
}

/// Sum of the diagonal, used as a scalar uncertainty figure
pub fn covariance_trace(p: &DMat) -> f64 {
    p.diagonal().iter().sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mat_from_rows_row_major() {
        let m = mat_from_rows(&[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
        assert_eq!(m.shape(), (2, 3));
        assert_eq!(m[(0, 2)], 3.0);
        assert_eq!(m[(1, 0)], 4.0);
    }

    #[test]
    fn test_mat_from_rows_ragged() {
        let err = mat_from_rows(&[vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert_eq!(err, 1);
    }

    #[test]
    fn test_mat_from_rows_empty() {
        let m = mat_from_rows(&[]).unwrap();
        assert_eq!(m.shape(), (0, 0));
    }

    #[test]
    fn test_covariance_trace() {
        let p = DMat::from_diagonal(&DVec::from_vec(vec![1.0, 2.5, 0.5]));
        assert_eq!(covariance_trace(&p), 4.0);
    }
}
