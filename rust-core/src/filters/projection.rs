//! Linear projection of spectra onto a filterbank

use crate::error::{AnalysisError, Result};
use ndarray::Array2;

/// `out[band, frame] = sum_bin filterbank[band, bin] * spectrum[bin, frame]`
///
/// `spectrum` is `(n_bins, n_frames)` power (or other consistent energy
/// units); `filterbank` is `(n_bands, n_bins)`.
pub fn project(spectrum: &Array2<f64>, filterbank: &Array2<f64>) -> Result<Array2<f64>> {
    if filterbank.ncols() != spectrum.nrows() {
        return Err(AnalysisError::invalid(
            "filterbank",
            format!(
                "expects {} bins but the spectrum has {}",
                filterbank.ncols(),
                spectrum.nrows()
            ),
        ));
    }

    Ok(filterbank.dot(spectrum))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_project_matrix_product() {
        let fb = array![[1.0, 1.0, 0.0], [0.0, 0.5, 2.0]];
        let power = array![[1.0, 0.0], [2.0, 1.0], [3.0, 4.0]];

        let out = project(&power, &fb).unwrap();

        assert_eq!(out, array![[3.0, 1.0], [7.0, 8.5]]);
    }

    #[test]
    fn test_project_shape_mismatch() {
        let fb = Array2::<f64>::zeros((4, 10));
        let power = Array2::<f64>::zeros((9, 3));
        assert!(matches!(
            project(&power, &fb),
            Err(AnalysisError::InvalidParameter { name: "filterbank", .. })
        ));
    }

    #[test]
    fn test_project_zero_frames() {
        let fb = Array2::<f64>::ones((4, 10));
        let power = Array2::<f64>::zeros((10, 0));
        assert_eq!(project(&power, &fb).unwrap().dim(), (4, 0));
    }
}
