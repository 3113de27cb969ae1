//! Two-dimensional complex FFT on column-major [nalgebra] matrices

use nalgebra::DMatrix;
use rustfft::{num_complex::Complex64, FftDirection, FftPlanner};

/// Unnormalized transform along both axes
fn transform(data: &DMatrix<Complex64>, direction: FftDirection) -> DMatrix<Complex64> {
    let (nrows, ncols) = data.shape();
    if nrows == 0 || ncols == 0 {
        return data.clone();
    }
    let mut planner = FftPlanner::<f64>::new();
    // columns are contiguous, `process` walks the buffer one column at a time
    let mut data = data.clone();
    planner
        .plan_fft(nrows, direction)
        .process(data.as_mut_slice());
    let mut data = data.transpose();
    planner
        .plan_fft(ncols, direction)
        .process(data.as_mut_slice());
    data.transpose()
}

/// Forward 2D FFT, no normalization
pub fn fft2(data: &DMatrix<Complex64>) -> DMatrix<Complex64> {
    transform(data, FftDirection::Forward)
}

/// Inverse 2D FFT normalized by `1/(nrows·ncols)`
pub fn ifft2(data: &DMatrix<Complex64>) -> DMatrix<Complex64> {
    let norm = 1. / data.len().max(1) as f64;
    transform(data, FftDirection::Inverse).map(|z| z * norm)
}
