/*!
# Periodic operators

Convolution and gradient on a 2D grid with toroidal boundaries: the grid is
treated as one tile of an infinitely repeated pattern instead of being
zero-padded.
*/

use nalgebra::DMatrix;

/// Wraps a signed offset into `0..n`
fn wrap(index: isize, n: usize) -> usize {
    index.rem_euclid(n as isize) as usize
}

/// Convolves `signal` with `kernel` under periodic boundary conditions
///
/// This is the convolution of the signal tiled 3×3 with the kernel, cropped back
/// to the central tile. The kernel is centered on its `((rows-1)/2, (cols-1)/2)`
/// element and the result has the shape of `signal`.
pub fn wrapped_convolve(signal: &DMatrix<f64>, kernel: &DMatrix<f64>) -> DMatrix<f64> {
    let (nrows, ncols) = signal.shape();
    let (krows, kcols) = kernel.shape();
    if nrows == 0 || ncols == 0 {
        return signal.clone();
    }
    let (ci, cj) = (((krows as isize) - 1) / 2, ((kcols as isize) - 1) / 2);
    DMatrix::from_fn(nrows, ncols, |i, j| {
        let mut sum = 0f64;
        for k in 0..kcols {
            let jj = wrap(j as isize + cj - k as isize, ncols);
            for l in 0..krows {
                let w = kernel[(l, k)];
                if w != 0. {
                    let ii = wrap(i as isize + ci - l as isize, nrows);
                    sum += w * signal[(ii, jj)];
                }
            }
        }
        sum
    })
}

/// Gradient of `field` with periodic borders
///
/// Central differences `(f[i+1] - f[i-1])/2` everywhere, the neighbors of border
/// elements being taken from the opposite side. Interior values are identical
/// to a plain non-periodic gradient.
///
/// Returns the derivatives along the rows (axis 0) and along the columns (axis 1),
/// in that order.
pub fn wrapped_gradient(field: &DMatrix<f64>) -> (DMatrix<f64>, DMatrix<f64>) {
    let (nrows, ncols) = field.shape();
    let along_rows = DMatrix::from_fn(nrows, ncols, |i, j| {
        let next = wrap(i as isize + 1, nrows);
        let prev = wrap(i as isize - 1, nrows);
        0.5 * (field[(next, j)] - field[(prev, j)])
    });
    let along_cols = DMatrix::from_fn(nrows, ncols, |i, j| {
        let next = wrap(j as isize + 1, ncols);
        let prev = wrap(j as isize - 1, ncols);
        0.5 * (field[(i, next)] - field[(i, prev)])
    });
    (along_rows, along_cols)
}
