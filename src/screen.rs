/*!
# Screen realizations

Random complex fields over the 2D wavenumber grid of the phase screen.

A realization `ε` satisfies `ε[-k] = conj(ε[k])` (indices taken modulo the grid
size), so that the inverse Fourier transform of `ε` weighted by any real
spectrum is real. Only half of the modes are independent:

- the top row modes of positive wavenumber `kx > 0`,
- all the modes of the rows of positive wavenumber `ky > 0`,

that is `(nx·ny-1)/2` complex values; the DC mode is always zero.
Both grid dimensions must be odd.
*/

use nalgebra::DMatrix;
use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::StandardNormal;
use rustfft::num_complex::Complex64;
use std::f64::consts::FRAC_1_SQRT_2;

#[derive(Debug, thiserror::Error)]
pub enum ScreenError {
    #[error("screen size {0} is even, an odd size is required")]
    EvenSize(usize),
    #[error("screen list has {found} values, expected {expected}")]
    ShapeMismatch { expected: usize, found: usize },
}
type Result<T> = std::result::Result<T, ScreenError>;

/// Signed wavenumber index of the storage `index` along an axis of `n` samples
///
/// Indices above `(n-1)/2` are folded back by `n`, following the discrete
/// Fourier transform frequency ordering: `0, 1, …, (n-1)/2, -(n-1)/2, …, -1` for odd `n`.
pub fn signed_index(index: usize, n: usize) -> isize {
    if 2 * index > n.saturating_sub(1) {
        index as isize - n as isize
    } else {
        index as isize
    }
}
/// Storage index of the signed wavenumber index `k` along an axis of `n` samples
fn storage_index(k: isize, n: usize) -> usize {
    k.rem_euclid(n as isize) as usize
}
/// Storage index of the wavenumber opposite to `index`
fn conjugate_index(index: usize, n: usize) -> usize {
    storage_index(-signed_index(index, n), n)
}
fn check_odd(n: usize) -> Result<()> {
    if n % 2 == 0 {
        Err(ScreenError::EvenSize(n))
    } else {
        Ok(())
    }
}

/// Hermitian random screen in the wavenumber domain
///
/// Modes are stored as a `(ny, nx)` matrix in FFT order.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenRealization {
    modes: DMatrix<Complex64>,
}
impl ScreenRealization {
    /// The all-zero screen
    pub fn zeros(nx: usize, ny: usize) -> Result<Self> {
        check_odd(nx)?;
        check_odd(ny)?;
        Ok(Self {
            modes: DMatrix::zeros(ny, nx),
        })
    }
    /// Iterator over the `(row,column)` indices of the independent modes, in raster order
    fn independent_modes(nx: usize, ny: usize) -> impl Iterator<Item = (usize, usize)> {
        (0..ny)
            .flat_map(move |y| (0..nx).map(move |x| (y, x)))
            .filter(move |&(y, x)| {
                let (ky, kx) = (signed_index(y, ny), signed_index(x, nx));
                ky > 0 || (ky == 0 && kx > 0)
            })
    }
    /// Number of independent modes
    pub fn n_independent(&self) -> usize {
        (self.modes.len() - 1) / 2
    }
    /// Sets the dependent modes to the conjugate of their independent counterpart
    fn symmetrize(&mut self) {
        let (ny, nx) = self.modes.shape();
        for (y, x) in Self::independent_modes(nx, ny) {
            let value = self.modes[(y, x)].conj();
            self.modes[(conjugate_index(y, ny), conjugate_index(x, nx))] = value;
        }
        self.modes[(0, 0)] = Complex64::new(0., 0.);
    }
    /// Zeroes the DC and the 4 lowest order modes `(ky,kx) = (±1,0), (0,±1)`
    ///
    /// These modes are the ones introducing an overall tilt of the phase screen,
    /// i.e. a translation of the scattered image. Modes the grid is too small to hold are skipped.
    fn remove_linear_shift(&mut self) {
        let (ny, nx) = self.modes.shape();
        let zero = Complex64::new(0., 0.);
        for (ky, kx) in [(0, 0), (1, 0), (0, 1), (-1, 0), (0, -1)] {
            let (y, x) = (storage_index(ky, ny), storage_index(kx, nx));
            if signed_index(y, ny) == ky && signed_index(x, nx) == kx {
                self.modes[(y, x)] = zero;
            }
        }
    }
    /// Flattens the independent modes into the real parts followed by the imaginary parts
    pub fn to_list(&self) -> Vec<f64> {
        let (ny, nx) = self.modes.shape();
        let (re, im): (Vec<f64>, Vec<f64>) = Self::independent_modes(nx, ny)
            .map(|(y, x)| {
                let z = self.modes[(y, x)];
                (z.re, z.im)
            })
            .unzip();
        re.into_iter().chain(im).collect()
    }
    pub fn modes(&self) -> &DMatrix<Complex64> {
        &self.modes
    }
    pub fn nx(&self) -> usize {
        self.modes.ncols()
    }
    pub fn ny(&self) -> usize {
        self.modes.nrows()
    }
    /// `(ny, nx)`
    pub fn shape(&self) -> (usize, usize) {
        self.modes.shape()
    }
    /// Largest departure from the Hermitian symmetry
    pub fn hermitian_residual(&self) -> f64 {
        let (ny, nx) = self.modes.shape();
        let mut residual = self.modes[(0, 0)].norm();
        for y in 0..ny {
            for x in 0..nx {
                let partner = self.modes[(conjugate_index(y, ny), conjugate_index(x, nx))];
                residual = residual.max((partner - self.modes[(y, x)].conj()).norm());
            }
        }
        residual
    }
    /// Returns `true` if all the modes are zero
    pub fn is_zero(&self) -> bool {
        self.modes.iter().all(|z| z.re == 0. && z.im == 0.)
    }
}

/// [ScreenRealization] builder
#[derive(Debug, Clone, Copy)]
pub struct ScreenBuilder {
    suppress_linear_shift: bool,
}
impl Default for ScreenBuilder {
    fn default() -> Self {
        Self {
            suppress_linear_shift: true,
        }
    }
}
impl ScreenBuilder {
    /// Zeroes (`true`) or keeps (`false`) the modes shifting the image (default: `true`)
    pub fn suppress_linear_shift(self, suppress_linear_shift: bool) -> Self {
        Self {
            suppress_linear_shift,
        }
    }
    fn finish(&self, mut screen: ScreenRealization) -> ScreenRealization {
        screen.symmetrize();
        if self.suppress_linear_shift {
            screen.remove_linear_shift();
        }
        screen
    }
    /// Draws a random `(ny, nx)` screen from `rng`
    ///
    /// The real parts of all the modes are drawn first, row after row, then the
    /// imaginary parts, each from a normal distribution of variance 1/2.
    /// The dependent half is then overwritten from the independent half.
    pub fn from_random<R: Rng + ?Sized>(
        &self,
        nx: usize,
        ny: usize,
        rng: &mut R,
    ) -> Result<ScreenRealization> {
        check_odd(nx)?;
        check_odd(ny)?;
        let n = nx * ny;
        let mut draw = || -> Vec<f64> {
            (0..n)
                .map(|_| FRAC_1_SQRT_2 * rng.sample::<f64, _>(StandardNormal))
                .collect()
        };
        let re = draw();
        let im = draw();
        let modes = DMatrix::from_fn(ny, nx, |y, x| {
            let k = y * nx + x;
            Complex64::new(re[k], im[k])
        });
        Ok(self.finish(ScreenRealization { modes }))
    }
    /// Draws a random screen, seeding the generator with `seed` if it is given and non-zero
    pub fn from_seed(&self, nx: usize, ny: usize, seed: Option<u64>) -> Result<ScreenRealization> {
        let mut rng = match seed {
            Some(seed) if seed != 0 => StdRng::seed_from_u64(seed),
            _ => StdRng::from_entropy(),
        };
        self.from_random(nx, ny, &mut rng)
    }
    /// Builds a `n`x`n` screen from the `(n²-1)/2` real parts followed by the `(n²-1)/2`
    /// imaginary parts of the independent modes
    pub fn from_list(&self, values: &[f64], n: usize) -> Result<ScreenRealization> {
        check_odd(n)?;
        let expected = n * n - 1;
        if values.len() != expected {
            return Err(ScreenError::ShapeMismatch {
                expected,
                found: values.len(),
            });
        }
        let (re, im) = values.split_at(expected / 2);
        let mut modes = DMatrix::zeros(n, n);
        for (((y, x), &re), &im) in ScreenRealization::independent_modes(n, n).zip(re).zip(im) {
            modes[(y, x)] = Complex64::new(re, im);
        }
        Ok(self.finish(ScreenRealization { modes }))
    }
}
