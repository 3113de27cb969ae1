/*!
# Phase screen

Synthesis of the real phase map of the scattering screen from a
[ScreenRealization] weighted by the square root of the [PowerSpectrum]:

```text
φ = Re{ λ̄/FOV · N · IFFT( √Q ⊙ ε ) }
```

where `N` is the number of grid cells, compensating for the `1/N` factor of the
inverse transform.
*/

use nalgebra::DMatrix;
use std::f64::consts::PI;

use crate::{
    fft::ifft2,
    geometry::{ScatteringGeometry, ScatteringParameters},
    image::Image,
    screen::{signed_index, ScreenRealization},
    spectrum::PowerSpectrum,
};

#[derive(Debug, thiserror::Error)]
pub enum PhaseScreenError {
    #[error("screen shape {screen:?} doesn't match image shape {image:?}")]
    ShapeMismatch {
        screen: (usize, usize),
        image: (usize, usize),
    },
}
type Result<T> = std::result::Result<T, PhaseScreenError>;

/// Square root of the power spectrum on the FFT wavenumber grid of a `(ny, nx)` screen
///
/// `dq` is the wavenumber spacing; the DC term is set to zero.
pub fn spectral_weights(spectrum: &PowerSpectrum, nx: usize, ny: usize, dq: f64) -> DMatrix<f64> {
    DMatrix::from_fn(ny, nx, |y, x| {
        if x == 0 && y == 0 {
            0.
        } else {
            let qx = dq * signed_index(x, nx) as f64;
            let qy = dq * signed_index(y, ny) as f64;
            spectrum.eval(qx, qy).sqrt()
        }
    })
}

/// Real phase map of the scattering screen
///
/// The phase map is stored as an [Image] inheriting the coordinates and
/// observing metadata of the reference image it was synthesized for.
#[derive(Debug, Clone)]
pub struct PhaseScreen {
    image: Image,
    params: ScatteringParameters,
    imaginary_residual: f64,
}
impl PhaseScreen {
    /// Synthesizes the phase screen of `realization` for the field of view and
    /// frequency of `reference`
    pub fn synthesize(
        realization: &ScreenRealization,
        reference: &Image,
        geometry: &ScatteringGeometry,
    ) -> Result<Self> {
        if realization.shape() != reference.shape() {
            return Err(PhaseScreenError::ShapeMismatch {
                screen: realization.shape(),
                image: reference.shape(),
            });
        }
        let params = geometry.parameters(reference);
        let (ny, nx) = realization.shape();
        let dq = 2. * PI / params.fov;
        let sqrt_q = spectral_weights(&PowerSpectrum::new(&params), nx, ny, dq);

        let weighted = realization.modes().zip_map(&sqrt_q, |z, w| z * w);
        let scale = params.wavelength_bar / params.fov * (nx * ny) as f64;
        let field = ifft2(&weighted).map(|z| z * scale);

        let phi = field.map(|z| z.re);
        let max_re = phi.amax();
        let max_im = field.iter().map(|z| z.im.abs()).fold(0f64, f64::max);
        let imaginary_residual = if max_re > 0. { max_im / max_re } else { max_im };
        log::debug!(
            "phase screen: max |φ| = {:.3e}, imaginary residual = {:.3e}",
            max_re,
            imaginary_residual
        );

        Ok(Self {
            image: reference.with_pixels(phi),
            params,
            imaginary_residual,
        })
    }
    /// Phase map
    pub fn phase(&self) -> &DMatrix<f64> {
        self.image.pixels()
    }
    pub fn image(&self) -> &Image {
        &self.image
    }
    pub fn into_image(self) -> Image {
        self.image
    }
    /// Scattering parameters the screen was synthesized with
    pub fn parameters(&self) -> &ScatteringParameters {
        &self.params
    }
    /// Largest imaginary part left by the inverse transform, relative to the largest real part
    pub fn imaginary_residual(&self) -> f64 {
        self.imaginary_residual
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ScreenBuilder, RADPERUAS};

    fn reference(n: usize) -> Image {
        Image::point_source(n, 2. * RADPERUAS, 230e9)
            .ra_dec(17.761, -29.008)
            .source("SgrA*")
    }

    #[test]
    fn weights_follow_fft_ordering() {
        let params = ScatteringGeometry::default().parameters(&reference(9));
        let spectrum = PowerSpectrum::new(&params);
        let dq = 2. * PI / params.fov;
        let w = spectral_weights(&spectrum, 9, 9, dq);
        assert_eq!(w[(0, 0)], 0.);
        assert_eq!(w[(0, 8)], spectrum.eval(-dq, 0.).sqrt());
        assert_eq!(w[(5, 4)], spectrum.eval(4. * dq, -4. * dq).sqrt());
        // Q(-q) = Q(q)
        for y in 0..9 {
            for x in 0..9 {
                let (y2, x2) = ((9 - y) % 9, (9 - x) % 9);
                assert!((w[(y, x)] - w[(y2, x2)]).abs() <= 1e-12 * w[(y, x)].abs());
            }
        }
    }

    #[test]
    fn phase_is_real() {
        let screen = ScreenBuilder::default()
            .from_seed(33, 33, Some(11))
            .unwrap();
        let phase = PhaseScreen::synthesize(&screen, &reference(33), &ScatteringGeometry::default())
            .unwrap();
        assert!(phase.imaginary_residual() < 1e-9);
        assert!(phase.phase().iter().all(|p| p.is_finite()));
        assert!(phase.phase().amax() > 0.);
    }

    #[test]
    fn single_mode_is_a_cosine() {
        // unit real mode at (ky,kx) = (1,1) and its conjugate at (-1,-1)
        let n = 9;
        let mut values = vec![0f64; n * n - 1];
        values[(n - 1) / 2 + 1] = 1.;
        let screen = ScreenBuilder::default()
            .suppress_linear_shift(false)
            .from_list(&values, n)
            .unwrap();
        assert_eq!(screen.modes()[(1, 1)].re, 1.);
        assert_eq!(screen.modes()[(n - 1, n - 1)].re, 1.);

        let geometry = ScatteringGeometry::default();
        let params = geometry.parameters(&reference(n));
        let dq = 2. * PI / params.fov;
        let amplitude =
            2. * params.wavelength_bar / params.fov * PowerSpectrum::new(&params).eval(dq, dq).sqrt();
        assert!(amplitude > 0.);

        let phase = PhaseScreen::synthesize(&screen, &reference(n), &geometry).unwrap();
        let phi = phase.phase();
        for y in 0..n {
            for x in 0..n {
                let expected = amplitude * (2. * PI * (x + y) as f64 / n as f64).cos();
                assert!(
                    (phi[(y, x)] - expected).abs() < 1e-12 * amplitude,
                    "φ({y},{x}) = {:e}, expected {expected:e}",
                    phi[(y, x)]
                );
            }
        }
    }

    #[test]
    fn zero_screen_zero_phase() {
        let screen = ScreenRealization::zeros(15, 15).unwrap();
        let phase = PhaseScreen::synthesize(&screen, &reference(15), &ScatteringGeometry::default())
            .unwrap();
        assert!(phase.phase().iter().all(|&p| p == 0.));
    }

    #[test]
    fn inherits_reference_metadata() {
        let screen = ScreenBuilder::default().from_seed(9, 9, Some(2)).unwrap();
        let phase =
            PhaseScreen::synthesize(&screen, &reference(9), &ScatteringGeometry::default()).unwrap();
        let image = phase.image();
        assert_eq!(image.source_name(), "SgrA*");
        assert_eq!(image.ra(), 17.761);
        assert_eq!(image.psize(), 2. * RADPERUAS);
        assert_eq!(image.shape(), (9, 9));
    }

    #[test]
    fn shape_mismatch() {
        let screen = ScreenBuilder::default().from_seed(9, 9, Some(2)).unwrap();
        assert!(matches!(
            PhaseScreen::synthesize(&screen, &reference(11), &ScatteringGeometry::default()),
            Err(PhaseScreenError::ShapeMismatch {
                screen: (9, 9),
                image: (11, 11)
            })
        ));
    }
}
