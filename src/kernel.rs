//! Ensemble-average blurring kernels

use nalgebra::DMatrix;

use crate::{image::Image, periodic::wrapped_convolve, C, DEGREE, RADPERUAS, SGRA_POSITION_ANGLE};

/// Sgr A* scattering ellipse major axis FWHM [µas/cm²]
pub const SGRA_FWHM_MAJOR: f64 = 1.309e3;
/// Sgr A* scattering ellipse minor axis FWHM [µas/cm²]
pub const SGRA_FWHM_MINOR: f64 = 0.64e3;

/// Produces the ensemble-average image of a scattered source
pub trait EnsembleBlur {
    fn ensemble_average(&self, image: &Image) -> Image;
}

/// Elliptical Gaussian kernel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianKernel {
    /// major axis FWHM [rad]
    pub fwhm_major: f64,
    /// minor axis FWHM [rad]
    pub fwhm_minor: f64,
    /// major axis position angle, east of north [rad]
    pub position_angle: f64,
}
impl GaussianKernel {
    pub fn new(fwhm_major: f64, fwhm_minor: f64, position_angle: f64) -> Self {
        Self {
            fwhm_major,
            fwhm_minor,
            position_angle,
        }
    }
    /// Sgr A* scattering kernel at the frequency `rf` [Hz]
    ///
    /// The kernel size scales with the square of the wavelength.
    pub fn sgra(rf: f64) -> Self {
        let lambda2 = (C / rf * 100.).powi(2);
        Self::new(
            SGRA_FWHM_MAJOR * lambda2 * RADPERUAS,
            SGRA_FWHM_MINOR * lambda2 * RADPERUAS,
            SGRA_POSITION_ANGLE * DEGREE,
        )
    }
    /// Scales both axes by `frac`
    pub fn scaled(self, frac: f64) -> Self {
        Self {
            fwhm_major: frac * self.fwhm_major,
            fwhm_minor: frac * self.fwhm_minor,
            ..self
        }
    }
    /// Kernel sampled on a `(ydim, xdim)` grid of `psize` pixels, normalized to a unit sum
    ///
    /// Returns `None` for a degenerate kernel.
    pub fn sample(&self, xdim: usize, ydim: usize, psize: f64) -> Option<DMatrix<f64>> {
        if !(self.fwhm_major > 0. && self.fwhm_minor > 0.) {
            return None;
        }
        let fwhm_to_sigma = 1. / (2. * (2. * 2f64.ln()).sqrt());
        let sigma_major = self.fwhm_major * fwhm_to_sigma;
        let sigma_minor = self.fwhm_minor * fwhm_to_sigma;
        let (s, c) = self.position_angle.sin_cos();
        let (x0, y0) = (0.5 * (xdim as f64 - 1.), 0.5 * (ydim as f64 - 1.));
        let kernel = DMatrix::from_fn(ydim, xdim, |i, j| {
            // RA increases to the left, Dec upward
            let x = (x0 - j as f64) * psize;
            let y = (y0 - i as f64) * psize;
            let major = y * c + x * s;
            let minor = x * c - y * s;
            (-0.5 * (major / sigma_major).powi(2) - 0.5 * (minor / sigma_minor).powi(2)).exp()
        });
        let sum = kernel.sum();
        (sum > 0.).then(|| kernel / sum)
    }
}
impl EnsembleBlur for GaussianKernel {
    fn ensemble_average(&self, image: &Image) -> Image {
        match self.sample(image.xdim(), image.ydim(), image.psize()) {
            Some(kernel) => image.with_pixels(wrapped_convolve(image.pixels(), &kernel)),
            None => image.clone(),
        }
    }
}

/// Frequency dependent Sgr A* scattering blur
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SgraScattering {
    /// kernel strength, 1 for the full ensemble-average blur
    pub frac: f64,
}
impl Default for SgraScattering {
    fn default() -> Self {
        Self { frac: 1. }
    }
}
impl EnsembleBlur for SgraScattering {
    fn ensemble_average(&self, image: &Image) -> Image {
        GaussianKernel::sgra(image.frequency())
            .scaled(self.frac)
            .ensemble_average(image)
    }
}
