/*!
# Scattering engine

Instantaneous scattered image from the thin-screen, first-order refractive
perturbation of the ensemble-average image:

```text
I = I_ea + r_F² (∂x I_ea ∂x φ + ∂y I_ea ∂y φ)
```

with the gradients taken with periodic borders over the screen field of view.
*/

use nalgebra::DMatrix;
use rayon::prelude::*;

use crate::{
    error::Result,
    geometry::ScatteringGeometry,
    image::Image,
    kernel::{EnsembleBlur, SgraScattering},
    periodic::wrapped_gradient,
    phase::PhaseScreen,
    screen::ScreenRealization,
};

/// Scattered image with the intermediate products of the pipeline
#[derive(Debug, Clone)]
pub struct Scattered {
    /// instantaneous scattered image
    pub image: Image,
    /// ensemble-average image
    pub ensemble_average: Image,
    /// phase screen, `None` when no realization was given
    pub phase: Option<PhaseScreen>,
}

/// Scattering pipeline
#[derive(Debug, Clone)]
pub struct Scatterer<B = SgraScattering> {
    geometry: ScatteringGeometry,
    blur: B,
    clamp_negative_flux: bool,
}
impl Default for Scatterer {
    fn default() -> Self {
        Self::new(ScatteringGeometry::default())
    }
}
impl Scatterer {
    /// Creates a scattering pipeline with the Sgr A* ensemble-average blur
    pub fn new(geometry: ScatteringGeometry) -> Self {
        Self {
            geometry,
            blur: SgraScattering::default(),
            clamp_negative_flux: false,
        }
    }
}
impl<B: EnsembleBlur> Scatterer<B> {
    /// Sets the scattering screen geometry
    pub fn geometry(self, geometry: ScatteringGeometry) -> Self {
        Self { geometry, ..self }
    }
    /// Replaces the ensemble-average blur
    pub fn blur<T: EnsembleBlur>(self, blur: T) -> Scatterer<T> {
        Scatterer {
            geometry: self.geometry,
            blur,
            clamp_negative_flux: self.clamp_negative_flux,
        }
    }
    /// Replaces negative pixels of the scattered image by their absolute value (default: `false`)
    pub fn clamp_negative_flux(self, clamp_negative_flux: bool) -> Self {
        Self {
            clamp_negative_flux,
            ..self
        }
    }
    pub fn scattering_geometry(&self) -> &ScatteringGeometry {
        &self.geometry
    }
    /// Ensemble-average image of `image`
    pub fn ensemble_average(&self, image: &Image) -> Image {
        self.blur.ensemble_average(image)
    }
    /// Scatters `image` through the phase screen of `realization`
    ///
    /// Without realization, the ensemble-average image is returned.
    pub fn scatter(
        &self,
        image: &Image,
        realization: Option<&ScreenRealization>,
    ) -> Result<Scattered> {
        let ensemble_average = self.ensemble_average(image);
        match realization {
            Some(realization) => self.perturb(image, ensemble_average, realization),
            None => {
                log::info!("no screen realization, returning the ensemble-average image");
                Ok(Scattered {
                    image: ensemble_average.clone(),
                    ensemble_average,
                    phase: None,
                })
            }
        }
    }
    /// Applies the refractive perturbation of `realization` to the ensemble-average image
    /// of `image`
    pub fn perturb(
        &self,
        image: &Image,
        ensemble_average: Image,
        realization: &ScreenRealization,
    ) -> Result<Scattered> {
        let phase = PhaseScreen::synthesize(realization, image, &self.geometry)?;
        let params = phase.parameters();
        let pixel = params.fov / image.xdim() as f64;

        let (ea_x, ea_y) = screen_gradient(ensemble_average.pixels(), pixel);
        let (phi_x, phi_y) = screen_gradient(phase.phase(), pixel);
        let refraction = ea_x.component_mul(&phi_x) + ea_y.component_mul(&phi_y);
        let mut pixels = ensemble_average.pixels() + refraction * params.fresnel_scale.powi(2);

        if self.clamp_negative_flux {
            let n_negative = pixels.iter().filter(|&&p| p < 0.).count();
            if n_negative > 0 {
                log::warn!("clamping {} negative pixels", n_negative);
                pixels.apply(|p| *p = p.abs());
            }
        }
        log::info!(
            "scattered image flux: {:.6} (ensemble-average: {:.6})",
            pixels.sum(),
            ensemble_average.total_flux()
        );

        Ok(Scattered {
            image: ensemble_average.with_pixels(pixels),
            ensemble_average,
            phase: Some(phase),
        })
    }
}
impl<B: EnsembleBlur + Sync> Scatterer<B> {
    /// Scatters `image` through each of the `realizations` in parallel
    ///
    /// The ensemble-average image is computed once and shared by all realizations.
    pub fn ensemble(
        &self,
        image: &Image,
        realizations: &[ScreenRealization],
    ) -> Result<Vec<Scattered>> {
        let ensemble_average = self.ensemble_average(image);
        realizations
            .par_iter()
            .map(|realization| self.perturb(image, ensemble_average.clone(), realization))
            .collect()
    }
}

/// Periodic gradient of `field` sampled every `pixel`, oriented right to left and bottom to top
fn screen_gradient(field: &DMatrix<f64>, pixel: f64) -> (DMatrix<f64>, DMatrix<f64>) {
    let (along_rows, along_cols) = wrapped_gradient(&(field / pixel));
    (-along_cols, -along_rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ScreenBuilder, RADPERUAS};

    fn source() -> Image {
        Image::point_source(33, 2. * RADPERUAS, 230e9)
    }

    #[test]
    fn no_realization_is_ensemble_average() {
        let scatterer = Scatterer::default();
        let scattered = scatterer.scatter(&source(), None).unwrap();
        assert_eq!(scattered.image, scatterer.ensemble_average(&source()));
        assert!(scattered.phase.is_none());
    }

    #[test]
    fn zero_screen_is_ensemble_average() {
        let scatterer = Scatterer::default();
        let screen = ScreenRealization::zeros(33, 33).unwrap();
        let scattered = scatterer.scatter(&source(), Some(&screen)).unwrap();
        assert_eq!(scattered.image.imvec(), scattered.ensemble_average.imvec());
        assert_eq!(
            scattered.ensemble_average,
            SgraScattering::default().ensemble_average(&source())
        );
    }

    #[test]
    fn gradient_orientation() {
        // flux increasing to the right and downward: gradients point left and up
        let field = DMatrix::from_fn(5, 5, |i, j| (i + j) as f64);
        let (gx, gy) = screen_gradient(&field, 0.5);
        assert_eq!(gx[(2, 2)], -2.);
        assert_eq!(gy[(2, 2)], -2.);
    }

    #[test]
    fn clamped_flux_is_positive() {
        let screen = ScreenBuilder::default().from_seed(33, 33, Some(5)).unwrap();
        let scattered = Scatterer::default()
            .clamp_negative_flux(true)
            .scatter(&source(), Some(&screen))
            .unwrap();
        assert!(scattered.image.pixels().iter().all(|&p| p >= 0.));
    }

    #[test]
    fn custom_blur() {
        struct Identity;
        impl EnsembleBlur for Identity {
            fn ensemble_average(&self, image: &Image) -> Image {
                image.clone()
            }
        }
        let scattered = Scatterer::default()
            .blur(Identity)
            .scatter(&source(), None)
            .unwrap();
        assert_eq!(scattered.image, source());
    }

    #[test]
    fn ensemble_matches_single_scatter() {
        let builder = ScreenBuilder::default();
        let screens: Vec<_> = (1..=4)
            .map(|seed| builder.from_seed(33, 33, Some(seed)).unwrap())
            .collect();
        let scatterer = Scatterer::default();
        let ensemble = scatterer.ensemble(&source(), &screens).unwrap();
        assert_eq!(ensemble.len(), 4);
        for (scattered, screen) in ensemble.iter().zip(&screens) {
            let single = scatterer.scatter(&source(), Some(screen)).unwrap();
            assert_eq!(scattered.image, single.image);
        }
    }

    #[test]
    fn screen_image_mismatch() {
        let screen = ScreenBuilder::default().from_seed(31, 31, Some(5)).unwrap();
        assert!(matches!(
            Scatterer::default().scatter(&source(), Some(&screen)),
            Err(crate::Error::PhaseScreen(_))
        ));
    }
}
