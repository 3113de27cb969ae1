/*!
# Scattering geometry

Physical description of the scattering screen toward the source and the
wavelength dependent scattering parameters derived from it.

All lengths are in centimeters.
*/

use serde::{Deserialize, Serialize};

use crate::{image::Image, SGRA_POSITION_ANGLE};

/// Scattering screen geometry
///
/// Defaults to the screen toward Sgr A*.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScatteringGeometry {
    /// observer to screen distance
    pub observer_screen_distance: f64,
    /// source to screen distance
    pub source_screen_distance: f64,
    /// wavelength the reference scales are given at
    pub reference_wavelength: f64,
    /// phase coherence length along the major axis at the reference wavelength
    pub r0_major: f64,
    /// phase coherence length along the minor axis at the reference wavelength
    pub r0_minor: f64,
    /// Fresnel scale at the reference wavelength
    pub fresnel_scale: f64,
    pub inner_scale: f64,
    pub outer_scale: f64,
    /// power-law index of the phase structure function
    pub power_law_index: f64,
    /// position angle of the screen major axis [degree]
    pub position_angle: f64,
}
impl Default for ScatteringGeometry {
    fn default() -> Self {
        Self {
            observer_screen_distance: 8.023e21,
            source_screen_distance: 1.790e22,
            reference_wavelength: 0.13,
            r0_major: 3.134e8,
            r0_minor: 6.415e8,
            fresnel_scale: 1.071e10,
            inner_scale: 1e8,
            outer_scale: 1e20,
            power_law_index: 5. / 3.,
            position_angle: SGRA_POSITION_ANGLE,
        }
    }
}
impl ScatteringGeometry {
    /// Sets the observer and source distances to the screen
    pub fn distances(self, observer_screen: f64, source_screen: f64) -> Self {
        Self {
            observer_screen_distance: observer_screen,
            source_screen_distance: source_screen,
            ..self
        }
    }
    /// Sets the inner and outer scales of the turbulence
    pub fn scales(self, inner: f64, outer: f64) -> Self {
        Self {
            inner_scale: inner,
            outer_scale: outer,
            ..self
        }
    }
    /// Sets the screen position angle [degree]
    pub fn position_angle(self, position_angle: f64) -> Self {
        Self {
            position_angle,
            ..self
        }
    }
    /// Screen magnification `D/R`
    pub fn magnification(&self) -> f64 {
        self.observer_screen_distance / self.source_screen_distance
    }
    /// Derives the scattering parameters for the observing frequency and field of view of `image`
    pub fn parameters(&self, image: &Image) -> ScatteringParameters {
        let wavelength = image.wavelength();
        let ratio = wavelength / self.reference_wavelength;
        let params = ScatteringParameters {
            wavelength,
            wavelength_bar: wavelength / (2. * std::f64::consts::PI),
            r0_major: self.r0_major / ratio,
            r0_minor: self.r0_minor / ratio,
            fresnel_scale: self.fresnel_scale * ratio.sqrt(),
            inner_scale: self.inner_scale,
            outer_scale: self.outer_scale,
            alpha: self.power_law_index,
            fov: image.psize() * image.xdim() as f64 * self.observer_screen_distance,
            position_angle: (90. - self.position_angle).to_radians(),
        };
        log::debug!("{params}");
        params
    }
}

/// Scattering parameters at a given wavelength
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatteringParameters {
    /// observing wavelength
    pub wavelength: f64,
    /// λ/2π
    pub wavelength_bar: f64,
    pub r0_major: f64,
    pub r0_minor: f64,
    pub fresnel_scale: f64,
    pub inner_scale: f64,
    pub outer_scale: f64,
    pub alpha: f64,
    /// field of view at the screen
    pub fov: f64,
    /// rotation from the image axes to the screen axes [rad]
    pub position_angle: f64,
}
impl std::fmt::Display for ScatteringParameters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "λ={:.4}cm, r0=({:.3e},{:.3e})cm, rF={:.3e}cm, FOV={:.3e}cm",
            self.wavelength, self.r0_major, self.r0_minor, self.fresnel_scale, self.fov
        )
    }
}
