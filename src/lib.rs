/*!
# Stochastic optics

Refractive scattering of VLBI images by a thin, turbulent plasma screen.

An unscattered image is first blurred into its ensemble-average counterpart,
then a random phase screen with an anisotropic power-law spectrum is synthesized
and the instantaneous scattered image is obtained from the first-order
thin-screen perturbation:

```text
I_scatt = I_ea + r_F² (∇I_ea · ∇φ)
```

## Key Components

- [`ScreenBuilder`] / [`ScreenRealization`] - Hermitian random screens in the wavenumber domain
- [`PowerSpectrum`] - anisotropic von Kármán spectrum of the phase fluctuations
- [`PhaseScreen`] - real phase map synthesized from a realization
- [`Scatterer`] - the scattering pipeline
- [`periodic`] - wrap-around convolution and gradient

## Usage

```rust,no_run
use stochastic_optics::{Image, Scatterer, ScreenBuilder, RADPERUAS};

let image = Image::point_source(65, 2. * RADPERUAS, 230e9);
let screen = ScreenBuilder::default().from_seed(65, 65, Some(1))?;
let scattered = Scatterer::default().scatter(&image, Some(&screen))?;
println!("total flux: {}", scattered.image.total_flux());
# Ok::<(), stochastic_optics::Error>(())
```
*/

pub mod error;
pub mod fft;
pub mod geometry;
pub mod image;
pub mod kernel;
pub mod periodic;
pub mod phase;
pub mod scatter;
pub mod screen;
pub mod spectrum;

pub use error::{Error, Result};
pub use geometry::{ScatteringGeometry, ScatteringParameters};
pub use image::{Image, ImageError};
pub use kernel::{EnsembleBlur, GaussianKernel, SgraScattering};
pub use phase::{PhaseScreen, PhaseScreenError};
pub use scatter::{Scattered, Scatterer};
pub use screen::{signed_index, ScreenBuilder, ScreenError, ScreenRealization};
pub use spectrum::PowerSpectrum;

/// Speed of light [m/s]
pub const C: f64 = 299792458.0;
/// Radians per degree
pub const DEGREE: f64 = std::f64::consts::PI / 180.;
/// Radians per arcsecond
pub const RADPERAS: f64 = DEGREE / 3600.;
/// Radians per micro-arcsecond
pub const RADPERUAS: f64 = RADPERAS / 1e6;
/// Position angle of the Sgr A* scattering ellipse, east of north [degree]
pub const SGRA_POSITION_ANGLE: f64 = 78.;
