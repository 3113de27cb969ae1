//! Image container with its observing metadata

use nalgebra::DMatrix;

#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("image vector has {found} pixels, expected {xdim}x{ydim}")]
    ShapeMismatch {
        xdim: usize,
        ydim: usize,
        found: usize,
    },
}
type Result<T> = std::result::Result<T, ImageError>;

/// Total intensity image
///
/// Pixels are stored as a `(ydim, xdim)` matrix, row 0 at the top (north) and
/// column 0 on the left (east).
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pixels: DMatrix<f64>,
    /// pixel angular size [rad]
    psize: f64,
    /// right ascension [hour]
    ra: f64,
    /// declination [degree]
    dec: f64,
    /// observing frequency [Hz]
    rf: f64,
    source: String,
    mjd: f64,
}
impl Image {
    /// Creates a new image from the pixels, the pixel size [rad] and the observing frequency [Hz]
    pub fn new(pixels: DMatrix<f64>, psize: f64, rf: f64) -> Self {
        Self {
            pixels,
            psize,
            ra: 0.,
            dec: 0.,
            rf,
            source: String::from("SgrA"),
            mjd: 0.,
        }
    }
    /// Creates a new image from a row-major pixel vector
    pub fn from_imvec(
        imvec: &[f64],
        xdim: usize,
        ydim: usize,
        psize: f64,
        rf: f64,
    ) -> Result<Self> {
        if imvec.len() != xdim * ydim {
            return Err(ImageError::ShapeMismatch {
                xdim,
                ydim,
                found: imvec.len(),
            });
        }
        Ok(Self::new(
            DMatrix::from_row_slice(ydim, xdim, imvec),
            psize,
            rf,
        ))
    }
    /// Unit flux point source at the center of a `n`x`n` image
    pub fn point_source(n: usize, psize: f64, rf: f64) -> Self {
        let mut pixels = DMatrix::zeros(n, n);
        if n > 0 {
            pixels[(n / 2, n / 2)] = 1.;
        }
        Self::new(pixels, psize, rf)
    }
    /// Sets the source coordinates
    pub fn ra_dec(self, ra: f64, dec: f64) -> Self {
        Self { ra, dec, ..self }
    }
    /// Sets the source name
    pub fn source(self, value: impl ToString) -> Self {
        Self {
            source: value.to_string(),
            ..self
        }
    }
    /// Sets the observation epoch
    pub fn mjd(self, mjd: f64) -> Self {
        Self { mjd, ..self }
    }
    /// Returns a new image with the same metadata but different pixels
    pub fn with_pixels(&self, pixels: DMatrix<f64>) -> Self {
        Self {
            pixels,
            psize: self.psize,
            ra: self.ra,
            dec: self.dec,
            rf: self.rf,
            source: self.source.clone(),
            mjd: self.mjd,
        }
    }
    pub fn pixels(&self) -> &DMatrix<f64> {
        &self.pixels
    }
    pub fn into_pixels(self) -> DMatrix<f64> {
        self.pixels
    }
    /// Row-major pixel vector
    pub fn imvec(&self) -> Vec<f64> {
        self.pixels.transpose().as_slice().to_vec()
    }
    pub fn xdim(&self) -> usize {
        self.pixels.ncols()
    }
    pub fn ydim(&self) -> usize {
        self.pixels.nrows()
    }
    /// `(ydim, xdim)`
    pub fn shape(&self) -> (usize, usize) {
        self.pixels.shape()
    }
    pub fn psize(&self) -> f64 {
        self.psize
    }
    pub fn ra(&self) -> f64 {
        self.ra
    }
    pub fn dec(&self) -> f64 {
        self.dec
    }
    pub fn frequency(&self) -> f64 {
        self.rf
    }
    pub fn source_name(&self) -> &str {
        &self.source
    }
    pub fn epoch(&self) -> f64 {
        self.mjd
    }
    /// Observing wavelength [cm]
    pub fn wavelength(&self) -> f64 {
        crate::C / self.rf * 100.
    }
    pub fn total_flux(&self) -> f64 {
        self.pixels.sum()
    }
}
