use crate::{image::ImageError, phase::PhaseScreenError, screen::ScreenError};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Error in the `screen` module")]
    Screen(#[from] ScreenError),
    #[error("Error in the `phase` module")]
    PhaseScreen(#[from] PhaseScreenError),
    #[error("Error in the `image` module")]
    Image(#[from] ImageError),
}
pub type Result<T> = std::result::Result<T, Error>;
