//! Scattered images of a point source
//!
//! Writes the ensemble-average image, the scattered image(s) and the phase
//! screen(s) as `.npy` files.

use anyhow::Context;
use indicatif::{ParallelProgressIterator, ProgressBar, ProgressStyle};
use rand::{rngs::StdRng, SeedableRng};
use rayon::prelude::*;
use std::{
    fs::{create_dir_all, File},
    io::BufWriter,
    path::{Path, PathBuf},
};
use stochastic_optics::{Image, ScatteringGeometry, Scatterer, ScreenBuilder, RADPERUAS};
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "scatter", about = "Refractive scattering of a point source")]
struct Opt {
    /// Image size in pixels (odd)
    #[structopt(short, long, default_value = "65")]
    size: usize,
    /// Pixel size [µas]
    #[structopt(short, long, default_value = "2")]
    pixel_size: f64,
    /// Observing frequency [GHz]
    #[structopt(short, long, default_value = "230")]
    frequency: f64,
    /// Random generator seed of the first screen, the next screens use the following seeds
    /// (wrapping around at 2⁶⁴, 0 is a valid seed); screens are unseeded if omitted
    #[structopt(long)]
    seed: Option<u64>,
    /// Number of screen realizations
    #[structopt(short = "n", long, default_value = "1")]
    realizations: usize,
    /// Keep the image shift induced by the screen
    #[structopt(long)]
    keep_linear_shift: bool,
    /// Replace negative pixels by their absolute value
    #[structopt(long)]
    clamp: bool,
    /// Scattering geometry JSON file
    #[structopt(short, long)]
    geometry: Option<PathBuf>,
    /// Output directory
    #[structopt(short, long, default_value = ".")]
    output: PathBuf,
}

fn write_npy(path: impl AsRef<Path>, image: &Image) -> anyhow::Result<()> {
    use npyz::WriterBuilder;
    let path = path.as_ref();
    let file = File::create(path).with_context(|| format!("failed to create {path:?}"))?;
    let mut writer: npyz::NpyWriter<f64, _> = npyz::WriteOptions::new()
        .default_dtype()
        .shape(&[image.ydim() as u64, image.xdim() as u64])
        .writer(BufWriter::new(file))
        .begin_nd()?;
    writer.extend(image.imvec())?;
    writer.finish()?;
    Ok(())
}

/// Random generator of the `i`th screen realization
fn realization_rng(seed: Option<u64>, i: usize) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(i as u64)),
        None => StdRng::from_entropy(),
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opt = Opt::from_args();

    let geometry = match &opt.geometry {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("failed to open {path:?}"))?;
            serde_json::from_reader(file)?
        }
        None => ScatteringGeometry::default(),
    };
    log::info!("{:?}", geometry);

    let image = Image::point_source(opt.size, opt.pixel_size * RADPERUAS, opt.frequency * 1e9);
    let scatterer = Scatterer::new(geometry).clamp_negative_flux(opt.clamp);
    let builder = ScreenBuilder::default().suppress_linear_shift(!opt.keep_linear_shift);

    create_dir_all(&opt.output)?;
    let ensemble_average = scatterer.ensemble_average(&image);
    write_npy(opt.output.join("ensemble_average.npy"), &ensemble_average)?;

    let pb = ProgressBar::new(opt.realizations as u64);
    pb.set_style(ProgressStyle::default_bar().template("{bar:40} {pos}/{len} [{elapsed}]")?);
    let n = opt.size;
    (0..opt.realizations)
        .into_par_iter()
        .progress_with(pb)
        .try_for_each(|i| -> anyhow::Result<()> {
            let screen = builder.from_random(n, n, &mut realization_rng(opt.seed, i))?;
            let scattered = scatterer.perturb(&image, ensemble_average.clone(), &screen)?;
            let suffix = if opt.realizations > 1 {
                format!("_{i:04}")
            } else {
                String::new()
            };
            write_npy(
                opt.output.join(format!("scattered{suffix}.npy")),
                &scattered.image,
            )?;
            if let Some(phase) = &scattered.phase {
                write_npy(opt.output.join(format!("phase{suffix}.npy")), phase.image())?;
            }
            Ok(())
        })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    fn first_draw(seed: Option<u64>, i: usize) -> u64 {
        realization_rng(seed, i).gen()
    }

    #[test]
    fn seeds_follow_the_realization_index() {
        assert_eq!(first_draw(Some(10), 3), first_draw(Some(13), 0));
        assert_ne!(first_draw(Some(10), 0), first_draw(Some(10), 1));
    }

    #[test]
    fn seeds_wrap_around() {
        assert_eq!(first_draw(Some(u64::MAX), 1), first_draw(Some(0), 0));
        assert_eq!(first_draw(Some(u64::MAX - 1), 3), first_draw(Some(1), 0));
    }

    #[test]
    fn zero_seed_is_deterministic() {
        assert_eq!(first_draw(Some(0), 0), first_draw(Some(0), 0));
        assert_ne!(first_draw(None, 0), first_draw(None, 0));
    }
}
