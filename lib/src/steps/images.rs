use std::fs;
use std::io::Cursor;
use std::path::Path;
use std::time::SystemTime;

use derive_more::Debug;
use image::{ImageEncoder, ImageFormat};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use parking_lot::Mutex;
use rayon::prelude::*;

use crate::error::{Result, Chainable};
use crate::task::{self, Ctx, Task};
use crate::util;

pub const JPEG_QUALITY: u8 = 82;

/// Turns an image file's bytes into the bytes that get published.
pub trait Compressor: Send + Sync {
    fn compress(&self, path: &Path, bytes: Vec<u8>) -> Result<Vec<u8>>;
}

/// Lossless PNG recompression and quality-82 JPEG re-encoding. GIF, SVG and
/// anything that fails to decode are passed through untouched, as is any
/// re-encoding that turns out larger than the original.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageOptimizer;

impl ImageOptimizer {
    fn reencode(&self, format: ImageFormat, bytes: &[u8]) -> Result<Option<Vec<u8>>> {
        let image = match image::load_from_memory_with_format(bytes, format) {
            Ok(image) => image,
            Err(e) => {
                tracing::debug!("not re-encoding undecodable image: {e}");
                return Ok(None);
            }
        };

        let mut output = vec![];
        match format {
            ImageFormat::Png => {
                let encoder = PngEncoder::new_with_quality(
                    Cursor::new(&mut output),
                    CompressionType::Best,
                    FilterType::Adaptive,
                );

                encoder.write_image(image.as_bytes(), image.width(), image.height(), image.color())?;
            }
            ImageFormat::Jpeg => {
                let rgb = image.to_rgb8();
                let encoder = JpegEncoder::new_with_quality(Cursor::new(&mut output), JPEG_QUALITY);
                encoder.write_image(rgb.as_raw(), rgb.width(), rgb.height(), image::ColorType::Rgb8)?;
            }
            _ => return Ok(None),
        }

        Ok(Some(output))
    }
}

impl Compressor for ImageOptimizer {
    fn compress(&self, path: &Path, bytes: Vec<u8>) -> Result<Vec<u8>> {
        let format = match ImageFormat::from_path(path) {
            Ok(format @ (ImageFormat::Png | ImageFormat::Jpeg)) => format,
            _ => return Ok(bytes),
        };

        match self.reencode(format, &bytes)? {
            Some(smaller) if smaller.len() < bytes.len() => Ok(smaller),
            _ => Ok(bytes),
        }
    }
}

/// Compresses changed images into the image output directory.
///
/// Only files modified after the start of the last successful run are
/// processed; the first run processes everything. The timestamp lives in
/// memory for as long as the step does.
#[derive(Debug)]
pub struct Images<C = ImageOptimizer> {
    #[debug(ignore)]
    compressor: C,
    last_run: Mutex<Option<SystemTime>>,
}

impl Default for Images {
    fn default() -> Self {
        Images::new(ImageOptimizer)
    }
}

impl<C: Compressor> Images<C> {
    pub fn new(compressor: C) -> Self {
        Images { compressor, last_run: Mutex::new(None) }
    }

    pub fn compressor(&self) -> &C {
        &self.compressor
    }

    pub fn last_run(&self) -> Option<SystemTime> {
        *self.last_run.lock()
    }

    fn process(&self, entry: &crate::fileset::Entry, output: &Path) -> Result<()> {
        let bytes = fs::read(&entry.path).chain_with(|| error! {
            "failed to read image",
            "path" => entry.path.display(),
        })?;

        let before = bytes.len();
        let bytes = self.compressor.compress(&entry.path, bytes).chain_with(|| error! {
            "failed to compress image",
            "path" => entry.path.display(),
        })?;

        tracing::debug!(path = %entry.relative.display(), before, after = bytes.len(), "image");
        util::write(output.join(&entry.relative), bytes)
    }
}

impl<C: Compressor> Task for Images<C> {
    fn name(&self) -> &'static str {
        "images"
    }

    fn run(&self, ctx: &Ctx<'_>) -> Result<()> {
        let spec = &ctx.config.paths.images;
        let output = ctx.path(&spec.output);
        let since = self.last_run();
        let started = SystemTime::now();
        let changed: Vec<_> = spec.selector()?
            .collect(ctx.root)?
            .into_iter()
            .filter(|entry| entry.modified_after(since))
            .collect();

        changed.par_iter()
            .map(|entry| self.process(entry, &output))
            .collect::<Vec<_>>()
            .into_iter()
            .fold(Ok(()), task::join)?;

        tracing::debug!("processed {} changed image(s)", changed.len());
        *self.last_run.lock() = Some(started);
        Ok(())
    }
}
