//! Loading and saving images.
//!
//! A [`Loader`] binds an engine to the load-time configuration (whether to
//! autorotate from EXIF). It replaces process-wide state: build one at startup
//! from [`Config`](crate::config::Config) and pass it where images are loaded.
//! Each call can still override autorotation through [`LoadOptions`].
//!
//! In-memory data is bridged to the path-based engine through a scoped temp
//! file that is deleted when the call returns, on success or failure.

use super::backend::PixelEngine;
use super::format::{ensure_path_is_writable, resolve_save_format, DEFAULT_FORMAT};
use super::image::Image;
use super::orientation::apply_autorotate;
use super::params::{resolve_quality, LoadOptions, SaveOptions};
use super::rust_backend::RustEngine;
use crate::config::Config;
use crate::error::{Error, Result};
use std::io::{Read, Seek, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// Entry point for loading images.
#[derive(Debug, Clone, Default)]
pub struct Loader<E: PixelEngine = RustEngine> {
    engine: E,
    autorotate: bool,
}

impl Loader<RustEngine> {
    /// Loader using [`RustEngine`] and the given configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(RustEngine::new(), config)
    }
}

impl<E: PixelEngine> Loader<E> {
    pub fn new(engine: E, config: &Config) -> Self {
        Self {
            engine,
            autorotate: config.autorotate,
        }
    }

    /// Autorotation default for calls that don't override it.
    pub fn autorotate(&self) -> bool {
        self.autorotate
    }

    pub fn set_autorotate(&mut self, value: bool) {
        self.autorotate = value;
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Decode the file at `path`.
    pub fn load(&self, path: impl AsRef<Path>, options: LoadOptions) -> Result<Image<E>> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        if !path.is_file() {
            return Err(Error::Decode(format!("{} is not a file", path.display())));
        }
        let decoded = self.engine.decode(path)?;
        let mut image = Image::from_decoded(self.engine.clone(), decoded);
        if image.width() == 0 || image.height() == 0 {
            return Err(Error::Decode(format!(
                "{} decoded to an empty image",
                path.display()
            )));
        }
        debug!("Loaded {} as {:?}", path.display(), image);

        if options.autorotate.unwrap_or(self.autorotate) {
            apply_autorotate(&mut image, path);
        }
        Ok(image)
    }

    /// Alias of [`load`](Self::load).
    pub fn open(&self, path: impl AsRef<Path>, options: LoadOptions) -> Result<Image<E>> {
        self.load(path, options)
    }

    /// Decode in-memory data. The codec is identified from the content.
    pub fn load_data(&self, data: &[u8], options: LoadOptions) -> Result<Image<E>> {
        let format = self.engine.identify(data).ok_or(Error::UnrecognizedFormat)?;
        let mut file = temp_file(&format)?;
        file.write_all(data)?;
        file.flush()?;
        self.load(file.path(), options)
    }
}

impl Image<RustEngine> {
    /// Load with [`RustEngine`] and default configuration.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Loader::from_config(&Config::default()).load(path, LoadOptions::default())
    }
}

impl<E: PixelEngine> Image<E> {
    /// Encode to `path`. See [`format`](super::format) for how the codec is picked.
    pub fn save(&self, path: impl AsRef<Path>, options: &SaveOptions) -> Result<()> {
        let path = path.as_ref();
        let format =
            resolve_save_format(options.format.as_deref(), Some(path), self.raw_format());
        let quality = resolve_quality(options.quality)?;
        ensure_path_is_writable(path)?;
        debug!(
            "Saving {:?} to {} as {} (quality {:?})",
            self,
            path.display(),
            format,
            quality.map(|q| q.value())
        );
        self.engine().encode(self.raster(), path, &format, quality)?;
        Ok(())
    }

    /// Encode to a byte vector.
    pub fn save_data(&self, options: &SaveOptions) -> Result<Vec<u8>> {
        let format = options
            .format
            .clone()
            .filter(|f| !f.is_empty())
            .or_else(|| self.raw_format().map(str::to_string))
            .unwrap_or_else(|| DEFAULT_FORMAT.to_string());
        let mut file = temp_file(&format)?;
        self.save(
            file.path(),
            &SaveOptions {
                format: Some(format),
                quality: options.quality,
            },
        )?;
        let mut data = Vec::new();
        file.rewind()?;
        file.read_to_end(&mut data)?;
        Ok(data)
    }
}

fn temp_file(format: &str) -> Result<NamedTempFile> {
    Ok(tempfile::Builder::new()
        .prefix("pixmill")
        .suffix(&format!(".{format}"))
        .tempfile()?)
}
