use std::fs;
use std::path::Path;

use crate::error::{ErrorDetail, Result, Chainable};

/// Something that can be read as text: a file on disk or an in-memory string.
pub trait Source: std::fmt::Debug {
    fn read(&self) -> Result<String>;

    fn path(&self) -> Option<&Path> {
        None
    }
}

impl Source for &Path {
    fn read(&self) -> Result<String> {
        fs::read_to_string(self).chain(error! {
            "failed to open file for reading",
            "file path" => self.display()
        })
    }

    fn path(&self) -> Option<&Path> {
        Some(self)
    }
}

impl Source for &str {
    fn read(&self) -> Result<String> {
        Ok(self.to_string())
    }
}

/// A transformation from a source to some output, typically text.
pub trait Mapper {
    type Output;

    fn map<I: Source>(&self, input: I) -> Result<Self::Output>;
}

pub trait Format: Sized {
    /// The data format's error type.
    type Error: serde::de::Error + ErrorDetail + 'static;

    /// Parses `string` as the data format `Self` as a `T` or returns an error
    /// if the `string` is an invalid `T`.
    fn from_str<T: serde::de::DeserializeOwned>(string: &str) -> Result<T, Self::Error>;

    fn read<I: Source, T: serde::de::DeserializeOwned>(input: I) -> Result<T> {
        let input = input.read()?;
        Ok(Self::from_str(&input)?)
    }
}

macro_rules! impl_format {
    ($name:ident : $func:expr, $E:ty) => (
        pub struct $name;

        impl Format for $name {
            type Error = $E;

            fn from_str<T: serde::de::DeserializeOwned>(s: &str) -> Result<T, $E> {
                $func(s)
            }
        }
    );
}

impl_format!(Toml: toml::from_str, toml::de::Error);
impl_format!(Json: serde_json::from_str, serde_json::error::Error);

/// The Sass compiler.
#[cfg(feature = "sass")]
#[derive(Debug, Default)]
pub struct Grass {
    options: grass::Options<'static>,
}

#[cfg(feature = "sass")]
impl Mapper for Grass {
    type Output = String;

    fn map<I: Source>(&self, input: I) -> Result<Self::Output> {
        let result = match input.path() {
            Some(path) => grass::from_path(path, &self.options),
            None => grass::from_string(input.read()?, &self.options),
        };

        result.map_err(|e| error!("failed to render sass as css", e))
    }
}
