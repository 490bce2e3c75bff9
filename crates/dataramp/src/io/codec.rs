//! Artifact codecs.
//!
//! Both codecs write a `bincode` payload of the serde representation of the
//! model; `Joblib` additionally wraps it in a gzip stream. A file only
//! round-trips through the codec that wrote it.
use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Codec {
    /// Compressed payload, `.joblib`.
    #[default]
    Joblib,
    /// Plain payload, `.pickle`.
    Pickle,
}

impl Codec {
    pub const SUPPORTED: [Codec; 2] = [Codec::Joblib, Codec::Pickle];

    pub fn name(&self) -> &'static str {
        match self {
            Codec::Joblib => "joblib",
            Codec::Pickle => "pickle",
        }
    }

    /// File extension of artifacts written with this codec.
    pub fn extension(&self) -> &'static str {
        self.name()
    }

    pub fn supported_names() -> Vec<&'static str> {
        Codec::SUPPORTED.iter().map(|c| c.name()).collect()
    }

    /// `{name}.{extension}`
    pub fn file_name(&self, name: &str) -> String {
        format!("{}.{}", name, self.extension())
    }

    /// Infer the codec from an artifact's extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        ext.parse()
    }

    pub fn dump<M>(&self, model: &M, path: &Path) -> Result<()>
    where
        M: Serialize + ?Sized,
    {
        let mut writer = BufWriter::new(File::create(path)?);
        match self {
            Codec::Joblib => {
                let mut encoder = GzEncoder::new(&mut writer, Compression::default());
                bincode::serialize_into(&mut encoder, model)?;
                encoder.finish()?;
            }
            Codec::Pickle => bincode::serialize_into(&mut writer, model)?,
        }
        writer.flush()?;
        Ok(())
    }

    pub fn load<M: DeserializeOwned>(&self, path: &Path) -> Result<M> {
        let reader = BufReader::new(File::open(path)?);
        let model = match self {
            Codec::Joblib => bincode::deserialize_from(GzDecoder::new(reader))?,
            Codec::Pickle => bincode::deserialize_from(reader)?,
        };
        Ok(model)
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Codec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Codec::SUPPORTED
            .into_iter()
            .find(|c| c.name() == s.trim().to_lowercase())
            .ok_or_else(|| Error::UnsupportedCodec {
                requested: s.to_string(),
                supported: Codec::supported_names(),
            })
    }
}
