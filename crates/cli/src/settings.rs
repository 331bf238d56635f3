use anyhow::{Context, Result};
use chunkstream_chunker::{ChunkSize, DEFAULT_CHUNK_SIZE};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Config file picked up from the working directory when `--config` is absent
pub const CONFIG_FILE_NAME: &str = "chunkstream.toml";
pub const CHUNK_SIZE_ENV: &str = "CHUNKSTREAM_CHUNK_SIZE";
pub const PATH_ENV: &str = "CHUNKSTREAM_PATH";
pub const DEFAULT_JSON_PATH: &str = "results";

/// One source of settings. `None` defers to the next layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Layer {
    pub chunk_size: Option<i64>,
    pub path: Option<String>,
    pub pretty: Option<bool>,
}

impl Layer {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let chunk_size = lookup(CHUNK_SIZE_ENV)
            .map(|raw| {
                raw.trim()
                    .parse::<i64>()
                    .with_context(|| format!("{CHUNK_SIZE_ENV}={raw:?} is not an integer"))
            })
            .transpose()?;

        Ok(Self {
            chunk_size,
            path: lookup(PATH_ENV),
            pretty: None,
        })
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("Invalid config file")
    }

    /// Read `explicit`, or `./chunkstream.toml` if it exists, or nothing
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path,
            None if Path::new(CONFIG_FILE_NAME).is_file() => Path::new(CONFIG_FILE_NAME),
            None => return Ok(Self::default()),
        };
        log::debug!("loading config from {}", path.display());
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("In {}", path.display()))
    }
}

/// Effective settings after layering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub chunk_size: ChunkSize,
    pub json_path: String,
    pub pretty: bool,
}

impl Settings {
    /// Resolve `layers`, highest priority first; defaults fill the rest
    pub fn resolve(layers: &[&Layer]) -> Result<Self> {
        let chunk_size = first(layers, |layer| layer.chunk_size).unwrap_or(DEFAULT_CHUNK_SIZE as i64);

        Ok(Self {
            chunk_size: ChunkSize::try_from(chunk_size)?,
            json_path: first(layers, |layer| layer.path.clone())
                .unwrap_or_else(|| DEFAULT_JSON_PATH.to_string()),
            pretty: first(layers, |layer| layer.pretty).unwrap_or(false),
        })
    }
}

fn first<T>(layers: &[&Layer], pick: impl Fn(&Layer) -> Option<T>) -> Option<T> {
    layers.iter().find_map(|&layer| pick(layer))
}
