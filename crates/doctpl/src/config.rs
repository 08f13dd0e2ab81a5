//! Layered configuration.
//!
//! `defaults/doctpl.default.toml` is embedded into the binary. [`load`]
//! layers one user file and the command-line overrides on top of it before
//! deserializing into [`DoctplConfig`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;
use config::{Config, ConfigError, File, FileFormat};
use doctpl_convert::{OfficeConverter, PdftoppmThumbnailer, Tool};
use doctpl_render::{Engine, EngineConfig, LexiconAnalyzer};
use serde::Deserialize;

const DEFAULT_TOML: &str = include_str!("../defaults/doctpl.default.toml");

/// File picked up from the working directory when `--config` is not given.
pub const LOCAL_CONFIG: &str = "doctpl.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct DoctplConfig {
    pub engine: EngineConfig,
    #[serde(default)]
    pub lexicon: LexiconConfig,
    pub convert: ConvertConfig,
    pub thumbnail: ThumbnailConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LexiconConfig {
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConvertConfig {
    pub command: Vec<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ThumbnailConfig {
    pub command: Vec<String>,
    pub width: u32,
    pub height: u32,
    pub timeout_secs: u64,
}

impl DoctplConfig {
    /// An engine for this configuration, with the lexicon loaded if one is
    /// configured.
    pub fn engine(&self) -> anyhow::Result<Engine> {
        let engine = Engine::new(self.engine.clone());
        match &self.lexicon.path {
            Some(path) => {
                let lexicon = LexiconAnalyzer::from_path(path)
                    .with_context(|| format!("cannot load lexicon {}", path.display()))?;
                log::info!("loaded {} lexicon entries from {}", lexicon.len(), path.display());
                Ok(engine.with_analyzer(lexicon))
            }
            None => Ok(engine),
        }
    }

    pub fn office_converter(&self) -> anyhow::Result<OfficeConverter> {
        let tool = Tool::from_argv(self.convert.command.iter().cloned(), "convert.command")?;
        Ok(OfficeConverter::new()
            .with_tool(tool)
            .with_timeout(timeout(self.convert.timeout_secs)))
    }

    pub fn thumbnailer(&self) -> anyhow::Result<PdftoppmThumbnailer> {
        let tool = Tool::from_argv(self.thumbnail.command.iter().cloned(), "thumbnail.command")?;
        Ok(PdftoppmThumbnailer::new()
            .with_tool(tool)
            .with_timeout(timeout(self.thumbnail.timeout_secs)))
    }
}

/// Zero disables the timeout.
fn timeout(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

/// Builds the configuration, lowest precedence first:
///
/// 1. the embedded defaults;
/// 2. `file`, which must exist, or else [`LOCAL_CONFIG`] in the working
///    directory when there is one;
/// 3. `overrides`, as dotted `key = value` pairs such as
///    `("engine.highlight", "green")`.
pub fn load(file: Option<&Path>, overrides: &[(&str, &str)]) -> Result<DoctplConfig, ConfigError> {
    let user = match file {
        Some(path) => File::from(path).required(true),
        None => File::from(Path::new(LOCAL_CONFIG)).required(false),
    };
    let mut builder = Config::builder()
        .add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml))
        .add_source(user.format(FileFormat::Toml));
    for (key, value) in overrides {
        builder = builder.set_override(*key, *value)?;
    }
    let config: DoctplConfig = builder.build()?.try_deserialize()?;
    log::debug!("configuration: {config:?}");
    Ok(config)
}
