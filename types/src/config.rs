//! Layered configuration, assembled with `figment`: defaults baked into
//! `Default` impls, overridden by an optional TOML file, overridden again by
//! environment variables prefixed `PLAYBACK_`.

use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// `ffmpeg`-or-equivalent decoder invocation settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    pub path: PathBuf,
    pub hide_banner: bool,
    pub log_level: String,
    pub sample_format: String,
    pub channels: u16,
    pub sample_rate: u32,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("ffmpeg"),
            hide_banner: true,
            log_level: "error".to_string(),
            sample_format: "s16le".to_string(),
            channels: 2,
            sample_rate: 48_000,
        }
    }
}

/// `yt-dlp`-or-equivalent fetcher invocation settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    pub path: PathBuf,
    pub use_cookies: bool,
    pub cookies_from_browser: Option<String>,
    pub cookies_file: Option<PathBuf>,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("yt-dlp"),
            use_cookies: false,
            cookies_from_browser: None,
            cookies_file: None,
        }
    }
}

/// Resolver-side tuning; the resolver's own `site`/`id_pattern` live with the
/// resolver construction since they are not really "settings" a user edits,
/// they are how a concrete resolver is wired up.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    pub cache_ttl_secs: u64,
    pub max_concurrent_fetches: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: 6 * 60 * 60,
            max_concurrent_fetches: 4,
        }
    }
}

/// Which cache backend is wired up. Only `Memory` is constructible from this
/// crate; `Remote`/`Sqlite` describe the contract's shape for callers that
/// bring their own implementation — only the key-value contract is fixed for
/// those backends, not a concrete client.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum CacheConfig {
    Memory,
    Remote { connection: String },
    Sqlite { path: PathBuf },
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::Memory
    }
}

/// Playback loop tuning.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopConfig {
    pub queue_capacity: usize,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 256,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub decoder: DecoderConfig,
    pub fetcher: FetcherConfig,
    pub resolver: ResolverConfig,
    pub cache: CacheConfig,
    #[serde(rename = "loop")]
    pub loop_: LoopConfig,
}

impl PlayerConfig {
    /// Load defaults overlaid with an optional TOML file and `PLAYBACK_*`
    /// environment variables, in that precedence order.
    ///
    /// # Errors
    /// Returns [`ConfigError::Load`] if the TOML file exists but cannot be
    /// parsed, or if an env var can't coerce into its target field.
    pub fn load(toml_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = toml_path {
            if path.exists() {
                info!("loading configuration overrides from {}", path.display());
            } else {
                debug!("config file {} does not exist, using defaults", path.display());
            }
            figment = figment.merge(Toml::file(path));
        }
        figment = figment.merge(Env::prefixed("PLAYBACK_").split("_"));
        let config: Self = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    /// Returns [`ConfigError::EmptyPath`] if a required binary path is empty;
    /// this is fatal and prevents startup.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.decoder.path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyPath("decoder.path"));
        }
        if self.fetcher.path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyPath("fetcher.path"));
        }
        Ok(())
    }
}
