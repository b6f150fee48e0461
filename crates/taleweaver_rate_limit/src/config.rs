//! Layered service configuration.
//!
//! Sources, later ones overriding earlier ones:
//! - Bundled defaults (include_str! from taleweaver.toml)
//! - ~/.config/taleweaver/taleweaver.toml
//! - ./taleweaver.toml
//! - An explicit file passed on the command line
//! - `TALEWEAVER__SECTION__KEY` environment variables

use crate::ProviderLimits;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use taleweaver_error::{ConfigError, TaleweaverResult};
use tracing::{debug, instrument};

const DEFAULT_CONFIG: &str = include_str!("../../../taleweaver.toml");

/// HTTP listener and logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,
    /// Bind port
    pub port: u16,
    /// Base used to build absolute asset URLs
    pub public_base_url: String,
    /// Default tracing filter when `RUST_LOG` is unset
    pub log_level: String,
    /// Emit JSON log lines
    pub json_logs: bool,
    /// Maximum accepted request body
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            public_base_url: "http://localhost:5000".to_string(),
            log_level: "info".to_string(),
            json_logs: false,
            body_limit_bytes: 10 * 1024 * 1024,
        }
    }
}

/// Asset storage location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding `audio/` and `images/`
    pub root: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("public"),
        }
    }
}

/// Story build tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Pages built in parallel within one story
    pub page_concurrency: usize,
    /// Jobs kept in memory
    pub max_jobs: usize,
    /// Age after which finished jobs are dropped
    pub job_ttl_secs: u64,
    /// Default illustration style
    pub art_style: String,
    /// Default illustration aspect ratio
    pub aspect_ratio: String,
    /// Illustration width in pixels
    pub image_width: u32,
    /// Illustration height in pixels
    pub image_height: u32,
}

impl PipelineConfig {
    /// Finished job retention as a duration.
    pub fn job_ttl(&self) -> Duration {
        Duration::from_secs(self.job_ttl_secs)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            page_concurrency: 1,
            max_jobs: 200,
            job_ttl_secs: 6 * 60 * 60,
            art_style: "storybook".to_string(),
            aspect_ratio: "3:2".to_string(),
            image_width: 1536,
            image_height: 1024,
        }
    }
}

/// Switches for optional surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureFlags {
    /// Page narration and speech synthesis
    pub audio: bool,
    /// Illustrations
    pub images: bool,
    /// Synchronous bundle endpoint
    pub bundle: bool,
    /// Direct speech endpoints (narrate, voices)
    pub speech_endpoints: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            audio: true,
            images: true,
            bundle: true,
            speech_endpoints: true,
        }
    }
}

/// Voice catalog source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoicesConfig {
    /// TOML catalog replacing the bundled one
    pub catalog_path: Option<PathBuf>,
}

/// One upstream provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Endpoint base URL
    pub base_url: String,
    /// Model name sent upstream
    pub model: String,
    /// Sampling temperature, text providers only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Requests per minute
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rpm: Option<u32>,
    /// Calls in flight at once
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_concurrent: Option<u32>,
    /// Per-call deadline
    pub timeout_secs: u64,
    /// Retries after the first attempt
    pub max_retries: usize,
    /// Overrides the error-specific initial backoff
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_backoff_ms: Option<u64>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            model: String::new(),
            temperature: None,
            rpm: None,
            max_concurrent: None,
            timeout_secs: 60,
            max_retries: 2,
            initial_backoff_ms: None,
        }
    }
}

impl ProviderConfig {
    /// Limiter settings for this provider.
    pub fn limits(&self) -> ProviderLimits {
        ProviderLimits {
            rpm: self.rpm,
            max_concurrent: self.max_concurrent,
            timeout: Duration::from_secs(self.timeout_secs),
            max_retries: self.max_retries,
            initial_backoff_ms: self.initial_backoff_ms,
        }
    }
}

/// The three upstream providers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    /// Story text generation
    pub openai: ProviderConfig,
    /// Speech, sound effects and voice cloning
    pub elevenlabs: ProviderConfig,
    /// Illustrations
    pub runware: ProviderConfig,
}

/// Top-level Taleweaver configuration.
///
/// # Example
///
/// ```no_run
/// use taleweaver_rate_limit::TaleweaverConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = TaleweaverConfig::load()?;
/// println!("listening on {}:{}", config.server.host, config.server.port);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaleweaverConfig {
    /// HTTP listener
    pub server: ServerConfig,
    /// Asset storage
    pub storage: StorageConfig,
    /// Build tuning
    pub pipeline: PipelineConfig,
    /// Optional surfaces
    pub features: FeatureFlags,
    /// Voice catalog
    pub voices: VoicesConfig,
    /// Upstream providers
    pub providers: ProvidersConfig,
}

impl TaleweaverConfig {
    /// The bundled defaults alone.
    pub fn bundled() -> TaleweaverResult<Self> {
        Self::build(Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml)))
    }

    /// Bundled defaults overridden by a single file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> TaleweaverResult<Self> {
        debug!("Loading configuration from file");
        Self::build(
            Config::builder()
                .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
                .add_source(File::from(path.as_ref())),
        )
    }

    /// Load every layer with no explicit file.
    pub fn load() -> TaleweaverResult<Self> {
        Self::load_with(None)
    }

    /// Load every layer, with `explicit` applied after the user files.
    ///
    /// User files are optional and skipped when missing; an explicit file
    /// must exist.
    #[instrument(skip(explicit), fields(explicit = ?explicit.map(Path::display)))]
    pub fn load_with(explicit: Option<&Path>) -> TaleweaverResult<Self> {
        debug!("Loading configuration: env > explicit > current dir > home dir > bundled");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/taleweaver/taleweaver.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder.add_source(File::with_name("taleweaver").required(false));

        if let Some(path) = explicit {
            builder = builder.add_source(File::from(path));
        }

        builder = builder.add_source(
            Environment::with_prefix("TALEWEAVER")
                .separator("__")
                .try_parsing(true),
        );

        Self::build(builder)
    }

    fn build(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> TaleweaverResult<Self> {
        let config: Self = builder
            .build()
            .map_err(|e| ConfigError::new(format!("Failed to build configuration: {}", e)))?
            .try_deserialize()
            .map_err(|e| ConfigError::new(format!("Failed to parse configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the service cannot run with.
    pub fn validate(&self) -> TaleweaverResult<()> {
        if self.pipeline.page_concurrency == 0 {
            return Err(ConfigError::new("pipeline.page_concurrency must be at least 1").into());
        }
        if self.pipeline.max_jobs == 0 {
            return Err(ConfigError::new("pipeline.max_jobs must be at least 1").into());
        }
        for (name, provider) in [
            ("openai", &self.providers.openai),
            ("elevenlabs", &self.providers.elevenlabs),
            ("runware", &self.providers.runware),
        ] {
            if provider.base_url.trim().is_empty() {
                return Err(
                    ConfigError::new(format!("providers.{}.base_url is empty", name)).into(),
                );
            }
            if provider.timeout_secs == 0 {
                return Err(
                    ConfigError::new(format!("providers.{}.timeout_secs must be positive", name))
                        .into(),
                );
            }
        }
        Ok(())
    }
}
