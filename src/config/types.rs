use crate::config::validation::validate;
use crate::url::parse_seed_url;
use crate::GrabError;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Default maximum link depth from the seed
pub const DEFAULT_MAX_DEPTH: u32 = 3;

/// Default number of fetches allowed in flight at once
pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 10;

/// Default per-request timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Default identity header sent with every request
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Default output directory
pub const DEFAULT_OUTPUT_DIRECTORY: &str = "output";

/// Settings loaded from an optional TOML file
///
/// Every section and key has a default, so an empty file is valid.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub crawler: CrawlerSettings,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentSettings,
    #[serde(default)]
    pub output: OutputSettings,
}

/// Crawler behavior settings
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerSettings {
    /// Maximum depth to crawl from the seed URL
    #[serde(rename = "max-depth", default = "default_max_depth")]
    pub max_depth: u32,

    /// Maximum number of fetches in flight at any time
    #[serde(
        rename = "max-concurrent-fetches",
        default = "default_max_concurrent_fetches"
    )]
    pub max_concurrent_fetches: usize,

    /// Per-request timeout (seconds)
    #[serde(
        rename = "request-timeout-secs",
        default = "default_request_timeout_secs"
    )]
    pub request_timeout_secs: u64,
}

/// Request identity settings
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentSettings {
    /// Value of the User-Agent header
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,
}

/// Output settings
#[derive(Debug, Clone, Deserialize)]
pub struct OutputSettings {
    /// Root directory for mirrored files
    #[serde(default = "default_output_directory")]
    pub directory: String,
}

impl Default for CrawlerSettings {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            max_concurrent_fetches: default_max_concurrent_fetches(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for UserAgentSettings {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
        }
    }
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
        }
    }
}

fn default_max_depth() -> u32 {
    DEFAULT_MAX_DEPTH
}

fn default_max_concurrent_fetches() -> usize {
    DEFAULT_MAX_CONCURRENT_FETCHES
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_output_directory() -> String {
    DEFAULT_OUTPUT_DIRECTORY.to_string()
}

/// Configuration of a single crawl run
///
/// Built once before the run starts and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// The URL the crawl starts from (depth 0)
    pub seed_url: Url,

    /// Directory mirrored files are written under
    pub output_root: PathBuf,

    /// Tasks deeper than this are discarded without a fetch
    pub max_depth: u32,

    /// Upper bound on fetches in flight
    pub max_concurrent_fetches: usize,

    /// Timeout applied to every request
    pub request_timeout: Duration,

    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl CrawlConfig {
    /// Creates a run configuration with default limits
    ///
    /// # Arguments
    ///
    /// * `seed` - The seed URL as entered by the user
    /// * `output_root` - Directory to mirror into
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlConfig)` - The seed is a valid HTTP(S) URL
    /// * `Err(GrabError::InvalidSeed)` - The seed is empty or malformed
    ///
    /// # Example
    ///
    /// ```
    /// use webgrab::config::CrawlConfig;
    ///
    /// let config = CrawlConfig::new("https://example.com/", "mirror").unwrap();
    /// assert_eq!(config.max_depth, 3);
    /// assert_eq!(config.max_concurrent_fetches, 10);
    /// ```
    pub fn new(seed: &str, output_root: impl Into<PathBuf>) -> Result<Self, GrabError> {
        let mut settings = Settings::default();
        settings.output.directory = output_root.into().to_string_lossy().into_owned();
        Self::from_settings(seed, &settings)
    }

    /// Creates a run configuration from loaded settings
    ///
    /// The settings are validated before the seed is parsed.
    pub fn from_settings(seed: &str, settings: &Settings) -> Result<Self, GrabError> {
        validate(settings)?;
        let seed_url = parse_seed_url(seed)?;

        Ok(Self {
            seed_url,
            output_root: PathBuf::from(&settings.output.directory),
            max_depth: settings.crawler.max_depth,
            max_concurrent_fetches: settings.crawler.max_concurrent_fetches,
            request_timeout: Duration::from_secs(settings.crawler.request_timeout_secs),
            user_agent: settings.user_agent.user_agent.clone(),
        })
    }
}
