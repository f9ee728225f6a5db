use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Placeholder substituted with the page index in URL templates
pub const PAGE_PLACEHOLDER: &str = "{page}";

/// Desktop Chrome identifier sent when no user agent is configured
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/109.0.0.0 Safari/537.36";

/// Maps a listing page index to the absolute URL of that page
#[derive(Clone)]
pub struct PageUrlGenerator(Arc<dyn Fn(i64) -> String + Send + Sync>);

impl PageUrlGenerator {
    /// Wrap an arbitrary index-to-URL function
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(i64) -> String + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Build a generator from a template such as `https://site/page/{page}/`
    pub fn from_template(template: &str) -> Result<Self, ConfigError> {
        if !template.contains(PAGE_PLACEHOLDER) {
            return Err(ConfigError::MissingPlaceholder(template.to_string()));
        }
        let template = template.to_string();
        Ok(Self::from_fn(move |page_index| {
            template.replace(PAGE_PLACEHOLDER, &page_index.to_string())
        }))
    }

    /// Compute the listing URL for one page index
    pub fn generate(&self, page_index: i64) -> String {
        (self.0)(page_index)
    }
}

impl fmt::Debug for PageUrlGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PageUrlGenerator(..)")
    }
}

/// What the listing walker does when a listing page cannot be read
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingFailurePolicy {
    /// Log the page, record it as skipped and continue with the next index
    #[default]
    Skip,
    /// Abort the whole run on the first failing listing page
    FailFast,
}

/// Immutable settings for one pipeline run
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub page_url_generator: PageUrlGenerator,
    pub minimum_page_index: i64,
    pub maximum_page_index: i64,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub user_agent: String,

    /// Marker present on a loaded listing page; matching anchors are detail links
    pub listing_selector: String,

    /// Download link selectors, most preferred first
    pub detail_selectors: Vec<String>,

    pub listing_timeout: Duration,
    pub detail_timeout: Duration,
    pub listing_failure_policy: ListingFailurePolicy,
    pub output_path: PathBuf,
    pub webdriver_url: String,
    pub headless: bool,
}

impl PipelineConfig {
    /// Start building a configuration around the required URL generator
    pub fn builder(page_url_generator: PageUrlGenerator) -> PipelineConfigBuilder {
        PipelineConfigBuilder {
            config: Self {
                page_url_generator,
                minimum_page_index: default_minimum_page_index(),
                maximum_page_index: default_maximum_page_index(),
                viewport_width: default_viewport_width(),
                viewport_height: default_viewport_height(),
                user_agent: default_user_agent(),
                listing_selector: default_listing_selector(),
                detail_selectors: default_detail_selectors(),
                listing_timeout: Duration::from_millis(default_listing_timeout_ms()),
                detail_timeout: Duration::from_millis(default_detail_timeout_ms()),
                listing_failure_policy: ListingFailurePolicy::default(),
                output_path: default_output_path(),
                webdriver_url: default_webdriver_url(),
                headless: true,
            },
        }
    }

    /// Inclusive page index range; empty when min > max
    pub fn page_range(&self) -> RangeInclusive<i64> {
        self.minimum_page_index..=self.maximum_page_index
    }

    /// Selector matching any of the detail alternatives
    pub fn combined_detail_selector(&self) -> String {
        self.detail_selectors.join(", ")
    }
}

/// Builder for [`PipelineConfig`]
#[derive(Debug, Clone)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    pub fn with_page_range(mut self, minimum: i64, maximum: i64) -> Self {
        self.config.minimum_page_index = minimum;
        self.config.maximum_page_index = maximum;
        self
    }

    pub fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.config.viewport_width = width;
        self.config.viewport_height = height;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    pub fn with_listing_selector(mut self, selector: impl Into<String>) -> Self {
        self.config.listing_selector = selector.into();
        self
    }

    pub fn with_detail_selectors<I, S>(mut self, selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.detail_selectors = selectors.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_listing_timeout(mut self, timeout: Duration) -> Self {
        self.config.listing_timeout = timeout;
        self
    }

    pub fn with_detail_timeout(mut self, timeout: Duration) -> Self {
        self.config.detail_timeout = timeout;
        self
    }

    pub fn with_listing_failure_policy(mut self, policy: ListingFailurePolicy) -> Self {
        self.config.listing_failure_policy = policy;
        self
    }

    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.output_path = path.into();
        self
    }

    pub fn with_webdriver_url(mut self, url: impl Into<String>) -> Self {
        self.config.webdriver_url = url.into();
        self
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.config.headless = headless;
        self
    }

    /// Validate and return the finished configuration
    pub fn build(self) -> Result<PipelineConfig, ConfigError> {
        let config = self.config;
        if config.listing_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout("listing"));
        }
        if config.detail_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout("detail"));
        }
        if config.detail_selectors.is_empty() {
            return Err(ConfigError::NoDetailSelectors);
        }
        Ok(config)
    }
}

/// JSON form of the pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineFileConfig {
    /// Listing URL with a `{page}` placeholder
    pub url_template: String,

    #[serde(default = "default_minimum_page_index")]
    pub minimum_page_index: i64,

    #[serde(default = "default_maximum_page_index")]
    pub maximum_page_index: i64,

    #[serde(default = "default_viewport_width")]
    pub viewport_width: u32,

    #[serde(default = "default_viewport_height")]
    pub viewport_height: u32,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_listing_selector")]
    pub listing_selector: String,

    #[serde(default = "default_detail_selectors")]
    pub detail_selectors: Vec<String>,

    #[serde(default = "default_listing_timeout_ms")]
    pub listing_timeout_ms: u64,

    #[serde(default = "default_detail_timeout_ms")]
    pub detail_timeout_ms: u64,

    #[serde(default)]
    pub listing_failure_policy: ListingFailurePolicy,

    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,

    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    #[serde(default = "default_headless")]
    pub headless: bool,
}

impl PipelineFileConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&contents)
    }

    /// Parse configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Minimal file config for a template, all other fields defaulted
    pub fn new(url_template: impl Into<String>) -> Self {
        Self {
            url_template: url_template.into(),
            minimum_page_index: default_minimum_page_index(),
            maximum_page_index: default_maximum_page_index(),
            viewport_width: default_viewport_width(),
            viewport_height: default_viewport_height(),
            user_agent: default_user_agent(),
            listing_selector: default_listing_selector(),
            detail_selectors: default_detail_selectors(),
            listing_timeout_ms: default_listing_timeout_ms(),
            detail_timeout_ms: default_detail_timeout_ms(),
            listing_failure_policy: ListingFailurePolicy::default(),
            output_path: default_output_path(),
            webdriver_url: default_webdriver_url(),
            headless: default_headless(),
        }
    }

    /// Validate the template and convert into a runnable configuration
    pub fn into_config(self) -> Result<PipelineConfig, ConfigError> {
        let generator = PageUrlGenerator::from_template(&self.url_template)?;

        let sample = generator.generate(self.minimum_page_index);
        Url::parse(&sample).map_err(|source| ConfigError::InvalidPageUrl {
            url: sample.clone(),
            source,
        })?;

        PipelineConfig::builder(generator)
            .with_page_range(self.minimum_page_index, self.maximum_page_index)
            .with_viewport(self.viewport_width, self.viewport_height)
            .with_user_agent(self.user_agent)
            .with_listing_selector(self.listing_selector)
            .with_detail_selectors(self.detail_selectors)
            .with_listing_timeout(Duration::from_millis(self.listing_timeout_ms))
            .with_detail_timeout(Duration::from_millis(self.detail_timeout_ms))
            .with_listing_failure_policy(self.listing_failure_policy)
            .with_output_path(self.output_path)
            .with_webdriver_url(self.webdriver_url)
            .with_headless(self.headless)
            .build()
    }
}

fn default_minimum_page_index() -> i64 {
    1
}

fn default_maximum_page_index() -> i64 {
    2
}

fn default_viewport_width() -> u32 {
    1920
}

fn default_viewport_height() -> u32 {
    1080
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_listing_selector() -> String {
    ".show-more".to_string()
}

fn default_detail_selectors() -> Vec<String> {
    vec![".dl-320".to_string(), ".dl-128".to_string()]
}

/// Matches the WebDriver client's own default wait
fn default_listing_timeout_ms() -> u64 {
    30_000
}

fn default_detail_timeout_ms() -> u64 {
    2_000
}

fn default_output_path() -> PathBuf {
    PathBuf::from("output.txt")
}

fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_headless() -> bool {
    true
}
