use clap::Parser;
use link_harvest::{ListingFailurePolicy, PipelineFileConfig};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "link-harvest")]
#[command(about = "Crawls paginated listings and collects one download link per detail page")]
#[command(version)]
pub struct Args {
    /// JSON configuration file
    #[arg(short, long, conflicts_with = "template")]
    pub config: Option<PathBuf>,

    /// Listing URL template containing {page}
    #[arg(short, long, required_unless_present = "config")]
    pub template: Option<String>,

    /// First listing page index
    #[arg(long)]
    pub min: Option<i64>,

    /// Last listing page index (inclusive)
    #[arg(long)]
    pub max: Option<i64>,

    /// Output file, overwritten on every run
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// WebDriver server URL
    #[arg(long)]
    pub webdriver_url: Option<String>,

    /// Listing page wait timeout in milliseconds
    #[arg(long)]
    pub listing_timeout_ms: Option<u64>,

    /// Detail page wait timeout in milliseconds
    #[arg(long)]
    pub detail_timeout_ms: Option<u64>,

    /// Abort the run when any listing page fails instead of skipping it
    #[arg(long)]
    pub fail_fast: bool,

    /// Show the browser window
    #[arg(long)]
    pub no_headless: bool,
}

impl Args {
    /// Merge the file configuration (if any) with command-line overrides
    pub fn into_file_config(
        self,
        env_webdriver_url: Option<String>,
    ) -> Result<PipelineFileConfig, link_harvest::ConfigError> {
        let mut config = match (&self.config, &self.template) {
            (Some(path), _) => PipelineFileConfig::from_file(path)?,
            (None, Some(template)) => PipelineFileConfig::new(template.clone()),
            // clap enforces one of the two
            (None, None) => PipelineFileConfig::new(String::new()),
        };

        if let Some(min) = self.min {
            config.minimum_page_index = min;
        }
        if let Some(max) = self.max {
            config.maximum_page_index = max;
        }
        if let Some(output) = self.output {
            config.output_path = output;
        }
        if let Some(url) = self.webdriver_url.or(env_webdriver_url) {
            config.webdriver_url = url;
        }
        if let Some(ms) = self.listing_timeout_ms {
            config.listing_timeout_ms = ms;
        }
        if let Some(ms) = self.detail_timeout_ms {
            config.detail_timeout_ms = ms;
        }
        if self.fail_fast {
            config.listing_failure_policy = ListingFailurePolicy::FailFast;
        }
        if self.no_headless {
            config.headless = false;
        }
        Ok(config)
    }
}
