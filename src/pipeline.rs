use crate::client::{BrowserSession, PageClient};
use crate::config::PipelineConfig;
use crate::crawlers::WebDriverSession;
use crate::error::PipelineError;
use crate::results::{OutputRecordSet, RunSummary};
use crate::{extractor, output, walker};

/// Crawls the listing range, extracts one download link per detail page and
/// writes the collected links to the configured output file.
#[derive(Debug, Clone)]
pub struct CrawlPipeline {
    config: PipelineConfig,
}

impl CrawlPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run against a freshly opened WebDriver session.
    ///
    /// The session is closed once the stages finish, whether they succeeded
    /// or not.
    pub async fn run(&self) -> Result<RunSummary, PipelineError> {
        let session = WebDriverSession::open(&self.config).await?;
        self.run_with_session(session).await
    }

    /// Run every stage against `session`, then close it exactly once
    /// regardless of how the stages ended.
    pub async fn run_with_session<S>(&self, session: S) -> Result<RunSummary, PipelineError>
    where
        S: BrowserSession,
    {
        let result = self.run_with(&session).await;

        if let Err(e) = session.close().await {
            ::log::warn!("Failed to close browser session: {}", e);
        }
        result
    }

    /// Run every stage against an already open client.
    ///
    /// Output is written only after all pages have been processed, so a
    /// fatal listing error leaves the output file untouched.
    pub async fn run_with<C>(&self, client: &C) -> Result<RunSummary, PipelineError>
    where
        C: PageClient + ?Sized,
    {
        let start_time = std::time::Instant::now();
        ::log::info!(
            "Crawling listing pages {} to {}",
            self.config.minimum_page_index,
            self.config.maximum_page_index
        );

        let listing = walker::collect_detail_urls(client, &self.config).await?;
        ::log::info!(
            "Collected {} detail links from {} listing pages ({} skipped)",
            listing.detail_urls.len(),
            listing.pages_visited,
            listing.skipped_pages.len()
        );

        let extraction = extractor::extract_all(client, &listing.detail_urls, &self.config).await;

        let records = OutputRecordSet::from(&extraction);
        output::write_records(&self.config.output_path, &records).await?;

        ::log::info!(
            "Crawl complete - {} links in {:.2} seconds",
            records.len(),
            start_time.elapsed().as_secs_f64()
        );

        Ok(RunSummary {
            listing,
            extraction,
            output: records,
            output_path: self.config.output_path.clone(),
        })
    }
}
