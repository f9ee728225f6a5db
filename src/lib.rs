pub mod client;
pub mod config;
pub mod crawlers;
pub mod error;
pub mod extractor;
pub mod output;
pub mod parsers;
pub mod pipeline;
pub mod results;
pub mod walker;

#[cfg(test)]
mod tests;

// Re-export commonly used types for convenience
pub use client::{BrowserSession, PageClient};
pub use config::{ListingFailurePolicy, PageUrlGenerator, PipelineConfig, PipelineFileConfig};
pub use error::{ClientError, ConfigError, PipelineError};
pub use pipeline::CrawlPipeline;
pub use results::{DetailOutcome, NOT_AVAILABLE, OutputRecordSet, RunSummary};
