use clap::Parser;
use link_harvest::CrawlPipeline;
use std::error::Error;

mod args;
use args::Args;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    // Override the WebDriver URL with an environment variable if provided
    let env_webdriver_url = std::env::var("WEBDRIVER_URL")
        .ok()
        .filter(|url| !url.is_empty());

    let config = args.into_file_config(env_webdriver_url)?.into_config()?;

    println!("Note: crawling requires a WebDriver server (e.g., ChromeDriver).");
    println!(
        "Using {} (set WEBDRIVER_URL or --webdriver-url to change it)",
        config.webdriver_url
    );

    let pipeline = CrawlPipeline::new(config);
    match pipeline.run().await {
        Ok(summary) => {
            ::log::info!(
                "Wrote {} links to {} ({} listing pages skipped)",
                summary.output.len(),
                summary.output_path.display(),
                summary.listing.skipped_pages.len()
            );
            println!("done!");
            Ok(())
        }
        Err(e) => {
            ::log::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
